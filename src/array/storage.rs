//! Reference-counted, aligned storage for array data
//!
//! Storage is a flat byte buffer aligned to [`ALIGNMENT`]. Views created
//! by slicing or transposing clone the `Storage` handle, bumping the
//! refcount; the buffer is freed when the last handle drops.

use crate::dtype::Element;
use crate::error::{Error, Result};
use std::alloc;
use std::sync::Arc;

/// Data buffer alignment in bytes (cache line / SIMD friendly)
pub const ALIGNMENT: usize = 64;

struct StorageInner {
    ptr: *mut u8,
    len_bytes: usize,
}

// The buffer is uniquely owned by the inner and never reallocated.
unsafe impl Send for StorageInner {}
unsafe impl Sync for StorageInner {}

impl Drop for StorageInner {
    fn drop(&mut self) {
        if self.len_bytes > 0 {
            let layout = alloc::Layout::from_size_align(self.len_bytes, ALIGNMENT)
                .expect("storage layout was validated at allocation");
            unsafe { alloc::dealloc(self.ptr, layout) };
        }
    }
}

/// Shared handle to an aligned byte buffer
#[derive(Clone)]
pub struct Storage {
    inner: Arc<StorageInner>,
}

impl Storage {
    /// Allocate a zero-initialized buffer of `len_bytes`
    pub fn zeroed(len_bytes: usize) -> Result<Self> {
        Self::alloc_with(len_bytes, true)
    }

    /// Allocate an uninitialized buffer of `len_bytes`
    ///
    /// Callers must write every element before reading it back.
    pub fn uninit(len_bytes: usize) -> Result<Self> {
        Self::alloc_with(len_bytes, false)
    }

    fn alloc_with(len_bytes: usize, zeroed: bool) -> Result<Self> {
        if len_bytes == 0 {
            return Ok(Self {
                inner: Arc::new(StorageInner {
                    ptr: std::ptr::NonNull::<u8>::dangling().as_ptr(),
                    len_bytes: 0,
                }),
            });
        }
        let layout = alloc::Layout::from_size_align(len_bytes, ALIGNMENT)
            .map_err(|_| Error::AllocationFailed { size_bytes: len_bytes })?;
        let ptr = unsafe {
            if zeroed {
                alloc::alloc_zeroed(layout)
            } else {
                alloc::alloc(layout)
            }
        };
        if ptr.is_null() {
            return Err(Error::AllocationFailed { size_bytes: len_bytes });
        }
        Ok(Self {
            inner: Arc::new(StorageInner { ptr, len_bytes }),
        })
    }

    /// Allocate and fill from a typed slice
    pub fn from_slice<T: Element>(data: &[T]) -> Result<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let storage = Self::uninit(bytes.len())?;
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), storage.inner.ptr, bytes.len());
        }
        Ok(storage)
    }

    /// Length of the buffer in bytes
    pub fn len_bytes(&self) -> usize {
        self.inner.len_bytes
    }

    /// Number of live handles to this buffer
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Base pointer, typed
    ///
    /// # Safety
    /// Callers must stay within `len_bytes` and respect `T`'s alignment
    /// (guaranteed for the base pointer by [`ALIGNMENT`]).
    pub fn as_ptr<T>(&self) -> *const T {
        self.inner.ptr as *const T
    }

    /// Mutable base pointer, typed
    ///
    /// # Safety
    /// Same requirements as [`Self::as_ptr`]. Writing through a shared
    /// storage while another view reads it is a logic error the caller
    /// must rule out; in-place ops take `&mut Array` for this reason.
    pub fn as_mut_ptr<T>(&self) -> *mut T {
        self.inner.ptr as *mut T
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("len_bytes", &self.inner.len_bytes)
            .field("refs", &self.ref_count())
            .finish()
    }
}
