//! Core Array type

use super::{Layout, SliceSpec, Storage};
use crate::dispatch_dtype;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::MAX_NDIM;
use num_traits::AsPrimitive;
use std::fmt;

/// N-dimensional strided array
///
/// An `Array` consists of:
/// - **Storage**: reference-counted, aligned memory
/// - **Layout**: shape, strides, and offset defining the view into storage
/// - **DType**: element type, determined at runtime
///
/// # Zero-copy views
///
/// `slice`, `transpose`, `reshape`, and `flatten` return new arrays that
/// share the same underlying storage; only the layout changes. Use
/// [`Array::copy`] or [`Array::to_contiguous`] to materialize a view.
#[derive(Clone)]
pub struct Array {
    storage: Storage,
    layout: Layout,
    dtype: DType,
}

fn checked_size(shape: &[usize], op: &'static str) -> Result<usize> {
    if shape.len() > MAX_NDIM {
        return Err(Error::RankTooLarge {
            ndim: shape.len(),
            max: MAX_NDIM,
        });
    }
    let mut size = 1usize;
    for &dim in shape {
        size = size
            .checked_mul(dim)
            .ok_or(Error::Overflow { op })?;
    }
    Ok(size)
}

impl Array {
    /// Build an array from existing parts
    pub(crate) fn from_parts(storage: Storage, layout: Layout, dtype: DType) -> Self {
        Self {
            storage,
            layout,
            dtype,
        }
    }

    /// Create an uninitialized array
    ///
    /// Contents are unspecified until written; every creation path in this
    /// crate fills the buffer before handing it out.
    pub(crate) fn empty(shape: &[usize], dtype: DType) -> Result<Self> {
        let size = checked_size(shape, "empty")?;
        let storage = Storage::uninit(size * dtype.size_in_bytes())?;
        Ok(Self {
            storage,
            layout: Layout::contiguous(shape),
            dtype,
        })
    }

    /// Create an array filled with zeros
    pub fn zeros(shape: &[usize], dtype: DType) -> Result<Self> {
        let size = checked_size(shape, "zeros")?;
        let storage = Storage::zeroed(size * dtype.size_in_bytes())?;
        Ok(Self {
            storage,
            layout: Layout::contiguous(shape),
            dtype,
        })
    }

    /// Create an array filled with ones
    pub fn ones(shape: &[usize], dtype: DType) -> Result<Self> {
        Self::full(shape, dtype, 1.0)
    }

    /// Create an array filled with `value`, converted to `dtype`
    pub fn full(shape: &[usize], dtype: DType, value: f64) -> Result<Self> {
        let arr = Self::empty(shape, dtype)?;
        dispatch_dtype!(dtype, T => {
            let v = T::from_f64(value);
            let ptr = arr.storage.as_mut_ptr::<T>();
            for i in 0..arr.size() {
                unsafe { *ptr.add(i) = v };
            }
        });
        Ok(arr)
    }

    /// Create an array from a typed slice
    ///
    /// `data.len()` must equal the product of `shape`.
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize]) -> Result<Self> {
        let size = checked_size(shape, "from_slice")?;
        if data.len() != size {
            return Err(Error::SizeMismatch {
                expected: size,
                got: data.len(),
            });
        }
        let storage = Storage::from_slice(data)?;
        Ok(Self {
            storage,
            layout: Layout::contiguous(shape),
            dtype: T::DTYPE,
        })
    }

    /// Create an array from a vector (1-D unless reshaped)
    pub fn from_vec<T: Element>(data: Vec<T>) -> Result<Self> {
        let len = data.len();
        Self::from_slice(&data, &[len])
    }

    /// Evenly spaced values in `[start, stop)` with the given step
    ///
    /// Step must be nonzero and point from start towards stop; unsigned
    /// dtypes reject negative bounds. Length is the ceiling of
    /// `(stop - start) / step`.
    pub fn arange(start: i64, stop: i64, step: i64, dtype: DType) -> Result<Self> {
        if step == 0 {
            return Err(Error::InvalidArgument {
                op: "arange",
                reason: "step cannot be zero".to_string(),
            });
        }
        if step > 0 && start >= stop {
            return Err(Error::InvalidArgument {
                op: "arange",
                reason: "start must be less than stop for positive step".to_string(),
            });
        }
        if step < 0 && start <= stop {
            return Err(Error::InvalidArgument {
                op: "arange",
                reason: "start must be greater than stop for negative step".to_string(),
            });
        }
        if dtype.is_unsigned_int() && (start < 0 || stop < 0) {
            return Err(Error::InvalidArgument {
                op: "arange",
                reason: "bounds must be non-negative for unsigned dtypes".to_string(),
            });
        }
        // widen so extreme i64 bounds cannot overflow the span
        let (start_w, stop_w, step_w) = (start as i128, stop as i128, step as i128);
        let count = if step > 0 {
            (stop_w - start_w + step_w - 1) / step_w
        } else {
            (start_w - stop_w - step_w - 1) / -step_w
        };
        let size = usize::try_from(count).map_err(|_| Error::Overflow { op: "arange" })?;
        let arr = Self::empty(&[size], dtype)?;
        dispatch_dtype!(dtype, T => {
            let ptr = arr.storage.as_mut_ptr::<T>();
            for i in 0..size {
                let v = T::from_f64((start_w + i as i128 * step_w) as f64);
                unsafe { *ptr.add(i) = v };
            }
        });
        Ok(arr)
    }

    /// `num` evenly spaced values from `start` to `stop` inclusive
    ///
    /// The step is computed in the target dtype (integer dtypes divide
    /// with truncation), and the final element is forced to `stop` exactly.
    pub fn linspace(start: i64, stop: i64, num: usize, dtype: DType) -> Result<Self> {
        if num == 0 {
            return Err(Error::InvalidArgument {
                op: "linspace",
                reason: "num must be > 0".to_string(),
            });
        }
        if dtype.is_unsigned_int() && (start < 0 || stop < 0) {
            return Err(Error::InvalidArgument {
                op: "linspace",
                reason: "bounds must be non-negative for unsigned dtypes".to_string(),
            });
        }
        let arr = Self::empty(&[num], dtype)?;
        dispatch_dtype!(dtype, T => {
            let ptr = arr.storage.as_mut_ptr::<T>();
            let start_t = T::from_f64(start as f64);
            let stop_t = T::from_f64(stop as f64);
            if num == 1 {
                unsafe { *ptr = start_t };
            } else {
                let step = T::from_f64((stop - start) as f64) / T::from_f64((num - 1) as f64);
                for i in 0..num {
                    unsafe { *ptr.add(i) = start_t + T::from_f64(i as f64) * step };
                }
                unsafe { *ptr.add(num - 1) = stop_t };
            }
        });
        Ok(arr)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Shape of the array
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Strides in elements
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Total number of elements
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    /// Element type
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Size of one element in bytes
    pub fn elem_size(&self) -> usize {
        self.dtype.size_in_bytes()
    }

    /// Whether the layout is row-major contiguous
    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    /// The layout (shape/strides/offset)
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Whether this array is the sole owner of its storage
    pub fn owns_data(&self) -> bool {
        self.storage.ref_count() == 1
    }

    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Typed pointer to the first logical element (base + offset)
    ///
    /// # Safety contract (internal)
    /// `T` must match `self.dtype`; callers in the ops layer check this.
    pub(crate) fn data_ptr<T>(&self) -> *const T {
        unsafe { self.storage.as_ptr::<T>().add(self.layout.offset()) }
    }

    pub(crate) fn data_mut_ptr<T>(&self) -> *mut T {
        unsafe { self.storage.as_mut_ptr::<T>().add(self.layout.offset()) }
    }

    fn check_dtype<T: Element>(&self) -> Result<()> {
        if self.dtype != T::DTYPE {
            return Err(Error::DTypeMismatch {
                expected: self.dtype,
                got: T::DTYPE,
            });
        }
        Ok(())
    }

    /// Read a single element at a multi-index
    pub fn at<T: Element>(&self, index: &[usize]) -> Result<T> {
        self.check_dtype::<T>()?;
        if index.len() != self.ndim() {
            return Err(Error::InvalidArgument {
                op: "at",
                reason: format!("expected {} indices, got {}", self.ndim(), index.len()),
            });
        }
        let mut off = 0isize;
        for (d, &i) in index.iter().enumerate() {
            if i >= self.shape()[d] {
                return Err(Error::IndexOutOfBounds {
                    index: i,
                    size: self.shape()[d],
                });
            }
            off += i as isize * self.strides()[d];
        }
        Ok(unsafe { *self.data_ptr::<T>().offset(off) })
    }

    /// Copy the elements out in logical (row-major) order
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        self.check_dtype::<T>()?;
        let n = self.size();
        let mut out = Vec::with_capacity(n);
        if self.is_contiguous() {
            let src = unsafe { std::slice::from_raw_parts(self.data_ptr::<T>(), n) };
            out.extend_from_slice(src);
        } else {
            let ptr = self.data_ptr::<T>();
            for_each_offset(&self.layout, |off| {
                out.push(unsafe { *ptr.offset(off) });
            });
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Zero-copy slice; one [`SliceSpec`] per dimension
    pub fn slice(&self, specs: &[SliceSpec]) -> Result<Array> {
        Ok(Array {
            storage: self.storage.clone(),
            layout: self.layout.slice(specs)?,
            dtype: self.dtype,
        })
    }

    /// Zero-copy dimension permutation
    pub fn transpose(&self, axes: &[usize]) -> Result<Array> {
        Ok(Array {
            storage: self.storage.clone(),
            layout: self.layout.permute(axes)?,
            dtype: self.dtype,
        })
    }

    /// Zero-copy reshape; requires a contiguous array
    pub fn reshape(&self, shape: &[usize]) -> Result<Array> {
        if !self.is_contiguous() {
            return Err(Error::NotContiguous { op: "reshape" });
        }
        if shape.iter().any(|&d| d == 0) {
            return Err(Error::InvalidArgument {
                op: "reshape",
                reason: "zero-sized dimensions are not allowed".to_string(),
            });
        }
        let new_size = checked_size(shape, "reshape")?;
        if new_size != self.size() {
            return Err(Error::SizeMismatch {
                expected: self.size(),
                got: new_size,
            });
        }
        let mut layout = Layout::contiguous(shape);
        // preserve the view's starting point in storage
        layout = Layout::new(layout.shape(), layout.strides(), self.layout.offset());
        Ok(Array {
            storage: self.storage.clone(),
            layout,
            dtype: self.dtype,
        })
    }

    /// Reshape to 1-D; requires a contiguous array
    pub fn flatten(&self) -> Result<Array> {
        self.reshape(&[self.size()])
    }

    // ------------------------------------------------------------------
    // Materialization
    // ------------------------------------------------------------------

    /// Deep copy into fresh contiguous storage
    pub fn copy(&self) -> Result<Array> {
        let out = Array::empty(self.shape(), self.dtype)?;
        dispatch_dtype!(self.dtype, T => {
            let dst = out.storage.as_mut_ptr::<T>();
            if self.is_contiguous() {
                unsafe {
                    std::ptr::copy_nonoverlapping(self.data_ptr::<T>(), dst, self.size());
                }
            } else {
                let src = self.data_ptr::<T>();
                let mut i = 0usize;
                for_each_offset(&self.layout, |off| {
                    unsafe { *dst.add(i) = *src.offset(off) };
                    i += 1;
                });
            }
        });
        Ok(out)
    }

    /// Contiguous version of this array: a cheap view clone when already
    /// contiguous, otherwise a deep copy
    pub fn to_contiguous(&self) -> Result<Array> {
        if self.is_contiguous() {
            Ok(self.clone())
        } else {
            self.copy()
        }
    }

    /// Concatenate two arrays along `axis`
    pub fn concat(&self, other: &Array, axis: usize) -> Result<Array> {
        if self.dtype != other.dtype {
            return Err(Error::DTypeMismatch {
                expected: self.dtype,
                got: other.dtype,
            });
        }
        if self.ndim() != other.ndim() {
            return Err(Error::ShapeMismatch {
                expected: self.shape().to_vec(),
                got: other.shape().to_vec(),
            });
        }
        if axis >= self.ndim() {
            return Err(Error::InvalidAxis {
                axis,
                ndim: self.ndim(),
            });
        }
        for d in 0..self.ndim() {
            if d != axis && self.shape()[d] != other.shape()[d] {
                return Err(Error::ShapeMismatch {
                    expected: self.shape().to_vec(),
                    got: other.shape().to_vec(),
                });
            }
        }

        let mut out_shape = self.shape().to_vec();
        out_shape[axis] += other.shape()[axis];
        let out = Array::empty(&out_shape, self.dtype)?;

        dispatch_dtype!(self.dtype, T => {
            let dst = out.storage.as_mut_ptr::<T>();
            if self.is_contiguous() && other.is_contiguous() && axis == 0 {
                // both blocks land back to back in row-major order
                unsafe {
                    std::ptr::copy_nonoverlapping(self.data_ptr::<T>(), dst, self.size());
                    std::ptr::copy_nonoverlapping(
                        other.data_ptr::<T>(),
                        dst.add(self.size()),
                        other.size(),
                    );
                }
            } else {
                copy_into_with_axis_offset::<T>(self, &out, axis, 0);
                copy_into_with_axis_offset::<T>(other, &out, axis, self.shape()[axis]);
            }
        });
        Ok(out)
    }

    /// Convert to another dtype, elementwise
    ///
    /// Each type pair converts directly with `as`-cast semantics: float to
    /// int truncates and saturates, narrowing int casts wrap. Converting
    /// to the array's own dtype leaves every value bitwise unchanged.
    pub fn astype(&self, dtype: DType) -> Result<Array> {
        if dtype == self.dtype {
            return self.copy();
        }
        let out = Array::empty(self.shape(), dtype)?;
        dispatch_dtype!(self.dtype, S => {
            dispatch_dtype!(dtype, D => {
                let src = self.data_ptr::<S>();
                let dst = out.storage.as_mut_ptr::<D>();
                let mut i = 0usize;
                for_each_offset(&self.layout, |off| {
                    let v: D = unsafe { *src.offset(off) }.as_();
                    unsafe { *dst.add(i) = v };
                    i += 1;
                });
            })
        });
        Ok(out)
    }
}

/// Visit every element offset of a layout in logical (row-major) order.
///
/// Odometer iteration with incremental offset updates: the innermost
/// counter advances by its stride, and a carry rewinds the dimension and
/// bumps the next one out.
pub(crate) fn for_each_offset(layout: &Layout, mut f: impl FnMut(isize)) {
    let shape = layout.shape();
    let strides = layout.strides();
    let ndim = shape.len();
    let total = layout.size();
    if total == 0 {
        return;
    }
    let mut indices = [0usize; MAX_NDIM];
    let mut off = 0isize;
    for _ in 0..total {
        f(off);
        for dim in (0..ndim).rev() {
            indices[dim] += 1;
            off += strides[dim];
            if indices[dim] < shape[dim] {
                break;
            }
            indices[dim] = 0;
            off -= shape[dim] as isize * strides[dim];
        }
    }
}

/// Strided copy of `src` into `dst`, shifting indices along `axis`
fn copy_into_with_axis_offset<T: Element>(src: &Array, dst: &Array, axis: usize, shift: usize) {
    let sptr = src.data_ptr::<T>();
    let dptr = dst.data_mut_ptr::<T>();
    let dstrides = dst.strides();
    let base = shift as isize * dstrides[axis];
    let shape = src.shape();
    let ndim = src.ndim();
    let mut indices = [0usize; MAX_NDIM];
    let mut soff = 0isize;
    let mut doff = base;
    for _ in 0..src.size() {
        unsafe { *dptr.offset(doff) = *sptr.offset(soff) };
        for dim in (0..ndim).rev() {
            indices[dim] += 1;
            soff += src.strides()[dim];
            doff += dstrides[dim];
            if indices[dim] < shape[dim] {
                break;
            }
            indices[dim] = 0;
            soff -= shape[dim] as isize * src.strides()[dim];
            doff -= shape[dim] as isize * dstrides[dim];
        }
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("shape", &self.shape())
            .field("strides", &self.strides())
            .field("dtype", &self.dtype)
            .field("contiguous", &self.is_contiguous())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_and_ones() {
        let z = Array::zeros(&[2, 3], DType::I32).unwrap();
        assert_eq!(z.to_vec::<i32>().unwrap(), vec![0; 6]);
        let o = Array::ones(&[3], DType::F64).unwrap();
        assert_eq!(o.to_vec::<f64>().unwrap(), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_from_slice_size_mismatch() {
        let err = Array::from_slice(&[1.0f32, 2.0], &[3]).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 3, got: 2 }));
    }

    #[test]
    fn test_slice_view_shares_storage() {
        let a = Array::from_slice(&[1i32, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
        let v = a.slice(&[SliceSpec::range(0, 2), SliceSpec::range(1, 3)]).unwrap();
        assert_eq!(v.shape(), &[2, 2]);
        assert_eq!(v.to_vec::<i32>().unwrap(), vec![2, 3, 5, 6]);
        assert!(!a.owns_data());
    }

    #[test]
    fn test_transpose_round_trip() {
        let a = Array::from_slice(&[1u8, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
        let t = a.transpose(&[1, 0]).unwrap();
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(t.to_vec::<u8>().unwrap(), vec![1, 4, 2, 5, 3, 6]);
        let tt = t.transpose(&[1, 0]).unwrap();
        assert_eq!(tt.to_vec::<u8>().unwrap(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_reshape_requires_contiguous() {
        let a = Array::from_slice(&[1i16, 2, 3, 4], &[2, 2]).unwrap();
        let t = a.transpose(&[1, 0]).unwrap();
        assert!(matches!(
            t.reshape(&[4]),
            Err(Error::NotContiguous { op: "reshape" })
        ));
        assert_eq!(t.to_contiguous().unwrap().reshape(&[4]).unwrap().to_vec::<i16>().unwrap(),
                   vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_arange() {
        let a = Array::arange(0, 10, 3, DType::I32).unwrap();
        assert_eq!(a.to_vec::<i32>().unwrap(), vec![0, 3, 6, 9]);
        let b = Array::arange(5, 0, -2, DType::I64).unwrap();
        assert_eq!(b.to_vec::<i64>().unwrap(), vec![5, 3, 1]);
        assert!(Array::arange(0, 5, 0, DType::I32).is_err());
        assert!(Array::arange(5, 0, 1, DType::I32).is_err());
        assert!(Array::arange(-3, 3, 1, DType::U8).is_err());
    }

    #[test]
    fn test_arange_extreme_bounds() {
        // spans wider than i64 must not overflow the length computation
        let a = Array::arange(i64::MIN, i64::MAX, i64::MAX, DType::F64).unwrap();
        assert_eq!(a.size(), 3);
        assert_eq!(a.at::<f64>(&[0]).unwrap(), i64::MIN as f64);
        assert_eq!(a.at::<f64>(&[1]).unwrap(), -1.0);
    }

    #[test]
    fn test_linspace() {
        let a = Array::linspace(0, 1, 5, DType::F64).unwrap();
        assert_eq!(a.to_vec::<f64>().unwrap(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        let single = Array::linspace(7, 99, 1, DType::I32).unwrap();
        assert_eq!(single.to_vec::<i32>().unwrap(), vec![7]);
        // integer dtypes compute the step with truncating division
        let i = Array::linspace(0, 10, 4, DType::I32).unwrap();
        assert_eq!(i.to_vec::<i32>().unwrap(), vec![0, 3, 6, 10]);
        assert!(Array::linspace(0, 1, 0, DType::F32).is_err());
    }

    #[test]
    fn test_concat_axis0_fast_path() {
        let a = Array::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let b = Array::from_slice(&[5.0f32, 6.0], &[1, 2]).unwrap();
        let c = a.concat(&b, 0).unwrap();
        assert_eq!(c.shape(), &[3, 2]);
        assert_eq!(c.to_vec::<f32>().unwrap(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_concat_axis1() {
        let a = Array::from_slice(&[1i32, 2, 3, 4], &[2, 2]).unwrap();
        let b = Array::from_slice(&[9i32, 10], &[2, 1]).unwrap();
        let c = a.concat(&b, 1).unwrap();
        assert_eq!(c.shape(), &[2, 3]);
        assert_eq!(c.to_vec::<i32>().unwrap(), vec![1, 2, 9, 3, 4, 10]);
    }

    #[test]
    fn test_concat_errors() {
        let a = Array::zeros(&[2, 2], DType::F32).unwrap();
        let b = Array::zeros(&[2, 2], DType::F64).unwrap();
        assert!(matches!(a.concat(&b, 0), Err(Error::DTypeMismatch { .. })));
        let c = Array::zeros(&[3, 3], DType::F32).unwrap();
        assert!(matches!(a.concat(&c, 0), Err(Error::ShapeMismatch { .. })));
        let d = Array::zeros(&[2, 2], DType::F32).unwrap();
        assert!(matches!(a.concat(&d, 5), Err(Error::InvalidAxis { .. })));
    }

    #[test]
    fn test_astype() {
        let a = Array::from_slice(&[1.9f64, -2.5, 3.0], &[3]).unwrap();
        let i = a.astype(DType::I32).unwrap();
        assert_eq!(i.to_vec::<i32>().unwrap(), vec![1, -2, 3]);
        let back = i.astype(DType::F32).unwrap();
        assert_eq!(back.to_vec::<f32>().unwrap(), vec![1.0, -2.0, 3.0]);
    }

    #[test]
    fn test_astype_same_dtype_preserves_64bit_exactly() {
        let big = (1i64 << 53) + 1;
        let a = Array::from_slice(&[big, i64::MIN, i64::MAX], &[3]).unwrap();
        let c = a.astype(DType::I64).unwrap();
        assert_eq!(c.to_vec::<i64>().unwrap(), vec![big, i64::MIN, i64::MAX]);

        let u = Array::from_slice(&[u64::MAX - 1, u64::MAX], &[2]).unwrap();
        let cu = u.astype(DType::U64).unwrap();
        assert_eq!(cu.to_vec::<u64>().unwrap(), vec![u64::MAX - 1, u64::MAX]);
    }

    #[test]
    fn test_astype_int_pairs_cast_directly() {
        // i64 -> u64 wraps like `as`, no float detour
        let a = Array::from_slice(&[-1i64, (1i64 << 53) + 1], &[2]).unwrap();
        let u = a.astype(DType::U64).unwrap();
        assert_eq!(u.to_vec::<u64>().unwrap(), vec![u64::MAX, (1u64 << 53) + 1]);

        let b = Array::from_slice(&[300i32, -1], &[2]).unwrap();
        let n = b.astype(DType::U8).unwrap();
        assert_eq!(n.to_vec::<u8>().unwrap(), vec![44, 255]);
    }

    #[test]
    fn test_at_bounds() {
        let a = Array::from_slice(&[1i32, 2, 3, 4], &[2, 2]).unwrap();
        assert_eq!(a.at::<i32>(&[1, 0]).unwrap(), 3);
        assert!(matches!(
            a.at::<i32>(&[2, 0]),
            Err(Error::IndexOutOfBounds { index: 2, size: 2 })
        ));
        assert!(matches!(a.at::<i64>(&[0, 0]), Err(Error::DTypeMismatch { .. })));
    }

    #[test]
    fn test_rank_limit() {
        let shape = [1usize; 9];
        assert!(matches!(
            Array::zeros(&shape, DType::U8),
            Err(Error::RankTooLarge { ndim: 9, max: 8 })
        ));
    }

    #[test]
    fn test_copy_of_strided_view() {
        let a = Array::from_slice(&[0i32, 1, 2, 3, 4, 5, 6, 7], &[2, 4]).unwrap();
        let v = a
            .slice(&[SliceSpec::range(0, 2), SliceSpec { start: 0, stop: 4, step: 2 }])
            .unwrap();
        let c = v.copy().unwrap();
        assert!(c.is_contiguous());
        assert!(c.owns_data());
        assert_eq!(c.to_vec::<i32>().unwrap(), vec![0, 2, 4, 6]);
    }
}
