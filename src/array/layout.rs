//! Array layout: shape, strides, and offset
//!
//! A `Layout` describes how an array's logical index space maps onto its
//! linear storage. Strides are measured in **elements**, not bytes, and a
//! stride of 0 marks a broadcast dimension (every index reads the same
//! element).

use crate::error::{Error, Result};
use crate::MAX_NDIM;
use smallvec::SmallVec;

/// Inline capacity for shape/stride buffers; ranks above this are rejected.
type Dims<T> = SmallVec<[T; MAX_NDIM]>;

/// One dimension of a slice: `start..stop` with a positive `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceSpec {
    /// First index, inclusive
    pub start: usize,
    /// Last index, exclusive
    pub stop: usize,
    /// Step between taken indices (must be > 0)
    pub step: usize,
}

impl SliceSpec {
    /// Take the whole `start..stop` range with step 1
    pub fn range(start: usize, stop: usize) -> Self {
        Self { start, stop, step: 1 }
    }

    /// Number of elements the slice selects
    ///
    /// A zero step or inverted bounds select nothing rather than panic;
    /// [`Layout::slice`] rejects such specs with an error.
    pub fn len(&self) -> usize {
        if self.step == 0 || self.stop <= self.start {
            return 0;
        }
        (self.stop - self.start + self.step - 1) / self.step
    }

    /// Whether the slice selects nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shape, strides (in elements), and offset into storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    shape: Dims<usize>,
    strides: Dims<isize>,
    offset: usize,
}

impl Layout {
    /// Row-major contiguous layout for a shape
    pub fn contiguous(shape: &[usize]) -> Self {
        let mut strides: Dims<isize> = SmallVec::from_elem(1, shape.len());
        let mut acc = 1isize;
        for i in (0..shape.len()).rev() {
            strides[i] = acc;
            acc *= shape[i] as isize;
        }
        Self {
            shape: SmallVec::from_slice(shape),
            strides,
            offset: 0,
        }
    }

    /// Build from explicit parts
    pub fn new(shape: &[usize], strides: &[isize], offset: usize) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        Self {
            shape: SmallVec::from_slice(shape),
            strides: SmallVec::from_slice(strides),
            offset,
        }
    }

    /// Shape of the array
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Strides in elements
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Offset into storage, in elements
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    /// Whether the layout is row-major contiguous
    ///
    /// Checked last dimension first: each stride must equal the product of
    /// the dimensions to its right.
    pub fn is_contiguous(&self) -> bool {
        let mut expected = 1isize;
        for i in (0..self.ndim()).rev() {
            if self.shape[i] != 1 && self.strides[i] != expected {
                return false;
            }
            expected *= self.shape[i] as isize;
        }
        true
    }

    /// Permute dimensions according to `axes`
    ///
    /// `axes` must be a permutation of `0..ndim`; out-of-range or repeated
    /// axes are an error.
    pub fn permute(&self, axes: &[usize]) -> Result<Layout> {
        if axes.len() != self.ndim() {
            return Err(Error::InvalidArgument {
                op: "transpose",
                reason: format!("expected {} axes, got {}", self.ndim(), axes.len()),
            });
        }
        let mut seen = [false; MAX_NDIM];
        for &ax in axes {
            if ax >= self.ndim() || seen[ax] {
                return Err(Error::InvalidAxis {
                    axis: ax,
                    ndim: self.ndim(),
                });
            }
            seen[ax] = true;
        }
        let shape: Dims<usize> = axes.iter().map(|&ax| self.shape[ax]).collect();
        let strides: Dims<isize> = axes.iter().map(|&ax| self.strides[ax]).collect();
        Ok(Layout {
            shape,
            strides,
            offset: self.offset,
        })
    }

    /// Slice each dimension by `start..stop` with a step
    ///
    /// Requires one spec per dimension, `step > 0`, and
    /// `start < stop <= shape[d]`.
    pub fn slice(&self, specs: &[SliceSpec]) -> Result<Layout> {
        if specs.len() != self.ndim() {
            return Err(Error::InvalidArgument {
                op: "slice",
                reason: format!("expected {} specs, got {}", self.ndim(), specs.len()),
            });
        }
        let mut shape: Dims<usize> = SmallVec::with_capacity(self.ndim());
        let mut strides: Dims<isize> = SmallVec::with_capacity(self.ndim());
        let mut offset = self.offset as isize;
        for (d, s) in specs.iter().enumerate() {
            if s.step == 0 || s.start >= s.stop || s.stop > self.shape[d] {
                return Err(Error::InvalidSlice {
                    dim: d,
                    start: s.start,
                    stop: s.stop,
                    step: s.step,
                    size: self.shape[d],
                });
            }
            shape.push(s.len());
            strides.push(self.strides[d] * s.step as isize);
            offset += s.start as isize * self.strides[d];
        }
        Ok(Layout {
            shape,
            strides,
            offset: offset as usize,
        })
    }

    /// Broadcast this layout to a target shape
    ///
    /// The target is right-aligned against the current shape: missing
    /// leading dims act as size 1, and every size-1 dim gets stride 0.
    pub fn broadcast_to(&self, target: &[usize]) -> Result<Layout> {
        let ndim = self.ndim();
        if target.len() < ndim {
            return Err(Error::BroadcastIncompatible {
                lhs: self.shape.to_vec(),
                rhs: target.to_vec(),
            });
        }
        let lead = target.len() - ndim;
        let mut strides: Dims<isize> = SmallVec::from_elem(0, target.len());
        for i in 0..ndim {
            let dim = self.shape[i];
            if dim == target[lead + i] {
                strides[lead + i] = self.strides[i];
            } else if dim == 1 {
                strides[lead + i] = 0;
            } else {
                return Err(Error::BroadcastIncompatible {
                    lhs: self.shape.to_vec(),
                    rhs: target.to_vec(),
                });
            }
        }
        Ok(Layout {
            shape: SmallVec::from_slice(target),
            strides,
            offset: self.offset,
        })
    }

    /// Layout with dimension `axis` removed (for axis reductions)
    pub fn remove_axis(&self, axis: usize) -> Result<Layout> {
        if axis >= self.ndim() {
            return Err(Error::InvalidAxis {
                axis,
                ndim: self.ndim(),
            });
        }
        let mut shape = self.shape.clone();
        let mut strides = self.strides.clone();
        shape.remove(axis);
        strides.remove(axis);
        Ok(Layout {
            shape,
            strides,
            offset: self.offset,
        })
    }
}

/// Resolve the broadcast shape of two shapes
///
/// Shapes are compared right-aligned; each dim pair must be equal or one
/// of them 1. The result takes the larger of each pair.
pub fn broadcast_shapes(a: &[usize], b: &[usize]) -> Result<Vec<usize>> {
    let ndim = a.len().max(b.len());
    let mut out = vec![0usize; ndim];
    for i in 0..ndim {
        let da = if i < ndim - a.len() { 1 } else { a[i - (ndim - a.len())] };
        let db = if i < ndim - b.len() { 1 } else { b[i - (ndim - b.len())] };
        if da != db && da != 1 && db != 1 {
            return Err(Error::BroadcastIncompatible {
                lhs: a.to_vec(),
                rhs: b.to_vec(),
            });
        }
        out[i] = da.max(db);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_strides() {
        let layout = Layout::contiguous(&[2, 3, 4]);
        assert_eq!(layout.strides(), &[12, 4, 1]);
        assert_eq!(layout.size(), 24);
        assert!(layout.is_contiguous());
    }

    #[test]
    fn test_scalar_rank_zero() {
        let layout = Layout::contiguous(&[]);
        assert_eq!(layout.size(), 1);
        assert!(layout.is_contiguous());
    }

    #[test]
    fn test_permute() {
        let layout = Layout::contiguous(&[2, 3]);
        let t = layout.permute(&[1, 0]).unwrap();
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(t.strides(), &[1, 3]);
        assert!(!t.is_contiguous());
    }

    #[test]
    fn test_permute_duplicate_axis() {
        let layout = Layout::contiguous(&[2, 3, 4]);
        assert!(matches!(
            layout.permute(&[0, 0, 1]),
            Err(Error::InvalidAxis { axis: 0, .. })
        ));
        assert!(matches!(
            layout.permute(&[0, 1, 3]),
            Err(Error::InvalidAxis { axis: 3, .. })
        ));
    }

    #[test]
    fn test_slice_layout() {
        let layout = Layout::contiguous(&[4, 6]);
        let s = layout
            .slice(&[SliceSpec::range(1, 3), SliceSpec { start: 0, stop: 6, step: 2 }])
            .unwrap();
        assert_eq!(s.shape(), &[2, 3]);
        assert_eq!(s.strides(), &[6, 2]);
        assert_eq!(s.offset(), 6);
        assert!(!s.is_contiguous());
    }

    #[test]
    fn test_slice_invalid() {
        let layout = Layout::contiguous(&[4]);
        // stop beyond dim
        assert!(layout.slice(&[SliceSpec::range(0, 5)]).is_err());
        // start >= stop
        assert!(layout.slice(&[SliceSpec::range(2, 2)]).is_err());
        // zero step
        assert!(layout
            .slice(&[SliceSpec { start: 0, stop: 4, step: 0 }])
            .is_err());
    }

    #[test]
    fn test_slice_spec_len_degenerate() {
        assert_eq!(SliceSpec { start: 0, stop: 4, step: 0 }.len(), 0);
        assert_eq!(SliceSpec { start: 3, stop: 2, step: 1 }.len(), 0);
        assert!(SliceSpec { start: 2, stop: 2, step: 1 }.is_empty());
    }

    #[test]
    fn test_broadcast_to() {
        let layout = Layout::contiguous(&[3, 1]);
        let b = layout.broadcast_to(&[2, 3, 4]).unwrap();
        assert_eq!(b.shape(), &[2, 3, 4]);
        assert_eq!(b.strides(), &[0, 1, 0]);
    }

    #[test]
    fn test_broadcast_shapes() {
        assert_eq!(broadcast_shapes(&[2, 1, 4], &[3, 1]).unwrap(), vec![2, 3, 4]);
        assert_eq!(broadcast_shapes(&[5], &[5]).unwrap(), vec![5]);
        assert!(broadcast_shapes(&[2, 3], &[4, 3]).is_err());
    }

    #[test]
    fn test_contiguity_ignores_size_one_dims() {
        // Stride on a size-1 dim is irrelevant to contiguity
        let layout = Layout::new(&[1, 4], &[99, 1], 0);
        assert!(layout.is_contiguous());
    }
}
