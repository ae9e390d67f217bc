//! Error types for numo operations

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using numo's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during array operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Memory allocation failed
    #[error("allocation of {size_bytes} bytes failed")]
    AllocationFailed {
        /// Requested allocation size in bytes
        size_bytes: usize,
    },

    /// Shape mismatch between arrays
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Shapes cannot be broadcast together
    #[error("cannot broadcast shapes {lhs:?} and {rhs:?}")]
    BroadcastIncompatible {
        /// Left-hand shape
        lhs: Vec<usize>,
        /// Right-hand shape
        rhs: Vec<usize>,
    },

    /// DType mismatch between arrays
    #[error("dtype mismatch: expected {expected}, got {got}")]
    DTypeMismatch {
        /// Expected dtype
        expected: DType,
        /// Actual dtype
        got: DType,
    },

    /// Operation requires a contiguous array
    #[error("operation '{op}' requires a contiguous array")]
    NotContiguous {
        /// Operation name
        op: &'static str,
    },

    /// Invalid argument to an operation
    #[error("invalid argument to '{op}': {reason}")]
    InvalidArgument {
        /// Operation name
        op: &'static str,
        /// What was wrong
        reason: String,
    },

    /// Element count mismatch
    #[error("size mismatch: expected {expected} elements, got {got}")]
    SizeMismatch {
        /// Expected element count
        expected: usize,
        /// Actual element count
        got: usize,
    },

    /// Arithmetic overflow computing a size
    #[error("numeric overflow in '{op}'")]
    Overflow {
        /// Operation name
        op: &'static str,
    },

    /// Index outside the valid range
    #[error("index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// Offending index
        index: usize,
        /// Dimension size
        size: usize,
    },

    /// Invalid slice bounds or step
    #[error("invalid slice on dim {dim}: start={start}, stop={stop}, step={step} (size {size})")]
    InvalidSlice {
        /// Dimension being sliced
        dim: usize,
        /// Slice start
        start: usize,
        /// Slice stop (exclusive)
        stop: usize,
        /// Slice step
        step: usize,
        /// Dimension size
        size: usize,
    },

    /// Axis out of range or repeated in a permutation
    #[error("invalid axis {axis} for array of rank {ndim}")]
    InvalidAxis {
        /// Offending axis
        axis: usize,
        /// Array rank
        ndim: usize,
    },

    /// Operation is undefined on an empty array
    #[error("operation '{op}' is undefined on an empty array")]
    EmptyInput {
        /// Operation name
        op: &'static str,
    },

    /// Rank exceeds the supported maximum
    #[error("rank {ndim} exceeds the supported maximum of {max}")]
    RankTooLarge {
        /// Requested rank
        ndim: usize,
        /// Supported maximum
        max: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ShapeMismatch {
            expected: vec![2, 3],
            got: vec![3, 2],
        };
        assert_eq!(err.to_string(), "shape mismatch: expected [2, 3], got [3, 2]");

        let err = Error::DTypeMismatch {
            expected: DType::F32,
            got: DType::I64,
        };
        assert!(err.to_string().contains("f32"));
        assert!(err.to_string().contains("i64"));
    }
}
