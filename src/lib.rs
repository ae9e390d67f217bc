//! # numo
//!
//! N-dimensional strided array engine for CPU.
//!
//! The crate is built around three pieces:
//! - **[`Array`]**: reference-counted storage plus a shape/strides/offset
//!   layout. Slicing, transposing, and reshaping are zero-copy views.
//! - **Elementwise engine**: broadcasting binary/unary/scalar operations,
//!   generic over the 10 supported dtypes.
//! - **Reductions**: full and per-axis sum/prod/min/max/mean/std plus
//!   index-returning argmax/argmin, with pairwise summation for float
//!   accuracy.
//!
//! Large contiguous operations are split across a rayon pool when they
//! exceed the configurable [`ParallelPolicy`] threshold.
//!
//! # Example
//!
//! ```
//! use numo::prelude::*;
//!
//! let a = Array::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
//! let b = Array::from_slice(&[10.0f32, 20.0], &[2]).unwrap();
//! let c = ops::add(&a, &b).unwrap(); // broadcasts b over rows
//! assert_eq!(c.to_vec::<f32>().unwrap(), vec![11.0, 22.0, 13.0, 24.0]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod array;
pub mod dtype;
pub mod error;
pub mod ops;
pub mod parallel;

pub use array::Array;
pub use dtype::{DType, Element};
pub use error::{Error, Result};
pub use parallel::ParallelPolicy;

/// Commonly used types and functions
pub mod prelude {
    pub use crate::array::Array;
    pub use crate::dtype::{DType, Element};
    pub use crate::error::{Error, Result};
    pub use crate::ops;
    pub use crate::parallel::ParallelPolicy;
}

/// Maximum supported rank (number of dimensions)
pub const MAX_NDIM: usize = 8;
