//! Array operations: elementwise arithmetic and reductions
//!
//! Binary operations accept operands of the same dtype and broadcast
//! their shapes; the output dtype equals the input dtype. Scalar variants
//! take an `f64` operand that is converted to the array dtype once, up
//! front. Every operation has an `_inplace` form that writes back into
//! its first argument instead of allocating.
//!
//! Division, power, log, and exp follow per-dtype rules described in
//! [`kernels`]: integer division promotes through a float of sufficient
//! width, integer power is exponentiation by squaring, and the float
//! transcendentals are polynomial implementations with well-defined
//! clamping (`log(x <= 0) == 0`, `exp` saturates to `inf`/`0`).

mod elemwise;
mod kernels;
mod reduce;

pub use reduce::{
    allclose, argmax, argmax_axis, argmin, argmin_axis, dot, max, max_axis, mean, mean_axis, min,
    min_axis, prod_axis, product, std, std_axis, sum, sum_axis,
};

use crate::array::{broadcast_shapes, Array};
use crate::dispatch_dtype;
use crate::error::{Error, Result};
use kernels::Arith;

fn check_same_dtype(a: &Array, b: &Array) -> Result<()> {
    if a.dtype() != b.dtype() {
        return Err(Error::DTypeMismatch {
            expected: a.dtype(),
            got: b.dtype(),
        });
    }
    Ok(())
}

macro_rules! binary_op {
    (
        $(#[$doc:meta])*
        $name:ident, $name_inplace:ident, |$x:ident, $y:ident| $body:expr
    ) => {
        $(#[$doc])*
        pub fn $name(a: &Array, b: &Array) -> Result<Array> {
            check_same_dtype(a, b)?;
            let shape = broadcast_shapes(a.shape(), b.shape())?;
            let out = Array::empty(&shape, a.dtype())?;
            dispatch_dtype!(a.dtype(), T => {
                elemwise::binary_into::<T>(|$x: T, $y: T| $body, a, b, &out)?;
            });
            Ok(out)
        }

        /// In-place variant of
        #[doc = concat!("[`", stringify!($name), "`];")]
        /// `b` must broadcast to `a`'s shape.
        pub fn $name_inplace(a: &mut Array, b: &Array) -> Result<()> {
            check_same_dtype(a, b)?;
            dispatch_dtype!(a.dtype(), T => {
                elemwise::binary_into::<T>(|$x: T, $y: T| $body, a, b, a)?;
            });
            Ok(())
        }
    };
}

binary_op!(
    /// Elementwise addition with broadcasting
    add, add_inplace, |x, y| x + y
);
binary_op!(
    /// Elementwise subtraction with broadcasting
    sub, sub_inplace, |x, y| x - y
);
binary_op!(
    /// Elementwise multiplication with broadcasting
    mul, mul_inplace, |x, y| x * y
);
binary_op!(
    /// Elementwise division with broadcasting
    ///
    /// 8/16-bit integers divide through `f32`, 32-bit through `f64`
    /// (truncating toward zero, division by zero saturating); 64-bit
    /// integers divide natively and panic on zero.
    div, div_inplace, |x, y| x.kdiv(y)
);
binary_op!(
    /// Elementwise power with broadcasting
    ///
    /// Integer dtypes use exponentiation by squaring with wrapping
    /// overflow; a negative exponent yields 0. Floats compute
    /// `exp(y * log(x))`.
    pow, pow_inplace, |x, y| x.kpow(y)
);
binary_op!(
    /// Elementwise maximum with broadcasting
    maximum, maximum_inplace, |x, y| if y > x { y } else { x }
);
binary_op!(
    /// Elementwise minimum with broadcasting
    minimum, minimum_inplace, |x, y| if y < x { y } else { x }
);

/// Elementwise equality with broadcasting
///
/// Returns an array of the input dtype holding 1 where the elements are
/// equal and 0 where they differ.
pub fn equal(a: &Array, b: &Array) -> Result<Array> {
    check_same_dtype(a, b)?;
    let shape = broadcast_shapes(a.shape(), b.shape())?;
    let out = Array::empty(&shape, a.dtype())?;
    dispatch_dtype!(a.dtype(), T => {
        let one = <T as crate::dtype::Element>::one();
        let zero = <T as crate::dtype::Element>::zero();
        elemwise::binary_into::<T>(|x: T, y: T| if x == y { one } else { zero }, a, b, &out)?;
    });
    Ok(out)
}

macro_rules! scalar_op {
    (
        $(#[$doc:meta])*
        $name:ident, $name_inplace:ident, |$x:ident, $y:ident| $body:expr
    ) => {
        $(#[$doc])*
        pub fn $name(a: &Array, scalar: f64) -> Result<Array> {
            let out = Array::empty(a.shape(), a.dtype())?;
            dispatch_dtype!(a.dtype(), T => {
                let $y = <T as crate::dtype::Element>::from_f64(scalar);
                elemwise::unary_into::<T>(|$x: T| $body, a, &out)?;
            });
            Ok(out)
        }

        /// In-place variant of
        #[doc = concat!("[`", stringify!($name), "`].")]
        pub fn $name_inplace(a: &mut Array, scalar: f64) -> Result<()> {
            dispatch_dtype!(a.dtype(), T => {
                let $y = <T as crate::dtype::Element>::from_f64(scalar);
                elemwise::unary_into::<T>(|$x: T| $body, a, a)?;
            });
            Ok(())
        }
    };
}

scalar_op!(
    /// Add a scalar to every element; the scalar is converted to the
    /// array dtype once, before the loop.
    add_scalar, add_scalar_inplace, |x, y| x + y
);
scalar_op!(
    /// Subtract a scalar from every element
    sub_scalar, sub_scalar_inplace, |x, y| x - y
);
scalar_op!(
    /// Multiply every element by a scalar
    mul_scalar, mul_scalar_inplace, |x, y| x * y
);
scalar_op!(
    /// Divide every element by a scalar, with the dtype's promotion rule
    div_scalar, div_scalar_inplace, |x, y| x.kdiv(y)
);
scalar_op!(
    /// Raise every element to a scalar power
    pow_scalar, pow_scalar_inplace, |x, y| x.kpow(y)
);

macro_rules! unary_op {
    (
        $(#[$doc:meta])*
        $name:ident, $name_inplace:ident, |$x:ident| $body:expr
    ) => {
        $(#[$doc])*
        pub fn $name(a: &Array) -> Result<Array> {
            let out = Array::empty(a.shape(), a.dtype())?;
            dispatch_dtype!(a.dtype(), T => {
                elemwise::unary_into::<T>(|$x: T| $body, a, &out)?;
            });
            Ok(out)
        }

        /// In-place variant of
        #[doc = concat!("[`", stringify!($name), "`].")]
        pub fn $name_inplace(a: &mut Array) -> Result<()> {
            dispatch_dtype!(a.dtype(), T => {
                elemwise::unary_into::<T>(|$x: T| $body, a, a)?;
            });
            Ok(())
        }
    };
}

unary_op!(
    /// Elementwise negation (wrapping for integer dtypes, including
    /// unsigned ones)
    neg, neg_inplace, |x| x.kneg()
);
unary_op!(
    /// Elementwise absolute value (identity for unsigned dtypes)
    abs, abs_inplace, |x| x.kabs()
);
unary_op!(
    /// Elementwise square root; negative signed integers clamp to 0
    sqrt, sqrt_inplace, |x| x.ksqrt()
);
unary_op!(
    /// Elementwise natural logarithm; `x <= 0` yields 0
    log, log_inplace, |x| x.klog()
);
unary_op!(
    /// Elementwise exponential, saturating to `inf`/`0` out of range
    exp, exp_inplace, |x| x.kexp()
);

/// Clamp every element into `[min, max]`
///
/// The bounds are given as `f64` and converted to the array dtype once.
pub fn clip(a: &Array, min: f64, max: f64) -> Result<Array> {
    check_clip_bounds(min, max)?;
    let out = Array::empty(a.shape(), a.dtype())?;
    dispatch_dtype!(a.dtype(), T => {
        let lo = <T as crate::dtype::Element>::from_f64(min);
        let hi = <T as crate::dtype::Element>::from_f64(max);
        elemwise::unary_into::<T>(
            |x: T| if x < lo { lo } else if x > hi { hi } else { x },
            a,
            &out,
        )?;
    });
    Ok(out)
}

/// In-place variant of [`clip`].
pub fn clip_inplace(a: &mut Array, min: f64, max: f64) -> Result<()> {
    check_clip_bounds(min, max)?;
    dispatch_dtype!(a.dtype(), T => {
        let lo = <T as crate::dtype::Element>::from_f64(min);
        let hi = <T as crate::dtype::Element>::from_f64(max);
        elemwise::unary_into::<T>(
            |x: T| if x < lo { lo } else if x > hi { hi } else { x },
            a,
            a,
        )?;
    });
    Ok(())
}

fn check_clip_bounds(min: f64, max: f64) -> Result<()> {
    if min > max {
        return Err(Error::InvalidArgument {
            op: "clip",
            reason: format!("min ({min}) must not exceed max ({max})"),
        });
    }
    Ok(())
}
