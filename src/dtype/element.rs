//! Element trait for mapping Rust types to DType

use super::DType;
use bytemuck::{Pod, Zeroable};
use std::ops::{Add, Div, Mul, Sub};

/// Trait for types that can be elements of an array
///
/// This trait connects Rust's type system to numo's runtime dtype system.
/// It is implemented for exactly the ten primitive types in [`DType`].
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - basic requirements
/// - `Pod + Zeroable` - safe memory transmutation (bytemuck)
/// - `Add + Sub + Mul + Div` - arithmetic operations (Output = Self)
/// - `PartialOrd` - comparison for min/max
///
/// Note: `Neg` is NOT required since unsigned types don't support it;
/// negation wraps through the arithmetic kernels instead.
pub trait Element:
    Copy
    + Send
    + Sync
    + Pod
    + Zeroable
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + PartialOrd
{
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Convert to f64 for generic numeric operations
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type (`as`-cast semantics: saturating for
    /// integers, truncating the fraction)
    fn from_f64(v: f64) -> Self;

    /// Zero value
    fn zero() -> Self;

    /// One value
    fn one() -> Self;
}

macro_rules! impl_element {
    ($ty:ty, $dtype:expr, $zero:expr, $one:expr) => {
        impl Element for $ty {
            const DTYPE: DType = $dtype;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $ty
            }

            #[inline]
            fn zero() -> Self {
                $zero
            }

            #[inline]
            fn one() -> Self {
                $one
            }
        }
    };
}

impl_element!(i8, DType::I8, 0, 1);
impl_element!(u8, DType::U8, 0, 1);
impl_element!(i16, DType::I16, 0, 1);
impl_element!(u16, DType::U16, 0, 1);
impl_element!(i32, DType::I32, 0, 1);
impl_element!(u32, DType::U32, 0, 1);
impl_element!(i64, DType::I64, 0, 1);
impl_element!(u64, DType::U64, 0, 1);
impl_element!(f32, DType::F32, 0.0, 1.0);
impl_element!(f64, DType::F64, 0.0, 1.0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_dtype() {
        assert_eq!(f64::DTYPE, DType::F64);
        assert_eq!(f32::DTYPE, DType::F32);
        assert_eq!(i32::DTYPE, DType::I32);
        assert_eq!(u8::DTYPE, DType::U8);
    }

    #[test]
    fn test_element_conversions() {
        assert_eq!(f32::from_f64(2.5).to_f64(), 2.5f32 as f64);
        assert_eq!(i32::from_f64(42.9), 42);
        assert_eq!(i8::from_f64(-3.7), -3);
        // as-cast saturates out-of-range floats
        assert_eq!(u8::from_f64(300.0), 255);
        assert_eq!(u8::from_f64(-1.0), 0);
    }

    #[test]
    fn test_element_zero_one() {
        assert_eq!(i8::zero(), 0);
        assert_eq!(u64::one(), 1);
        assert_eq!(f32::zero(), 0.0);
        assert_eq!(f64::one(), 1.0);
    }
}
