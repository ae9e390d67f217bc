//! Data type system for runtime-typed arrays
//!
//! [`DType`] identifies the element type of an array at runtime. The
//! [`Element`] trait connects concrete Rust types back to their `DType`,
//! and the [`dispatch_dtype!`] macro bridges from runtime `DType` values
//! to generic code, so every engine is written once instead of ten times.

mod element;

pub use element::Element;

use std::fmt;

/// Supported element types
///
/// Discriminant values are stable and part of the public contract; they
/// can be used for compact serialization of array headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum DType {
    /// 8-bit signed integer
    I8 = 0,
    /// 8-bit unsigned integer
    U8 = 1,
    /// 16-bit signed integer
    I16 = 2,
    /// 16-bit unsigned integer
    U16 = 3,
    /// 32-bit signed integer
    I32 = 4,
    /// 32-bit unsigned integer
    U32 = 5,
    /// 64-bit signed integer
    I64 = 6,
    /// 64-bit unsigned integer
    U64 = 7,
    /// 32-bit IEEE-754 float
    F32 = 8,
    /// 64-bit IEEE-754 float
    F64 = 9,
}

impl DType {
    /// All supported dtypes, in discriminant order
    pub const ALL: [DType; 10] = [
        DType::I8,
        DType::U8,
        DType::I16,
        DType::U16,
        DType::I32,
        DType::U32,
        DType::I64,
        DType::U64,
        DType::F32,
        DType::F64,
    ];

    /// Size of one element in bytes
    pub const fn size_in_bytes(&self) -> usize {
        match self {
            DType::I8 | DType::U8 => 1,
            DType::I16 | DType::U16 => 2,
            DType::I32 | DType::U32 | DType::F32 => 4,
            DType::I64 | DType::U64 | DType::F64 => 8,
        }
    }

    /// Whether this is a floating-point type
    pub const fn is_float(&self) -> bool {
        matches!(self, DType::F32 | DType::F64)
    }

    /// Whether this is a signed integer type
    pub const fn is_signed_int(&self) -> bool {
        matches!(self, DType::I8 | DType::I16 | DType::I32 | DType::I64)
    }

    /// Whether this is an unsigned integer type
    pub const fn is_unsigned_int(&self) -> bool {
        matches!(self, DType::U8 | DType::U16 | DType::U32 | DType::U64)
    }

    /// Whether this is any integer type
    pub const fn is_int(&self) -> bool {
        !self.is_float()
    }

    /// Canonical lowercase name
    pub const fn name(&self) -> &'static str {
        match self {
            DType::I8 => "i8",
            DType::U8 => "u8",
            DType::I16 => "i16",
            DType::U16 => "u16",
            DType::I32 => "i32",
            DType::U32 => "u32",
            DType::I64 => "i64",
            DType::U64 => "u64",
            DType::F32 => "f32",
            DType::F64 => "f64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Execute a code block with `$T` bound to the Rust type for a `DType`.
///
/// This is the single point where runtime dtype values meet generic code:
///
/// ```ignore
/// dispatch_dtype!(arr.dtype(), T => {
///     // T is now i8, u8, ..., f64
///     run_engine::<T>(arr)
/// })
/// ```
#[macro_export]
macro_rules! dispatch_dtype {
    ($dtype:expr, $T:ident => $body:block) => {
        match $dtype {
            $crate::dtype::DType::I8 => {
                type $T = i8;
                $body
            }
            $crate::dtype::DType::U8 => {
                type $T = u8;
                $body
            }
            $crate::dtype::DType::I16 => {
                type $T = i16;
                $body
            }
            $crate::dtype::DType::U16 => {
                type $T = u16;
                $body
            }
            $crate::dtype::DType::I32 => {
                type $T = i32;
                $body
            }
            $crate::dtype::DType::U32 => {
                type $T = u32;
                $body
            }
            $crate::dtype::DType::I64 => {
                type $T = i64;
                $body
            }
            $crate::dtype::DType::U64 => {
                type $T = u64;
                $body
            }
            $crate::dtype::DType::F32 => {
                type $T = f32;
                $body
            }
            $crate::dtype::DType::F64 => {
                type $T = f64;
                $body
            }
        }
    };
}
