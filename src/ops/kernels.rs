//! Scalar numeric kernels
//!
//! Per-element arithmetic that differs by dtype family: division with
//! width-dependent float promotion, integer pow by squaring, and
//! polynomial log/exp for both float widths. The [`Arith`] trait is the
//! single dispatch seam; the elementwise engines stay generic over it.

use crate::dtype::Element;

/// Per-dtype arithmetic behavior used by the elementwise engines
pub(crate) trait Arith: Element {
    /// Division with the dtype's promotion rule
    fn kdiv(self, rhs: Self) -> Self;
    /// Power with the dtype's strategy (integer squaring or exp/log)
    fn kpow(self, rhs: Self) -> Self;
    /// Natural logarithm (promoted for integer dtypes; 0 for x <= 0)
    fn klog(self) -> Self;
    /// Exponential (promoted for integer dtypes)
    fn kexp(self) -> Self;
    /// Square root (negative signed integers clamp to 0)
    fn ksqrt(self) -> Self;
    /// Negation (wrapping for integer dtypes)
    fn kneg(self) -> Self;
    /// Absolute value (identity for unsigned dtypes)
    fn kabs(self) -> Self;
}

/* ── Accurate scalar log (fdlibm, argument reduction + Horner) ────────
 *
 * 1. Argument reduction: x = 2^k * m, m in [sqrt(2)/2, sqrt(2))
 * 2. f = m - 1, s = f/(2+f)
 * 3. log(m) = f - hfsq + s*(hfsq + R), R a Horner polynomial in s^2
 * 4. log(x) = k*ln2_hi + log(m) + k*ln2_lo, with ln2 split in two parts
 *    so the k*ln2 recombination stays below one ulp
 *
 * x <= 0 returns 0.0 rather than NaN/-inf.
 */

pub(crate) fn log_f32(x: f32) -> f32 {
    const LN2_HI: f32 = 6.931_381_2e-1; /* 0x3F317180, lower 12 bits zero */
    const LN2_LO: f32 = 9.058_000_6e-6; /* 0x3717F7D1 */
    const LG1: f32 = 6.666_666_9e-1; /* 0x3F2AAAAB */
    const LG2: f32 = 4.000_000_06e-1; /* 0x3ECCCCCD */
    const LG3: f32 = 2.857_143_0e-1; /* 0x3E924925 */
    const LG4: f32 = 2.222_219_8e-1; /* 0x3E638E29 */

    if x <= 0.0 {
        return 0.0;
    }

    let mut ix = x.to_bits();
    let mut k = ((ix >> 23) & 0xff) as i32 - 127;
    ix = (ix & 0x007f_ffff) | 0x3f80_0000;
    let mut m = f32::from_bits(ix);
    if m > 1.414_213_6 {
        m *= 0.5;
        k += 1;
    }
    let f = m - 1.0;

    let s = f / (2.0 + f);
    let z = s * s;
    let w = z * z;
    let t1 = w * (LG2 + w * LG4);
    let t2 = z * (LG1 + w * LG3);
    let r = t1 + t2;
    let hfsq = 0.5 * f * f;
    let dk = k as f32;
    dk * LN2_HI - ((hfsq - (s * (hfsq + r) + dk * LN2_LO)) - f)
}

pub(crate) fn log_f64(x: f64) -> f64 {
    const LN2_HI: f64 = 6.931_471_803_691_238_164_90e-1; /* 0x3FE62E42FEE00000 */
    const LN2_LO: f64 = 1.908_214_929_270_587_700_02e-10; /* 0x3DEA39EF35793C76 */
    const LG1: f64 = 6.666_666_666_666_735_130_0e-1; /* 0x3FE5555555555593 */
    const LG2: f64 = 3.999_999_999_940_941_908_0e-1; /* 0x3FD999999997FA04 */
    const LG3: f64 = 2.857_142_874_366_239_149_0e-1; /* 0x3FD2492494229359 */
    const LG4: f64 = 2.222_219_843_214_978_396_0e-1; /* 0x3FCC71C51D8E78AF */
    const LG5: f64 = 1.818_357_216_161_805_012_0e-1; /* 0x3FC7466496CB03DE */
    const LG6: f64 = 1.531_383_769_920_937_332_0e-1; /* 0x3FC39A09D078C69F */
    const LG7: f64 = 1.479_819_860_511_658_591_0e-1; /* 0x3FC2F112DF3E5244 */

    if x <= 0.0 {
        return 0.0;
    }

    let mut ix = x.to_bits();
    let mut k = ((ix >> 52) & 0x7ff) as i32 - 1023;
    ix = (ix & 0x000f_ffff_ffff_ffff) | 0x3ff0_0000_0000_0000;
    let mut m = f64::from_bits(ix);
    if m > 1.414_213_562_373_095_1 {
        m *= 0.5;
        k += 1;
    }
    let f = m - 1.0;

    let s = f / (2.0 + f);
    let z = s * s;
    let w = z * z;
    let t1 = w * (LG2 + w * (LG4 + w * LG6));
    let t2 = z * (LG1 + w * (LG3 + w * (LG5 + w * LG7)));
    let r = t1 + t2;
    let hfsq = 0.5 * f * f;
    let dk = k as f64;
    dk * LN2_HI - ((hfsq - (s * (hfsq + r) + dk * LN2_LO)) - f)
}

/* ── Accurate scalar exp (Cephes-style, argument reduction + Horner) ──
 *
 * 1. Clamp overflow to +inf, underflow to 0
 * 2. n = round(x * log2(e)), r = x - n*ln2 via two-part LN2HI/LN2LO
 * 3. Horner polynomial for exp(r), |r| <= ln2/2
 * 4. Scale by 2^n through the IEEE-754 exponent field
 */

pub(crate) fn exp_f32(x: f32) -> f32 {
    const LOG2E: f32 = 1.442_695_04;
    const LN2HI: f32 = 6.933_593_75e-1; /* 355/512, exact in f32 */
    const LN2LO: f32 = -2.121_944_4e-4;
    const P0: f32 = 1.987_569_15e-4;
    const P1: f32 = 1.398_199_95e-3;
    const P2: f32 = 8.333_451_9e-3;
    const P3: f32 = 4.166_579_6e-2;
    const P4: f32 = 1.666_666_55e-1;
    const P5: f32 = 5.000_000_1e-1;

    if x > 88.376_26 {
        return f32::INFINITY;
    }
    if x < -103.972_076 {
        return 0.0;
    }

    let n = (x * LOG2E).round();
    let mut r = x - n * LN2HI;
    r -= n * LN2LO;

    let mut p = P0;
    p = p * r + P1;
    p = p * r + P2;
    p = p * r + P3;
    p = p * r + P4;
    p = p * r + P5;
    p = p * r * r + r + 1.0;

    let ni = n as i32;
    f32::from_bits(p.to_bits().wrapping_add((ni << 23) as u32))
}

pub(crate) fn exp_f64(x: f64) -> f64 {
    const LOG2E: f64 = 1.442_695_040_888_963_4;
    const LN2HI: f64 = 6.931_471_803_691_238_164_90e-1; /* lower 28 bits zero */
    const LN2LO: f64 = 1.908_214_929_270_587_700_02e-10;
    /* Taylor coefficients 1/n! for n = 2..12 */
    const C: [f64; 11] = [
        5.000_000_000_000_000_000_00e-1,
        1.666_666_666_666_666_666_67e-1,
        4.166_666_666_666_666_666_67e-2,
        8.333_333_333_333_333_333_33e-3,
        1.388_888_888_888_888_888_89e-3,
        1.984_126_984_126_984_126_98e-4,
        2.480_158_730_158_730_158_73e-5,
        2.755_731_922_398_589_065_26e-6,
        2.755_731_922_398_589_065_26e-7,
        2.505_210_838_544_171_877_51e-8,
        2.087_675_698_786_809_897_92e-9,
    ];

    if x > 709.782_712_893_384 {
        return f64::INFINITY;
    }
    if x < -745.133_219_101_941_2 {
        return 0.0;
    }

    let n = (x * LOG2E).round();
    let mut r = x - n * LN2HI;
    r -= n * LN2LO;

    let mut p = C[10];
    for i in (0..10).rev() {
        p = p * r + C[i];
    }
    p = p * r * r + r + 1.0;

    let ni = n as i64;
    f64::from_bits(p.to_bits().wrapping_add((ni << 52) as u64))
}

/* ── Integer pow ──────────────────────────────────────────────────────
 *
 * 8/16-bit: branchless fixed-iteration square-and-multiply. The mask
 * selects base or 1 per exponent bit, every element runs the same
 * instruction count, and the outer loop auto-vectorizes. Unsigned
 * arithmetic keeps overflow well defined; odd-bit selection from the
 * original base preserves sign for negative bases.
 *
 * 32/64-bit: variable-iteration with early exit. The fixed count (31/63)
 * would overwhelm the SIMD win, and typical exponents finish in a few
 * iterations.
 *
 * Negative exponents on signed types yield 0.
 */

macro_rules! powi_small_signed {
    ($name:ident, $ct:ty, $uct:ty, $bits:expr) => {
        fn $name(base: $ct, exp: $ct) -> $ct {
            let neg = exp < 0;
            let uexp = if neg { 0 } else { exp as $uct };
            let mut ubase = base as $uct;
            let mut result: $uct = 1;
            for bit in 0..$bits {
                let mask = ((uexp >> bit) & 1).wrapping_neg();
                result = result.wrapping_mul((ubase.wrapping_sub(1) & mask).wrapping_add(1));
                ubase = ubase.wrapping_mul(ubase);
            }
            if neg {
                0
            } else {
                result as $ct
            }
        }
    };
}

macro_rules! powi_small_unsigned {
    ($name:ident, $uct:ty, $bits:expr) => {
        fn $name(mut base: $uct, exp: $uct) -> $uct {
            let mut result: $uct = 1;
            for bit in 0..$bits {
                let mask = ((exp >> bit) & 1).wrapping_neg();
                result = result.wrapping_mul((base.wrapping_sub(1) & mask).wrapping_add(1));
                base = base.wrapping_mul(base);
            }
            result
        }
    };
}

powi_small_signed!(powi_i8, i8, u8, 7);
powi_small_signed!(powi_i16, i16, u16, 15);
powi_small_unsigned!(powi_u8, u8, 8);
powi_small_unsigned!(powi_u16, u16, 16);

fn powi_signed(mut base: i64, mut exp: i64) -> i64 {
    if exp < 0 {
        return 0;
    }
    let mut result = 1i64;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exp >>= 1;
    }
    result
}

fn powi_unsigned(mut base: u64, mut exp: u64) -> u64 {
    let mut result = 1u64;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exp >>= 1;
    }
    result
}

/* ── Arith impls ──────────────────────────────────────────────────────
 *
 * Promotion widths follow element size: 8/16-bit integers go through
 * f32, 32-bit through f64; 64-bit integers and floats stay native.
 */

macro_rules! arith_int_f32 {
    ($ct:ty, $pow:ident) => {
        impl Arith for $ct {
            #[inline]
            fn kdiv(self, rhs: Self) -> Self {
                (self as f32 / rhs as f32) as $ct
            }
            #[inline]
            fn kpow(self, rhs: Self) -> Self {
                $pow(self, rhs)
            }
            #[inline]
            fn klog(self) -> Self {
                log_f32(self as f32) as $ct
            }
            #[inline]
            fn kexp(self) -> Self {
                exp_f32(self as f32) as $ct
            }
            #[inline]
            fn ksqrt(self) -> Self {
                #[allow(unused_comparisons)]
                let clamped = if self < 0 { 0 } else { self };
                (clamped as f32).sqrt() as $ct
            }
            #[inline]
            fn kneg(self) -> Self {
                self.wrapping_neg()
            }
            #[inline]
            fn kabs(self) -> Self {
                #[allow(unused_comparisons)]
                if self < 0 {
                    self.wrapping_neg()
                } else {
                    self
                }
            }
        }
    };
}

arith_int_f32!(i8, powi_i8);
arith_int_f32!(u8, powi_u8);
arith_int_f32!(i16, powi_i16);
arith_int_f32!(u16, powi_u16);

macro_rules! arith_int_f64 {
    ($ct:ty, $widen:ty, $pow:ident, $div_promote:expr) => {
        impl Arith for $ct {
            #[inline]
            fn kdiv(self, rhs: Self) -> Self {
                if $div_promote {
                    (self as f64 / rhs as f64) as $ct
                } else {
                    self / rhs
                }
            }
            #[inline]
            fn kpow(self, rhs: Self) -> Self {
                $pow(self as $widen, rhs as $widen) as $ct
            }
            #[inline]
            fn klog(self) -> Self {
                log_f64(self as f64) as $ct
            }
            #[inline]
            fn kexp(self) -> Self {
                exp_f64(self as f64) as $ct
            }
            #[inline]
            fn ksqrt(self) -> Self {
                #[allow(unused_comparisons)]
                let clamped = if self < 0 { 0 } else { self };
                (clamped as f64).sqrt() as $ct
            }
            #[inline]
            fn kneg(self) -> Self {
                self.wrapping_neg()
            }
            #[inline]
            fn kabs(self) -> Self {
                #[allow(unused_comparisons)]
                if self < 0 {
                    self.wrapping_neg()
                } else {
                    self
                }
            }
        }
    };
}

arith_int_f64!(i32, i64, powi_signed, true);
arith_int_f64!(u32, u64, powi_unsigned, true);
arith_int_f64!(i64, i64, powi_signed, false);
arith_int_f64!(u64, u64, powi_unsigned, false);

impl Arith for f32 {
    #[inline]
    fn kdiv(self, rhs: Self) -> Self {
        self / rhs
    }
    #[inline]
    fn kpow(self, rhs: Self) -> Self {
        exp_f32(rhs * log_f32(self))
    }
    #[inline]
    fn klog(self) -> Self {
        log_f32(self)
    }
    #[inline]
    fn kexp(self) -> Self {
        exp_f32(self)
    }
    #[inline]
    fn ksqrt(self) -> Self {
        self.sqrt()
    }
    #[inline]
    fn kneg(self) -> Self {
        -self
    }
    #[inline]
    fn kabs(self) -> Self {
        self.abs()
    }
}

impl Arith for f64 {
    #[inline]
    fn kdiv(self, rhs: Self) -> Self {
        self / rhs
    }
    #[inline]
    fn kpow(self, rhs: Self) -> Self {
        exp_f64(rhs * log_f64(self))
    }
    #[inline]
    fn klog(self) -> Self {
        log_f64(self)
    }
    #[inline]
    fn kexp(self) -> Self {
        exp_f64(self)
    }
    #[inline]
    fn ksqrt(self) -> Self {
        self.sqrt()
    }
    #[inline]
    fn kneg(self) -> Self {
        -self
    }
    #[inline]
    fn kabs(self) -> Self {
        self.abs()
    }
}
