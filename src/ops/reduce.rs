//! Full and per-axis reductions
//!
//! Full reductions collapse the whole array to a rank-0 array of the
//! input dtype (`mean`/`std` return `f64` directly, for every input
//! dtype). Axis reductions remove one dimension, or keep it with size 1
//! when `keepdim` is set.
//!
//! Float sums use pairwise summation: eight independent accumulators in
//! the leaf block so the compiler can pack vector adds, with recursive
//! splitting above the block size to keep the error logarithmic. Above
//! the parallel-policy threshold the input is split across the rayon
//! pool and partial results are combined in one step.

use crate::array::{for_each_offset, Array};
use crate::dispatch_dtype;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::parallel::parallel_policy;
use rayon::prelude::*;

const PAIRWISE_BLOCKSIZE: usize = 128;

/// Per-dtype full-sum kernel: integers accumulate natively, floats use
/// pairwise summation.
trait SumSlice: Element {
    fn sum_slice(x: &[Self]) -> Self;
}

macro_rules! sum_slice_int {
    ($($ty:ty),*) => {$(
        impl SumSlice for $ty {
            fn sum_slice(x: &[Self]) -> Self {
                let mut acc: $ty = 0;
                for &v in x {
                    acc = acc.wrapping_add(v);
                }
                acc
            }
        }
    )*};
}

sum_slice_int!(i8, u8, i16, u16, i32, u32, i64, u64);

macro_rules! sum_slice_float {
    ($($ty:ty),*) => {$(
        impl SumSlice for $ty {
            fn sum_slice(x: &[Self]) -> Self {
                pairwise_sum(x)
            }
        }
    )*};
}

sum_slice_float!(f32, f64);

/// Pairwise summation: accurate and vectorizable.
///
/// A serial `acc += v` float loop cannot be vectorized (IEEE-754 addition
/// is not associative), so the leaf uses 8 independent accumulators and
/// blocks of 128 recursively split in half above that.
fn pairwise_sum<T: Element>(x: &[T]) -> T {
    let n = x.len();
    if n <= PAIRWISE_BLOCKSIZE {
        let z = T::zero();
        let mut r = [z; 8];
        let n8 = n & !7usize;
        let mut i = 0;
        while i < n8 {
            for lane in 0..8 {
                r[lane] = r[lane] + x[i + lane];
            }
            i += 8;
        }
        let mut sum = ((r[0] + r[1]) + (r[2] + r[3])) + ((r[4] + r[5]) + (r[6] + r[7]));
        for &v in &x[n8..] {
            sum = sum + v;
        }
        return sum;
    }
    let half = n / 2;
    pairwise_sum(&x[..half]) + pairwise_sum(&x[half..])
}

/// Sum a contiguous slice, splitting across the pool above the threshold
fn sum_full<T: SumSlice>(x: &[T]) -> T {
    let chunks = parallel_policy().chunk_count(std::mem::size_of_val(x));
    if chunks <= 1 || x.is_empty() {
        return T::sum_slice(x);
    }
    let chunk_len = x.len().div_ceil(chunks);
    x.par_chunks(chunk_len)
        .map(T::sum_slice)
        .reduce(T::zero, |a, b| a + b)
}

fn minmax_full<T: Element>(x: &[T], want_max: bool) -> T {
    let pick = move |a: T, b: T| {
        if (b > a) == want_max {
            b
        } else {
            a
        }
    };
    let chunks = parallel_policy().chunk_count(std::mem::size_of_val(x));
    if chunks <= 1 {
        return x[1..].iter().fold(x[0], |m, &v| pick(m, v));
    }
    let chunk_len = x.len().div_ceil(chunks);
    x.par_chunks(chunk_len)
        .map(|c| c[1..].iter().fold(c[0], |m, &v| pick(m, v)))
        .reduce_with(pick)
        .unwrap_or(x[0])
}

fn scalar_array<T: Element>(v: T) -> Result<Array> {
    Array::from_slice(&[v], &[])
}

/// Materialized contiguous element slice of an array
fn contiguous_values<T: Element>(a: &Array) -> Result<(Array, *const T, usize)> {
    let c = a.to_contiguous()?;
    let ptr = c.data_ptr::<T>();
    let n = c.size();
    Ok((c, ptr, n))
}

// ---------------------------------------------------------------------
// Full reductions
// ---------------------------------------------------------------------

/// Sum of all elements, as a rank-0 array of the input dtype
pub fn sum(a: &Array) -> Result<Array> {
    dispatch_dtype!(a.dtype(), T => {
        let (_keep, ptr, n) = contiguous_values::<T>(a)?;
        let x = unsafe { std::slice::from_raw_parts(ptr, n) };
        scalar_array(sum_full(x))
    })
}

/// Product of all elements, as a rank-0 array of the input dtype
pub fn product(a: &Array) -> Result<Array> {
    dispatch_dtype!(a.dtype(), T => {
        let (_keep, ptr, n) = contiguous_values::<T>(a)?;
        let x = unsafe { std::slice::from_raw_parts(ptr, n) };
        let mut acc = T::one();
        for &v in x {
            acc = acc * v;
        }
        scalar_array(acc)
    })
}

/// Minimum element, as a rank-0 array; empty input is an error
pub fn min(a: &Array) -> Result<Array> {
    if a.size() == 0 {
        return Err(Error::EmptyInput { op: "min" });
    }
    dispatch_dtype!(a.dtype(), T => {
        let (_keep, ptr, n) = contiguous_values::<T>(a)?;
        let x = unsafe { std::slice::from_raw_parts(ptr, n) };
        scalar_array(minmax_full(x, false))
    })
}

/// Maximum element, as a rank-0 array; empty input is an error
pub fn max(a: &Array) -> Result<Array> {
    if a.size() == 0 {
        return Err(Error::EmptyInput { op: "max" });
    }
    dispatch_dtype!(a.dtype(), T => {
        let (_keep, ptr, n) = contiguous_values::<T>(a)?;
        let x = unsafe { std::slice::from_raw_parts(ptr, n) };
        scalar_array(minmax_full(x, true))
    })
}

/// Dot product of two 1-D arrays of the same dtype and length
pub fn dot(a: &Array, b: &Array) -> Result<Array> {
    if a.dtype() != b.dtype() {
        return Err(Error::DTypeMismatch {
            expected: a.dtype(),
            got: b.dtype(),
        });
    }
    if a.ndim() != 1 || b.ndim() != 1 {
        return Err(Error::InvalidArgument {
            op: "dot",
            reason: format!("expected 1-D inputs, got ranks {} and {}", a.ndim(), b.ndim()),
        });
    }
    if a.size() != b.size() {
        return Err(Error::SizeMismatch {
            expected: a.size(),
            got: b.size(),
        });
    }
    dispatch_dtype!(a.dtype(), T => {
        let (_ka, pa, n) = contiguous_values::<T>(a)?;
        let (_kb, pb, _) = contiguous_values::<T>(b)?;
        let xa = unsafe { std::slice::from_raw_parts(pa, n) };
        let xb = unsafe { std::slice::from_raw_parts(pb, n) };
        let mut acc = T::zero();
        for i in 0..n {
            acc = acc + xa[i] * xb[i];
        }
        scalar_array(acc)
    })
}

/// Arithmetic mean of all elements, always computed in and returned as f64
pub fn mean(a: &Array) -> Result<f64> {
    if a.size() == 0 {
        return Err(Error::EmptyInput { op: "mean" });
    }
    Ok(sum_f64(a)? / a.size() as f64)
}

/// Population standard deviation, always computed in and returned as f64
///
/// `sqrt(sum((x - mean)^2) / n)` — the population form, not the sample
/// form with `n - 1`.
pub fn std(a: &Array) -> Result<f64> {
    if a.size() == 0 {
        return Err(Error::EmptyInput { op: "std" });
    }
    let m = mean(a)?;
    dispatch_dtype!(a.dtype(), T => {
        let (_keep, ptr, n) = contiguous_values::<T>(a)?;
        let x = unsafe { std::slice::from_raw_parts(ptr, n) };
        let mut acc = 0.0f64;
        for &v in x {
            let d = v.to_f64() - m;
            acc += d * d;
        }
        Ok((acc / n as f64).sqrt())
    })
}

fn sum_f64(a: &Array) -> Result<f64> {
    dispatch_dtype!(a.dtype(), T => {
        let (_keep, ptr, n) = contiguous_values::<T>(a)?;
        let x = unsafe { std::slice::from_raw_parts(ptr, n) };
        let mut acc = 0.0f64;
        for &v in x {
            acc += v.to_f64();
        }
        Ok(acc)
    })
}

// ---------------------------------------------------------------------
// Axis reductions
// ---------------------------------------------------------------------

fn axis_out_shape(a: &Array, axis: usize, keepdim: bool) -> Vec<usize> {
    let mut shape = a.shape().to_vec();
    if keepdim {
        shape[axis] = 1;
    } else {
        shape.remove(axis);
    }
    shape
}

/// Fold each lane along `axis` into a single value
///
/// The iteration space is the input layout with the reduced axis removed;
/// output elements are written in the same logical order, which matches
/// the contiguous output layout exactly.
fn reduce_axis_fold<T: Element, A: Copy>(
    a: &Array,
    axis: usize,
    init: impl Fn(T) -> A,
    fold: impl Fn(A, T) -> A,
    finish: impl Fn(A, usize) -> A,
) -> Result<Vec<A>> {
    let reduce_len = a.shape()[axis];
    let reduce_stride = a.strides()[axis];
    let iter_layout = a.layout().remove_axis(axis)?;
    let base = a.data_ptr::<T>();
    let mut out = Vec::with_capacity(iter_layout.size());
    for_each_offset(&iter_layout, |off| {
        let lane = unsafe { base.offset(off) };
        let mut acc = init(unsafe { *lane });
        for i in 1..reduce_len {
            acc = fold(acc, unsafe { *lane.offset(i as isize * reduce_stride) });
        }
        out.push(finish(acc, reduce_len));
    });
    Ok(out)
}

fn check_axis(a: &Array, axis: usize) -> Result<()> {
    if axis >= a.ndim() {
        return Err(Error::InvalidAxis {
            axis,
            ndim: a.ndim(),
        });
    }
    Ok(())
}

/// Extra requirement for reductions with no identity element
fn check_nonempty_axis(a: &Array, axis: usize, op: &'static str) -> Result<()> {
    if a.shape()[axis] == 0 {
        return Err(Error::EmptyInput { op });
    }
    Ok(())
}

/// Fold each lane along `axis` starting from an identity value
///
/// Handles a zero-length axis by producing the identity for every lane.
fn reduce_axis_identity<T: Element, A: Copy>(
    a: &Array,
    axis: usize,
    identity: A,
    fold: impl Fn(A, T) -> A,
) -> Result<Vec<A>> {
    let reduce_len = a.shape()[axis];
    let reduce_stride = a.strides()[axis];
    let iter_layout = a.layout().remove_axis(axis)?;
    let base = a.data_ptr::<T>();
    let mut out = Vec::with_capacity(iter_layout.size());
    for_each_offset(&iter_layout, |off| {
        let lane = unsafe { base.offset(off) };
        let mut acc = identity;
        for i in 0..reduce_len {
            acc = fold(acc, unsafe { *lane.offset(i as isize * reduce_stride) });
        }
        out.push(acc);
    });
    Ok(out)
}

/// Sum along one axis; a zero-length axis yields zeros
pub fn sum_axis(a: &Array, axis: usize, keepdim: bool) -> Result<Array> {
    check_axis(a, axis)?;
    let shape = axis_out_shape(a, axis, keepdim);
    dispatch_dtype!(a.dtype(), T => {
        let vals = reduce_axis_identity::<T, T>(a, axis, T::zero(), |acc, v| acc + v)?;
        Array::from_slice(&vals, &[vals.len()])?.reshape(&shape)
    })
}

/// Product along one axis; a zero-length axis yields ones
pub fn prod_axis(a: &Array, axis: usize, keepdim: bool) -> Result<Array> {
    check_axis(a, axis)?;
    let shape = axis_out_shape(a, axis, keepdim);
    dispatch_dtype!(a.dtype(), T => {
        let vals = reduce_axis_identity::<T, T>(a, axis, T::one(), |acc, v| acc * v)?;
        Array::from_slice(&vals, &[vals.len()])?.reshape(&shape)
    })
}

/// Minimum along one axis; a zero-length axis is an error
pub fn min_axis(a: &Array, axis: usize, keepdim: bool) -> Result<Array> {
    check_axis(a, axis)?;
    check_nonempty_axis(a, axis, "min_axis")?;
    let shape = axis_out_shape(a, axis, keepdim);
    dispatch_dtype!(a.dtype(), T => {
        let vals = reduce_axis_fold::<T, T>(
            a,
            axis,
            |v| v,
            |acc, v| if v < acc { v } else { acc },
            |acc, _| acc,
        )?;
        Array::from_slice(&vals, &[vals.len()])?.reshape(&shape)
    })
}

/// Maximum along one axis; a zero-length axis is an error
pub fn max_axis(a: &Array, axis: usize, keepdim: bool) -> Result<Array> {
    check_axis(a, axis)?;
    check_nonempty_axis(a, axis, "max_axis")?;
    let shape = axis_out_shape(a, axis, keepdim);
    dispatch_dtype!(a.dtype(), T => {
        let vals = reduce_axis_fold::<T, T>(
            a,
            axis,
            |v| v,
            |acc, v| if v > acc { v } else { acc },
            |acc, _| acc,
        )?;
        Array::from_slice(&vals, &[vals.len()])?.reshape(&shape)
    })
}

/// Mean along one axis; output dtype is always F64
pub fn mean_axis(a: &Array, axis: usize, keepdim: bool) -> Result<Array> {
    check_axis(a, axis)?;
    check_nonempty_axis(a, axis, "mean_axis")?;
    let shape = axis_out_shape(a, axis, keepdim);
    dispatch_dtype!(a.dtype(), T => {
        let vals = reduce_axis_fold::<T, f64>(
            a,
            axis,
            |v| v.to_f64(),
            |acc, v| acc + v.to_f64(),
            |acc, n| acc / n as f64,
        )?;
        Array::from_slice(&vals, &[vals.len()])?.reshape(&shape)
    })
}

/// Population standard deviation along one axis; output dtype is always F64
pub fn std_axis(a: &Array, axis: usize, keepdim: bool) -> Result<Array> {
    check_axis(a, axis)?;
    check_nonempty_axis(a, axis, "std_axis")?;
    let shape = axis_out_shape(a, axis, keepdim);
    let means = mean_axis(a, axis, false)?;
    let mvals = means.to_vec::<f64>()?;
    dispatch_dtype!(a.dtype(), T => {
        let reduce_len = a.shape()[axis];
        let reduce_stride = a.strides()[axis];
        let iter_layout = a.layout().remove_axis(axis)?;
        let base = a.data_ptr::<T>();
        let mut vals = Vec::with_capacity(iter_layout.size());
        let mut lane_idx = 0usize;
        for_each_offset(&iter_layout, |off| {
            let m = mvals[lane_idx];
            lane_idx += 1;
            let lane = unsafe { base.offset(off) };
            let mut acc = 0.0f64;
            for i in 0..reduce_len {
                let d = unsafe { *lane.offset(i as isize * reduce_stride) }.to_f64() - m;
                acc += d * d;
            }
            vals.push((acc / reduce_len as f64).sqrt());
        });
        Array::from_slice(&vals, &[vals.len()])?.reshape(&shape)
    })
}

// ---------------------------------------------------------------------
// Index reductions and comparisons
// ---------------------------------------------------------------------

/// Flat index (logical row-major order) of the maximum element, as a
/// rank-0 I64 array; ties go to the first occurrence
pub fn argmax(a: &Array) -> Result<Array> {
    arg_extremum(a, true, "argmax")
}

/// Flat index of the minimum element, as a rank-0 I64 array
pub fn argmin(a: &Array) -> Result<Array> {
    arg_extremum(a, false, "argmin")
}

fn arg_extremum(a: &Array, want_max: bool, op: &'static str) -> Result<Array> {
    if a.size() == 0 {
        return Err(Error::EmptyInput { op });
    }
    dispatch_dtype!(a.dtype(), T => {
        let base = a.data_ptr::<T>();
        let mut best: Option<T> = None;
        let mut best_idx = 0i64;
        let mut idx = 0i64;
        for_each_offset(a.layout(), |off| {
            let v = unsafe { *base.offset(off) };
            let better = match best {
                None => true,
                Some(b) => if want_max { v > b } else { v < b },
            };
            if better {
                best = Some(v);
                best_idx = idx;
            }
            idx += 1;
        });
        scalar_array(best_idx)
    })
}

/// Index of the maximum along one axis; output dtype is I64
pub fn argmax_axis(a: &Array, axis: usize, keepdim: bool) -> Result<Array> {
    arg_extremum_axis(a, axis, keepdim, true, "argmax_axis")
}

/// Index of the minimum along one axis; output dtype is I64
pub fn argmin_axis(a: &Array, axis: usize, keepdim: bool) -> Result<Array> {
    arg_extremum_axis(a, axis, keepdim, false, "argmin_axis")
}

fn arg_extremum_axis(
    a: &Array,
    axis: usize,
    keepdim: bool,
    want_max: bool,
    op: &'static str,
) -> Result<Array> {
    check_axis(a, axis)?;
    check_nonempty_axis(a, axis, op)?;
    let shape = axis_out_shape(a, axis, keepdim);
    dispatch_dtype!(a.dtype(), T => {
        let reduce_len = a.shape()[axis];
        let reduce_stride = a.strides()[axis];
        let iter_layout = a.layout().remove_axis(axis)?;
        let base = a.data_ptr::<T>();
        let mut vals: Vec<i64> = Vec::with_capacity(iter_layout.size());
        for_each_offset(&iter_layout, |off| {
            let lane = unsafe { base.offset(off) };
            let mut best = unsafe { *lane };
            let mut best_i = 0i64;
            for i in 1..reduce_len {
                let v = unsafe { *lane.offset(i as isize * reduce_stride) };
                let better = if want_max { v > best } else { v < best };
                if better {
                    best = v;
                    best_i = i as i64;
                }
            }
            vals.push(best_i);
        });
        Array::from_slice(&vals, &[vals.len()])?.reshape(&shape)
    })
}

/// Whether every element pair satisfies `|a - b| <= atol + rtol * |b|`
///
/// The comparison runs in f64 for every dtype. Shapes and dtypes must
/// match exactly; empty arrays compare as close.
pub fn allclose(a: &Array, b: &Array, rtol: f64, atol: f64) -> Result<bool> {
    if a.dtype() != b.dtype() {
        return Err(Error::DTypeMismatch {
            expected: a.dtype(),
            got: b.dtype(),
        });
    }
    if a.shape() != b.shape() {
        return Err(Error::ShapeMismatch {
            expected: a.shape().to_vec(),
            got: b.shape().to_vec(),
        });
    }
    dispatch_dtype!(a.dtype(), T => {
        let (_ka, pa, n) = contiguous_values::<T>(a)?;
        let (_kb, pb, _) = contiguous_values::<T>(b)?;
        let xa = unsafe { std::slice::from_raw_parts(pa, n) };
        let xb = unsafe { std::slice::from_raw_parts(pb, n) };
        for i in 0..n {
            let (x, y) = (xa[i].to_f64(), xb[i].to_f64());
            if (x - y).abs() > atol + rtol * y.abs() {
                return Ok(false);
            }
        }
        Ok(true)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairwise_matches_naive() {
        let x: Vec<f64> = (0..1000).map(|i| (i as f64) * 0.25).collect();
        let naive: f64 = x.iter().sum();
        assert!((pairwise_sum(&x) - naive).abs() < 1e-9);
    }

    #[test]
    fn test_pairwise_small_and_empty() {
        assert_eq!(pairwise_sum::<f32>(&[]), 0.0);
        assert_eq!(pairwise_sum(&[1.5f32]), 1.5);
        assert_eq!(pairwise_sum(&[1.0f64, 2.0, 3.0]), 6.0);
    }
}
