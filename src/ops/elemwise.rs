//! Generic elementwise execution engine
//!
//! One engine serves every binary/unary/scalar operation; the per-element
//! closure is the only thing that varies. Three execution paths:
//!
//! 1. **Flat**: all operands contiguous — a straight loop, split across
//!    the rayon pool when the byte count clears the parallel policy.
//! 2. **Scalar broadcast**: the innermost stride of one operand is 0 over
//!    a contiguous other side — the invariant operand is hoisted out.
//! 3. **Strided**: an explicit odometer cursor walks the outer dims with
//!    incremental offset updates, calling the innermost-dim kernel at
//!    each leaf. Rank is bounded by [`crate::MAX_NDIM`], so no recursion.
//!
//! Axes are sorted by descending combined stride before iteration so the
//! smallest-stride axis lands innermost, maximizing locality for
//! transposed operands.

use crate::array::Array;
use crate::dtype::Element;
use crate::error::Result;
use crate::parallel::parallel_policy;
use crate::MAX_NDIM;
use rayon::prelude::*;

/// Raw pointer wrapper so kernel closures can cross rayon's Send bound.
/// Sound because parallel chunks write disjoint output ranges.
#[derive(Clone, Copy)]
struct SendPtr<T>(*mut T);
unsafe impl<T> Send for SendPtr<T> {}
unsafe impl<T> Sync for SendPtr<T> {}

#[derive(Clone, Copy)]
struct SendConstPtr<T>(*const T);
unsafe impl<T> Send for SendConstPtr<T> {}
unsafe impl<T> Sync for SendConstPtr<T> {}

/// Innermost-dimension binary kernel with per-stride fast paths
///
/// # Safety
/// Pointers must be valid for `n` elements at the given strides; `out`
/// may alias `a` or `b` only element-for-element (in-place use).
unsafe fn inner_binary<T: Element>(
    f: &impl Fn(T, T) -> T,
    a: *const T,
    b: *const T,
    out: *mut T,
    n: usize,
    sa: isize,
    sb: isize,
    so: isize,
) {
    if sa == 1 && sb == 1 && so == 1 {
        for i in 0..n {
            *out.add(i) = f(*a.add(i), *b.add(i));
        }
    } else if sb == 0 && sa == 1 && so == 1 {
        // right operand invariant along this axis
        let rhs = *b;
        for i in 0..n {
            *out.add(i) = f(*a.add(i), rhs);
        }
    } else if sa == 0 && sb == 1 && so == 1 {
        // left operand invariant along this axis
        let lhs = *a;
        for i in 0..n {
            *out.add(i) = f(lhs, *b.add(i));
        }
    } else {
        for i in 0..n {
            *out.offset(i as isize * so) = f(*a.offset(i as isize * sa), *b.offset(i as isize * sb));
        }
    }
}

unsafe fn inner_unary<T: Element>(
    f: &impl Fn(T) -> T,
    a: *const T,
    out: *mut T,
    n: usize,
    sa: isize,
    so: isize,
) {
    if sa == 1 && so == 1 {
        for i in 0..n {
            *out.add(i) = f(*a.add(i));
        }
    } else {
        for i in 0..n {
            *out.offset(i as isize * so) = f(*a.offset(i as isize * sa));
        }
    }
}

/// Stable insertion sort of axis indices by descending combined stride.
/// The axis with the smallest strides ends up last (innermost), matching
/// the nditer-style locality heuristic.
fn sort_axes(ndim: usize, stride_sets: &[&[isize]]) -> [usize; MAX_NDIM] {
    let mut perm = [0usize; MAX_NDIM];
    for (i, p) in perm.iter_mut().enumerate().take(ndim) {
        *p = i;
    }
    let weight = |ax: usize| -> u64 {
        stride_sets
            .iter()
            .map(|s| s[ax].unsigned_abs() as u64)
            .sum()
    };
    for i in 1..ndim {
        let key = perm[i];
        let kw = weight(key);
        let mut j = i;
        while j > 0 && weight(perm[j - 1]) < kw {
            perm[j] = perm[j - 1];
            j -= 1;
        }
        perm[j] = key;
    }
    perm
}

/// Run a binary closure over broadcast operands, writing into `out`
///
/// `out` must already have the broadcast shape and be contiguous (or be
/// one of the operands for in-place use). Layouts are broadcast to the
/// output shape here; size-1 dims get stride 0.
pub(crate) fn binary_into<T: Element>(
    f: impl Fn(T, T) -> T + Sync,
    a: &Array,
    b: &Array,
    out: &Array,
) -> Result<()> {
    let la = a.layout().broadcast_to(out.shape())?;
    let lb = b.layout().broadcast_to(out.shape())?;
    let lo = out.layout().clone();

    let pa = a.data_ptr::<T>();
    let pb = b.data_ptr::<T>();
    let po = out.data_mut_ptr::<T>();
    let n = out.size();
    if n == 0 {
        return Ok(());
    }

    let flat = la.is_contiguous()
        && lb.is_contiguous()
        && lo.is_contiguous()
        && la.shape() == lo.shape()
        && lb.shape() == lo.shape()
        && !la.strides().contains(&0)
        && !lb.strides().contains(&0);

    if flat || lo.ndim() == 0 {
        flat_binary(&f, pa, pb, po, n);
        return Ok(());
    }

    // Sort axes for locality, then peel the innermost for the kernel.
    let ndim = lo.ndim();
    let perm = sort_axes(ndim, &[la.strides(), lb.strides(), lo.strides()]);
    let mut shape = [0usize; MAX_NDIM];
    let mut sa = [0isize; MAX_NDIM];
    let mut sb = [0isize; MAX_NDIM];
    let mut so = [0isize; MAX_NDIM];
    for i in 0..ndim {
        shape[i] = lo.shape()[perm[i]];
        sa[i] = la.strides()[perm[i]];
        sb[i] = lb.strides()[perm[i]];
        so[i] = lo.strides()[perm[i]];
    }

    let inner = ndim - 1;
    let outer_total: usize = shape[..inner].iter().product();
    let mut indices = [0usize; MAX_NDIM];
    let (mut oa, mut ob, mut oo) = (0isize, 0isize, 0isize);
    for _ in 0..outer_total {
        unsafe {
            inner_binary(
                &f,
                pa.offset(oa),
                pb.offset(ob),
                po.offset(oo),
                shape[inner],
                sa[inner],
                sb[inner],
                so[inner],
            );
        }
        for dim in (0..inner).rev() {
            indices[dim] += 1;
            oa += sa[dim];
            ob += sb[dim];
            oo += so[dim];
            if indices[dim] < shape[dim] {
                break;
            }
            indices[dim] = 0;
            oa -= shape[dim] as isize * sa[dim];
            ob -= shape[dim] as isize * sb[dim];
            oo -= shape[dim] as isize * so[dim];
        }
    }
    Ok(())
}

fn flat_binary<T: Element>(
    f: &(impl Fn(T, T) -> T + Sync),
    pa: *const T,
    pb: *const T,
    po: *mut T,
    n: usize,
) {
    let chunks = parallel_policy().chunk_count(n * std::mem::size_of::<T>());
    if chunks <= 1 {
        unsafe { inner_binary(f, pa, pb, po, n, 1, 1, 1) };
        return;
    }
    let chunk_len = n.div_ceil(chunks);
    let (spa, spb, spo) = (SendConstPtr(pa), SendConstPtr(pb), SendPtr(po));
    (0..chunks).into_par_iter().for_each(|c| {
        // move the wrappers whole; capturing only the pointer fields would
        // sidestep their Send/Sync impls
        let (spa, spb, spo) = (spa, spb, spo);
        let start = c * chunk_len;
        let end = (start + chunk_len).min(n);
        if start < end {
            unsafe {
                inner_binary(
                    f,
                    spa.0.add(start),
                    spb.0.add(start),
                    spo.0.add(start),
                    end - start,
                    1,
                    1,
                    1,
                );
            }
        }
    });
}

/// Run a unary closure over an array, writing into `out`
///
/// `out` must have the same shape; it may alias `a` for in-place use.
pub(crate) fn unary_into<T: Element>(
    f: impl Fn(T) -> T + Sync,
    a: &Array,
    out: &Array,
) -> Result<()> {
    let la = a.layout().clone();
    let lo = out.layout().clone();
    let pa = a.data_ptr::<T>();
    let po = out.data_mut_ptr::<T>();
    let n = out.size();
    if n == 0 {
        return Ok(());
    }

    if (la.is_contiguous() && lo.is_contiguous()) || lo.ndim() == 0 {
        flat_unary(&f, pa, po, n);
        return Ok(());
    }

    let ndim = lo.ndim();
    let perm = sort_axes(ndim, &[la.strides(), lo.strides()]);
    let mut shape = [0usize; MAX_NDIM];
    let mut sa = [0isize; MAX_NDIM];
    let mut so = [0isize; MAX_NDIM];
    for i in 0..ndim {
        shape[i] = lo.shape()[perm[i]];
        sa[i] = la.strides()[perm[i]];
        so[i] = lo.strides()[perm[i]];
    }

    let inner = ndim - 1;
    let outer_total: usize = shape[..inner].iter().product();
    let mut indices = [0usize; MAX_NDIM];
    let (mut oa, mut oo) = (0isize, 0isize);
    for _ in 0..outer_total {
        unsafe {
            inner_unary(&f, pa.offset(oa), po.offset(oo), shape[inner], sa[inner], so[inner]);
        }
        for dim in (0..inner).rev() {
            indices[dim] += 1;
            oa += sa[dim];
            oo += so[dim];
            if indices[dim] < shape[dim] {
                break;
            }
            indices[dim] = 0;
            oa -= shape[dim] as isize * sa[dim];
            oo -= shape[dim] as isize * so[dim];
        }
    }
    Ok(())
}

fn flat_unary<T: Element>(f: &(impl Fn(T) -> T + Sync), pa: *const T, po: *mut T, n: usize) {
    let chunks = parallel_policy().chunk_count(n * std::mem::size_of::<T>());
    if chunks <= 1 {
        unsafe { inner_unary(f, pa, po, n, 1, 1) };
        return;
    }
    let chunk_len = n.div_ceil(chunks);
    let (spa, spo) = (SendConstPtr(pa), SendPtr(po));
    (0..chunks).into_par_iter().for_each(|c| {
        let (spa, spo) = (spa, spo);
        let start = c * chunk_len;
        let end = (start + chunk_len).min(n);
        if start < end {
            unsafe { inner_unary(f, spa.0.add(start), spo.0.add(start), end - start, 1, 1) };
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::SliceSpec;
    use crate::dtype::DType;

    #[test]
    fn test_binary_flat() {
        let a = Array::from_slice(&[1.0f64, 2.0, 3.0], &[3]).unwrap();
        let b = Array::from_slice(&[10.0f64, 20.0, 30.0], &[3]).unwrap();
        let out = Array::zeros(&[3], DType::F64).unwrap();
        binary_into::<f64>(|x, y| x + y, &a, &b, &out).unwrap();
        assert_eq!(out.to_vec::<f64>().unwrap(), vec![11.0, 22.0, 33.0]);
    }

    #[test]
    fn test_binary_broadcast_row() {
        let a = Array::from_slice(&[1i32, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
        let b = Array::from_slice(&[10i32, 20, 30], &[3]).unwrap();
        let out = Array::zeros(&[2, 3], DType::I32).unwrap();
        binary_into::<i32>(|x, y| x + y, &a, &b, &out).unwrap();
        assert_eq!(out.to_vec::<i32>().unwrap(), vec![11, 22, 33, 14, 25, 36]);
    }

    #[test]
    fn test_binary_broadcast_column() {
        let a = Array::from_slice(&[1i32, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
        let b = Array::from_slice(&[100i32, 200], &[2, 1]).unwrap();
        let out = Array::zeros(&[2, 3], DType::I32).unwrap();
        binary_into::<i32>(|x, y| x + y, &a, &b, &out).unwrap();
        assert_eq!(out.to_vec::<i32>().unwrap(), vec![101, 102, 103, 204, 205, 206]);
    }

    #[test]
    fn test_binary_strided_view_operand() {
        let a = Array::from_slice(&[0i64, 1, 2, 3, 4, 5, 6, 7], &[2, 4]).unwrap();
        let v = a
            .slice(&[SliceSpec::range(0, 2), SliceSpec { start: 0, stop: 4, step: 2 }])
            .unwrap();
        let b = Array::from_slice(&[1i64, 1, 1, 1], &[2, 2]).unwrap();
        let out = Array::zeros(&[2, 2], DType::I64).unwrap();
        binary_into::<i64>(|x, y| x * 10 + y, &v, &b, &out).unwrap();
        assert_eq!(out.to_vec::<i64>().unwrap(), vec![1, 21, 41, 61]);
    }

    #[test]
    fn test_unary_transposed_output_order() {
        let a = Array::from_slice(&[1i32, 2, 3, 4], &[2, 2]).unwrap();
        let t = a.transpose(&[1, 0]).unwrap();
        let out = Array::zeros(&[2, 2], DType::I32).unwrap();
        unary_into::<i32>(|x| x * 2, &t, &out).unwrap();
        assert_eq!(out.to_vec::<i32>().unwrap(), vec![2, 6, 4, 8]);
    }

    #[test]
    fn test_binary_inplace_aliasing() {
        let a = Array::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[4]).unwrap();
        let b = Array::from_slice(&[1.0f32, 1.0, 1.0, 1.0], &[4]).unwrap();
        binary_into::<f32>(|x, y| x - y, &a, &b, &a).unwrap();
        assert_eq!(a.to_vec::<f32>().unwrap(), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_flat_paths_split_across_pool() {
        use crate::parallel::{parallel_policy, set_parallel_policy, ParallelPolicy};
        let orig = parallel_policy();
        set_parallel_policy(ParallelPolicy {
            byte_threshold: 0,
            bytes_per_thread: 64,
        });
        let n = 10_000usize;
        let a = Array::from_vec((0..n as i64).collect::<Vec<i64>>()).unwrap();
        let b = Array::full(&[n], DType::I64, 1.0).unwrap();
        let out = Array::zeros(&[n], DType::I64).unwrap();
        binary_into::<i64>(|x, y| x + y, &a, &b, &out).unwrap();
        let v = out.to_vec::<i64>().unwrap();
        assert!(v.iter().enumerate().all(|(i, &x)| x == i as i64 + 1));

        let u = Array::zeros(&[n], DType::I64).unwrap();
        unary_into::<i64>(|x| x * 2, &a, &u).unwrap();
        let w = u.to_vec::<i64>().unwrap();
        assert!(w.iter().enumerate().all(|(i, &x)| x == 2 * i as i64));
        set_parallel_policy(orig);
    }

    #[test]
    fn test_sort_axes_smallest_stride_innermost() {
        let strides: [&[isize]; 1] = [&[1, 4]];
        let perm = sort_axes(2, &strides);
        assert_eq!(&perm[..2], &[1, 0]);
    }
}
