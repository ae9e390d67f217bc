//! Integration tests for array creation and shape operations
//!
//! Tests verify correctness across:
//! - Creation routines (zeros, ones, full, arange, linspace)
//! - Zero-copy views (slice, transpose, reshape, flatten)
//! - Materialization (copy, to_contiguous, concat, astype)
//! - Error paths

use numo::array::SliceSpec;
use numo::{Array, DType, Error};

// ============================================================================
// Creation
// ============================================================================

#[test]
fn test_zeros_all_dtypes() {
    for dt in DType::ALL {
        let a = Array::zeros(&[2, 3], dt).unwrap();
        assert_eq!(a.shape(), &[2, 3]);
        assert_eq!(a.dtype(), dt);
        assert_eq!(a.size(), 6);
        assert!(a.is_contiguous());
    }
}

#[test]
fn test_full_converts_value() {
    let a = Array::full(&[4], DType::I16, 3.9).unwrap();
    assert_eq!(a.to_vec::<i16>().unwrap(), vec![3, 3, 3, 3]);

    let b = Array::full(&[2], DType::F64, -0.5).unwrap();
    assert_eq!(b.to_vec::<f64>().unwrap(), vec![-0.5, -0.5]);
}

#[test]
fn test_full_saturates_out_of_range() {
    let a = Array::full(&[2], DType::U8, 300.0).unwrap();
    assert_eq!(a.to_vec::<u8>().unwrap(), vec![255, 255]);

    let b = Array::full(&[2], DType::I8, -1000.0).unwrap();
    assert_eq!(b.to_vec::<i8>().unwrap(), vec![-128, -128]);
}

#[test]
fn test_arange_positive_and_negative_step() {
    let a = Array::arange(2, 11, 4, DType::U32).unwrap();
    assert_eq!(a.to_vec::<u32>().unwrap(), vec![2, 6, 10]);

    let b = Array::arange(10, 0, -3, DType::I8).unwrap();
    assert_eq!(b.to_vec::<i8>().unwrap(), vec![10, 7, 4, 1]);
}

#[test]
fn test_arange_rejects_bad_arguments() {
    assert!(matches!(
        Array::arange(0, 10, 0, DType::F32),
        Err(Error::InvalidArgument { op: "arange", .. })
    ));
    // direction disagrees with step
    assert!(Array::arange(0, 10, -1, DType::F32).is_err());
    assert!(Array::arange(10, 0, 1, DType::F32).is_err());
    // negative bounds on unsigned dtype
    assert!(Array::arange(-5, 5, 1, DType::U16).is_err());
}

#[test]
fn test_linspace_endpoints_exact() {
    let a = Array::linspace(-3, 3, 7, DType::F64).unwrap();
    let v = a.to_vec::<f64>().unwrap();
    assert_eq!(v.len(), 7);
    assert_eq!(v[0], -3.0);
    assert_eq!(v[6], 3.0);
    assert!((v[3]).abs() < 1e-12);
}

#[test]
fn test_linspace_integer_step_truncates() {
    // step = 10 / 3 computed in i64 is 3
    let a = Array::linspace(0, 10, 4, DType::I64).unwrap();
    assert_eq!(a.to_vec::<i64>().unwrap(), vec![0, 3, 6, 10]);
}

#[test]
fn test_rank_zero_scalar_array() {
    let s = Array::from_slice(&[42i32], &[]).unwrap();
    assert_eq!(s.ndim(), 0);
    assert_eq!(s.size(), 1);
    assert_eq!(s.at::<i32>(&[]).unwrap(), 42);
}

// ============================================================================
// Views
// ============================================================================

#[test]
fn test_slice_of_slice() {
    let a = Array::arange(0, 24, 1, DType::I32)
        .unwrap()
        .reshape(&[4, 6])
        .unwrap();
    let v = a
        .slice(&[SliceSpec::range(1, 4), SliceSpec { start: 0, stop: 6, step: 2 }])
        .unwrap();
    assert_eq!(v.shape(), &[3, 3]);
    assert_eq!(
        v.to_vec::<i32>().unwrap(),
        vec![6, 8, 10, 12, 14, 16, 18, 20, 22]
    );

    let vv = v
        .slice(&[SliceSpec::range(0, 3), SliceSpec::range(1, 3)])
        .unwrap();
    assert_eq!(vv.to_vec::<i32>().unwrap(), vec![8, 10, 14, 16, 20, 22]);
}

#[test]
fn test_slice_invalid_reports_dimension() {
    let a = Array::zeros(&[3, 5], DType::F32).unwrap();
    let err = a
        .slice(&[SliceSpec::range(0, 3), SliceSpec::range(2, 9)])
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidSlice { dim: 1, stop: 9, size: 5, .. }
    ));
}

#[test]
fn test_transpose_3d() {
    let a = Array::arange(0, 24, 1, DType::F32)
        .unwrap()
        .reshape(&[2, 3, 4])
        .unwrap();
    let t = a.transpose(&[2, 0, 1]).unwrap();
    assert_eq!(t.shape(), &[4, 2, 3]);
    assert_eq!(t.at::<f32>(&[1, 0, 2]).unwrap(), a.at::<f32>(&[0, 2, 1]).unwrap());
}

#[test]
fn test_flatten_view_shares_storage() {
    let a = Array::zeros(&[2, 3], DType::U64).unwrap();
    let f = a.flatten().unwrap();
    assert_eq!(f.shape(), &[6]);
    assert!(!a.owns_data());
}

#[test]
fn test_reshape_size_mismatch() {
    let a = Array::zeros(&[2, 3], DType::F32).unwrap();
    assert!(matches!(
        a.reshape(&[4, 2]),
        Err(Error::SizeMismatch { expected: 6, got: 8 })
    ));
}

// ============================================================================
// Materialization
// ============================================================================

#[test]
fn test_to_contiguous_is_noop_when_contiguous() {
    let a = Array::zeros(&[2, 2], DType::F32).unwrap();
    let c = a.to_contiguous().unwrap();
    // clone of the view, not a fresh allocation
    assert!(!c.owns_data());
}

#[test]
fn test_copy_detaches_from_source() {
    let a = Array::from_slice(&[1i32, 2, 3, 4], &[4]).unwrap();
    let c = a.copy().unwrap();
    assert!(c.owns_data());
    assert!(a.owns_data());
    assert_eq!(c.to_vec::<i32>().unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn test_concat_of_views() {
    let a = Array::arange(0, 12, 1, DType::I32)
        .unwrap()
        .reshape(&[3, 4])
        .unwrap();
    let top = a.slice(&[SliceSpec::range(0, 1), SliceSpec::range(0, 4)]).unwrap();
    let bottom = a.slice(&[SliceSpec::range(2, 3), SliceSpec::range(0, 4)]).unwrap();
    let c = top.concat(&bottom, 0).unwrap();
    assert_eq!(c.shape(), &[2, 4]);
    assert_eq!(c.to_vec::<i32>().unwrap(), vec![0, 1, 2, 3, 8, 9, 10, 11]);
}

#[test]
fn test_astype_round_trips_small_ints() {
    let a = Array::arange(0, 100, 1, DType::U8).unwrap();
    let f = a.astype(DType::F64).unwrap();
    let back = f.astype(DType::U8).unwrap();
    assert_eq!(back.to_vec::<u8>().unwrap(), a.to_vec::<u8>().unwrap());
}

#[test]
fn test_astype_of_strided_view() {
    let a = Array::arange(0, 8, 1, DType::I32)
        .unwrap()
        .reshape(&[2, 4])
        .unwrap();
    let t = a.transpose(&[1, 0]).unwrap();
    let f = t.astype(DType::F32).unwrap();
    assert!(f.is_contiguous());
    assert_eq!(
        f.to_vec::<f32>().unwrap(),
        vec![0.0, 4.0, 1.0, 5.0, 2.0, 6.0, 3.0, 7.0]
    );
}
