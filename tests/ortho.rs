//! The resampling settings are process-wide, so every test here serializes
//! through a single lock.

use std::sync::{Mutex, MutexGuard, PoisonError};

use approx::assert_abs_diff_eq;
use ndarray::{ArrayD, IxDyn};
use nifti_geom::ortho::{
    orthogonalize, resample_padding, resample_spline_order, set_resample_padding,
    set_resample_spline_order,
};
use nifti_geom::{is_orthogonal_affine, Affine4, GeomError, Volume};

static LOCK: Mutex<()> = Mutex::new(());

/// A failed test must not poison the lock for the rest of the suite.
fn serialize() -> MutexGuard<'static, ()> {
    LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A constant 8x8x8 volume rotated 15 degrees about the z axis.
#[rustfmt::skip]
fn oblique_volume(value: f32) -> Volume {
    let (s, c) = 15f32.to_radians().sin_cos();
    let affine = Affine4::new(
        c,  -s,  0.0, 1.0,
        s,   c,  0.0, 2.0,
        0.0, 0.0, 1.0, 3.0,
        0.0, 0.0, 0.0, 1.0,
    );
    Volume::new(ArrayD::from_elem(IxDyn(&[8, 8, 8]), value), affine)
}

#[test]
fn orthogonalized_volume_is_axis_aligned() {
    let _guard = serialize();
    let volume = oblique_volume(5.0);
    let out = orthogonalize(&volume, 0.0, 0).unwrap();
    assert_eq!(out.len(), 1);
    let out = &out[0];
    assert!(is_orthogonal_affine(out.affine(), [0.01, 0.01, 0.01]));
    for i in 0..3 {
        for j in 0..3 {
            if i != j {
                assert_eq!(out.affine()[(i, j)], 0.0);
            }
        }
    }
    // voxel size carried over from the input, up to rounding in the norms
    for &z in out.zooms() {
        assert_abs_diff_eq!(z, 1.0, epsilon = 1e-5);
    }
    // the interior of the rotated cube keeps its value
    let center = [out.shape()[0] / 2, out.shape()[1] / 2, out.shape()[2] / 2];
    assert_eq!(out.data()[center], 5.0);
}

#[test]
fn padding_fills_the_corners_of_the_bounding_box() {
    let _guard = serialize();
    let volume = oblique_volume(5.0);
    let out = orthogonalize(&volume, -1.0, 0).unwrap();
    let out = &out[0];
    // the rotated cube cannot reach the corner of its own bounding box
    assert_eq!(out.data()[[0, 0, 0]], -1.0);
}

#[test]
fn settings_are_restored_after_a_successful_call() {
    let _guard = serialize();
    let volume = oblique_volume(2.0);
    let _out = orthogonalize(&volume, -100.0, 3).unwrap();
    assert_eq!(resample_padding(), 0.0);
    assert_eq!(resample_spline_order(), 0);
}

#[test]
fn settings_are_restored_after_a_failed_call() {
    let _guard = serialize();
    let four_d = Volume::new(ArrayD::zeros(IxDyn(&[4, 4, 4, 2])), Affine4::identity());
    match orthogonalize(&four_d, 9.0, 5) {
        Err(GeomError::NonSpatial(4)) => {}
        other => panic!("expected NonSpatial, got {:?}", other),
    }
    assert_eq!(resample_padding(), 0.0);
    assert_eq!(resample_spline_order(), 0);
}

#[test]
fn settings_round_trip() {
    let _guard = serialize();
    set_resample_padding(-3.5);
    set_resample_spline_order(2);
    assert_eq!(resample_padding(), -3.5);
    assert_eq!(resample_spline_order(), 2);
    set_resample_padding(0.0);
    set_resample_spline_order(0);
}

#[test]
fn higher_order_orthogonalization_keeps_a_constant_interior() {
    let _guard = serialize();
    let volume = oblique_volume(5.0);
    let out = orthogonalize(&volume, 0.0, 3).unwrap();
    let out = &out[0];
    let center = [out.shape()[0] / 2, out.shape()[1] / 2, out.shape()[2] / 2];
    assert!((out.data()[center] - 5.0).abs() < 1e-3);
}
