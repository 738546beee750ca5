use nalgebra::Vector4;
use ndarray::{ArrayD, IxDyn};
use nifti_geom::{axis_codes, reorient, Affine4, GeomError, Volume};
use pretty_assertions::assert_eq;

#[rustfmt::skip]
fn lps_volume() -> Volume {
    let data = ArrayD::from_shape_fn(IxDyn(&[2, 3, 4]), |ix| {
        (ix[0] * 100 + ix[1] * 10 + ix[2]) as f32
    });
    let affine = Affine4::new(
        -1.0,  0.0, 0.0, 10.0,
         0.0, -2.0, 0.0, 20.0,
         0.0,  0.0, 3.0, 30.0,
         0.0,  0.0, 0.0,  1.0,
    );
    Volume::new(data, affine)
}

fn assert_same_world(a: &Volume, ai: [usize; 3], b: &Volume, bi: [usize; 3]) {
    let wa = a.affine() * Vector4::new(ai[0] as f32, ai[1] as f32, ai[2] as f32, 1.0);
    let wb = b.affine() * Vector4::new(bi[0] as f32, bi[1] as f32, bi[2] as f32, 1.0);
    for axis in 0..3 {
        assert!(
            (wa[axis] - wb[axis]).abs() < 1e-4,
            "world mismatch on axis {}: {} vs {}",
            axis,
            wa[axis],
            wb[axis]
        );
    }
}

#[test]
fn axis_codes_from_affine() {
    let volume = lps_volume();
    assert_eq!(axis_codes(volume.affine()).unwrap(), ['L', 'P', 'S']);
}

#[test]
fn reorienting_to_the_current_orientation_is_the_identity() {
    let volume = lps_volume();
    let out = reorient(&volume, "LPS").unwrap();
    assert_eq!(out, volume);
}

#[test]
fn reorient_lps_to_ras_flips_the_first_two_axes() {
    let volume = lps_volume();
    let out = reorient(&volume, "RAS").unwrap();
    assert_eq!(axis_codes(out.affine()).unwrap(), ['R', 'A', 'S']);
    assert_eq!(out.shape(), volume.shape());
    assert_eq!(out.zooms(), volume.zooms());
    for i in 0..2 {
        for j in 0..3 {
            for k in 0..4 {
                let flipped = [1 - i, 2 - j, k];
                assert_eq!(out.data()[[i, j, k]], volume.data()[flipped]);
                assert_same_world(&out, [i, j, k], &volume, flipped);
            }
        }
    }
}

#[test]
fn reorientation_round_trip_restores_the_volume() {
    let volume = lps_volume();
    let ras = reorient(&volume, "RAS").unwrap();
    let back = reorient(&ras, "LPS").unwrap();
    assert_eq!(back, volume);
}

#[test]
fn reorient_can_permute_axes() {
    let volume = lps_volume();
    let out = reorient(&volume, "PLS").unwrap();
    assert_eq!(axis_codes(out.affine()).unwrap(), ['P', 'L', 'S']);
    assert_eq!(out.shape(), &[3, 2, 4]);
    assert_eq!(out.zooms(), &[2.0, 1.0, 3.0]);
    for i in 0..2 {
        for j in 0..3 {
            for k in 0..4 {
                assert_eq!(out.data()[[j, i, k]], volume.data()[[i, j, k]]);
                assert_same_world(&out, [j, i, k], &volume, [i, j, k]);
            }
        }
    }
}

#[test]
fn reorient_leaves_trailing_axes_alone() {
    let data = ArrayD::from_shape_fn(IxDyn(&[2, 3, 4, 5]), |ix| {
        (ix[0] * 1000 + ix[1] * 100 + ix[2] * 10 + ix[3]) as f32
    });
    let affine = {
        let mut a = Affine4::identity();
        a[(0, 0)] = -1.0;
        a[(1, 1)] = -2.0;
        a[(2, 2)] = 3.0;
        a
    };
    let volume = Volume::with_zooms(data, affine, vec![1.0, 2.0, 3.0, 7.5]).unwrap();
    let out = reorient(&volume, "RAS").unwrap();
    assert_eq!(out.shape(), &[2, 3, 4, 5]);
    assert_eq!(out.zooms(), &[1.0, 2.0, 3.0, 7.5]);
    for t in 0..5 {
        assert_eq!(out.data()[[0, 0, 0, t]], volume.data()[[1, 2, 0, t]]);
    }
}

#[test]
fn invalid_orientation_codes_are_rejected() {
    let volume = lps_volume();
    for code in &["XYZ", "LLS", "LP", "LPSI", ""] {
        match reorient(&volume, code) {
            Err(GeomError::InvalidOrientationCode(c)) => assert_eq!(&c, code),
            other => panic!("expected invalid code error for {:?}, got {:?}", code, other),
        }
    }
}
