//! N-dimensional resampling primitives over `ndarray` arrays.
//!
//! These are the building blocks the volume-level operations are written
//! against: spline zooming, Gaussian smoothing, block-mean downsampling and
//! affine pull-resampling. They operate on bare arrays and know nothing about
//! affines or headers, except [`affine_transform`], which takes a
//! voxel-to-voxel matrix.
//!
//! [`affine_transform`]: ./fn.affine_transform.html

mod gaussian;
mod spline;

pub use self::gaussian::gaussian_filter;

use nalgebra::{Matrix4, Vector4};
use ndarray::{Array3, ArrayD, ArrayView3, Axis, IxDyn, Zip};

use crate::error::{GeomError, Result};

/// Resample an array by the given per-axis zoom factors using spline
/// interpolation of the given order (0 to 5).
///
/// The output length along each axis is `round(n * factor)` and coordinates
/// are mapped so that the first and last samples of input and output
/// coincide. Orders 2 and above are prefiltered so that unchanged axes and
/// exact grid positions reproduce the input samples; the signal is extended
/// with its nearest value at the boundaries. Axes whose output length equals
/// the input length are passed through untouched.
///
/// # Errors
///
/// - `GeomError::InvalidSplineOrder` if `order > 5`.
/// - `GeomError::ZoomsDimensionality` if the number of factors does not
///   match the array's number of axes.
pub fn zoom(input: &ArrayD<f32>, factors: &[f64], order: usize) -> Result<ArrayD<f32>> {
    if order > 5 {
        return Err(GeomError::InvalidSplineOrder(order));
    }
    if factors.len() != input.ndim() {
        return Err(GeomError::ZoomsDimensionality(input.ndim(), factors.len()));
    }
    let mut data = input.to_owned();
    for (axis, &factor) in factors.iter().enumerate() {
        let n_in = data.shape()[axis];
        let n_out = ((n_in as f64) * factor).round().max(1.0) as usize;
        if n_out != n_in {
            data = resample_axis(&data, axis, n_out, order);
        }
    }
    Ok(data)
}

fn resample_axis(data: &ArrayD<f32>, axis: usize, n_out: usize, order: usize) -> ArrayD<f32> {
    let n_in = data.shape()[axis];
    let scale = if n_out > 1 {
        (n_in as f64 - 1.0) / (n_out as f64 - 1.0)
    } else {
        0.0
    };
    // taps are identical for every lane along this axis
    let taps: Vec<Vec<(usize, f64)>> = (0..n_out)
        .map(|t| spline::interpolation_taps(t as f64 * scale, n_in, order))
        .collect();

    let mut shape = data.shape().to_vec();
    shape[axis] = n_out;
    let mut out = ArrayD::zeros(IxDyn(&shape));
    let mut lane_buf = vec![0.0f64; n_in];
    Zip::from(out.lanes_mut(Axis(axis)))
        .and(data.lanes(Axis(axis)))
        .for_each(|mut o, lane| {
            for (b, &v) in lane_buf.iter_mut().zip(lane.iter()) {
                *b = f64::from(v);
            }
            spline::prefilter(&mut lane_buf, order);
            for (t, taps) in taps.iter().enumerate() {
                o[t] = taps.iter().map(|&(j, w)| w * lane_buf[j]).sum::<f64>() as f32;
            }
        });
    out
}

/// Downsample an array by averaging non-overlapping windows of the given
/// per-axis sizes. Trailing elements that do not fill a whole window are
/// truncated.
pub fn block_mean(input: &ArrayD<f32>, windows: &[usize]) -> ArrayD<f32> {
    assert_eq!(windows.len(), input.ndim());
    assert!(windows.iter().all(|&w| w > 0));
    let out_shape: Vec<usize> = input
        .shape()
        .iter()
        .zip(windows)
        .map(|(&s, &w)| s / w)
        .collect();
    let mut out = ArrayD::zeros(IxDyn(&out_shape));
    for (o, chunk) in out.iter_mut().zip(input.exact_chunks(IxDyn(windows))) {
        let total: f64 = chunk.iter().map(|&v| f64::from(v)).sum();
        *o = (total / chunk.len() as f64) as f32;
    }
    out
}

/// Pull-resample a 3-D array through a voxel-to-voxel affine.
///
/// For every output voxel `(i, j, k)`, the source coordinate is
/// `matrix * (i, j, k, 1)` and the value is interpolated there with a spline
/// of the given order. Coordinates outside the source extent produce `cval`.
///
/// # Errors
///
/// - `GeomError::InvalidSplineOrder` if `order > 5`.
pub fn affine_transform(
    input: ArrayView3<f32>,
    matrix: &Matrix4<f64>,
    out_shape: (usize, usize, usize),
    order: usize,
    cval: f32,
) -> Result<Array3<f32>> {
    if order > 5 {
        return Err(GeomError::InvalidSplineOrder(order));
    }
    let dims = [input.dim().0, input.dim().1, input.dim().2];
    let mut coeffs = input.map(|&v| f64::from(v));
    if order >= 2 {
        for axis in 0..3 {
            for mut lane in coeffs.lanes_mut(Axis(axis)) {
                let mut buf: Vec<f64> = lane.iter().copied().collect();
                spline::prefilter(&mut buf, order);
                for (l, &b) in lane.iter_mut().zip(buf.iter()) {
                    *l = b;
                }
            }
        }
    }
    let mut out = Array3::zeros(out_shape);
    Zip::indexed(&mut out).for_each(|(i, j, k), v| {
        let p = matrix * Vector4::new(i as f64, j as f64, k as f64, 1.0);
        let coords = [p[0], p[1], p[2]];
        let outside = coords
            .iter()
            .zip(&dims)
            .any(|(&c, &n)| c < -0.5 || c > n as f64 - 0.5);
        if outside {
            *v = cval;
            return;
        }
        let tx = spline::interpolation_taps(coords[0], dims[0], order);
        let ty = spline::interpolation_taps(coords[1], dims[1], order);
        let tz = spline::interpolation_taps(coords[2], dims[2], order);
        let mut acc = 0.0f64;
        for &(ix, wx) in &tx {
            for &(iy, wy) in &ty {
                for &(iz, wz) in &tz {
                    acc += wx * wy * wz * coeffs[(ix, iy, iz)];
                }
            }
        }
        *v = acc as f32;
    });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn zoom_by_one_is_identity() {
        let data = ArrayD::from_shape_fn(IxDyn(&[5, 4, 3]), |ix| {
            (ix[0] * 100 + ix[1] * 10 + ix[2]) as f32
        });
        let out = zoom(&data, &[1.0, 1.0, 1.0], 3).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn linear_zoom_doubles_a_ramp() {
        let data = ArrayD::from_shape_fn(IxDyn(&[5]), |ix| ix[0] as f32);
        let out = zoom(&data, &[2.0], 1).unwrap();
        assert_eq!(out.shape(), &[10]);
        // endpoints aligned: ramp 0..4 becomes a ramp 0..4 over 10 samples
        for (t, &v) in out.iter().enumerate() {
            let expected = t as f32 * 4.0 / 9.0;
            assert!((v - expected).abs() < 1e-5, "{} != {}", v, expected);
        }
    }

    #[test]
    fn zoom_rejects_bad_order() {
        let data = ArrayD::zeros(IxDyn(&[4, 4]));
        assert!(zoom(&data, &[1.0, 1.0], 6).is_err());
    }

    #[test]
    fn block_mean_averages_windows() {
        let data = ArrayD::from_shape_fn(IxDyn(&[4, 4]), |ix| (ix[0] * 4 + ix[1]) as f32);
        let out = block_mean(&data, &[2, 2]);
        assert_eq!(out.shape(), &[2, 2]);
        assert_eq!(out[[0, 0]], (0.0 + 1.0 + 4.0 + 5.0) / 4.0);
        assert_eq!(out[[1, 1]], (10.0 + 11.0 + 14.0 + 15.0) / 4.0);
    }

    #[test]
    fn block_mean_truncates_remainders() {
        let data = ArrayD::from_elem(IxDyn(&[5, 7]), 2.0f32);
        let out = block_mean(&data, &[2, 3]);
        assert_eq!(out.shape(), &[2, 2]);
        for &v in out.iter() {
            assert_eq!(v, 2.0);
        }
    }

    #[test]
    fn affine_identity_transform_copies() {
        let data =
            ndarray::Array3::from_shape_fn((3, 4, 5), |(i, j, k)| (i * 20 + j * 5 + k) as f32);
        let out = affine_transform(
            data.view(),
            &nalgebra::Matrix4::identity(),
            (3, 4, 5),
            0,
            -1.0,
        )
        .unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn affine_transform_fills_outside_with_cval() {
        let data = ndarray::Array3::from_elem((2, 2, 2), 5.0f32);
        // shift by 10 voxels: everything lands outside the source
        let mut matrix = nalgebra::Matrix4::identity();
        matrix[(0, 3)] = 10.0;
        let out = affine_transform(data.view(), &matrix, (2, 2, 2), 0, -7.0).unwrap();
        for &v in out.iter() {
            assert_eq!(v, -7.0);
        }
    }
}
