//! Separable Gaussian smoothing with nearest-value boundary extension.

use ndarray::{ArrayD, Axis, Zip};

/// Discrete Gaussian kernel for the given sigma, truncated at 4 standard
/// deviations and normalized to unit sum.
fn kernel(sigma: f64) -> Vec<f64> {
    let radius = (4.0 * sigma + 0.5) as isize;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|i| (-0.5 * (i as f64 / sigma).powi(2)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

fn filter_axis(data: &ArrayD<f32>, axis: usize, sigma: f64) -> ArrayD<f32> {
    let weights = kernel(sigma);
    let radius = (weights.len() / 2) as isize;
    let n = data.shape()[axis] as isize;
    let mut out = ArrayD::zeros(data.raw_dim());
    Zip::from(out.lanes_mut(Axis(axis)))
        .and(data.lanes(Axis(axis)))
        .for_each(|mut o, lane| {
            for t in 0..n {
                let mut acc = 0.0f64;
                for (k, &w) in weights.iter().enumerate() {
                    let j = (t + k as isize - radius).max(0).min(n - 1);
                    acc += w * f64::from(lane[j as usize]);
                }
                o[t as usize] = acc as f32;
            }
        });
    out
}

/// Smooth an array with an axis-separable Gaussian filter.
///
/// `sigmas` gives the standard deviation in voxels along each axis; axes with
/// a non-positive sigma are left untouched. The signal is extended with its
/// nearest value past either end.
pub fn gaussian_filter(input: &ArrayD<f32>, sigmas: &[f64]) -> ArrayD<f32> {
    assert_eq!(sigmas.len(), input.ndim());
    let mut data = input.to_owned();
    for (axis, &sigma) in sigmas.iter().enumerate() {
        if sigma > 0.0 {
            data = filter_axis(&data, axis, sigma);
        }
    }
    data
}
