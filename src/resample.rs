//! Resampling of volumes to new voxel spacings.
//!
//! The grid algebra lives here; the array-level work is delegated to
//! [`ndimage`]. Two interpolation modes are supported: smoothed spline
//! interpolation for arbitrary spacing changes, and anti-aliased block-mean
//! downsampling when the spacing change is an integer shrink factor.
//!
//! [`ndimage`]: ../ndimage/index.html

use approx::abs_diff_eq;
use ndarray::{ArrayD, SliceInfoElem};

use crate::affine::spatial_zooms;
use crate::error::{GeomError, Result};
use crate::ndimage;
use crate::volume::Volume;

/// Absolute tolerance when comparing zooms against each other or against
/// affine column norms.
const ZOOM_TOLERANCE: f32 = 1e-4;

/// Interpolation mode for [`resample`].
///
/// The two modes have distinct preconditions: `Mean` only supports
/// downsampling by an integer factor per axis, while `Spline` accepts any
/// factor but interpolates.
///
/// [`resample`]: ./fn.resample.html
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Anti-aliased downsampling by averaging non-overlapping voxel blocks.
    Mean,
    /// Spline interpolation of the given order (0 to 5).
    Spline(usize),
}

/// Resample a volume to the requested per-axis voxel spacing.
///
/// `output_zooms` must have one entry per volume axis; a `None` entry keeps
/// that axis' input spacing unchanged. With [`Interpolation::Spline`],
/// `prefilter` applies a Gaussian anti-aliasing filter before downsampling
/// (sigma matched to the variance of the equivalent box filter); it has no
/// effect on axes that are upsampled or unchanged. With
/// [`Interpolation::Mean`] the requested zooms are snapped to the closest
/// achievable integer shrink factor, so the output zooms may differ from the
/// request.
///
/// If `reference` is given, the output grid is reconciled with it: the output
/// array is cropped or zero-padded (anchored at index 0 along every axis) to
/// the reference's shape and the reference's affine is reused verbatim.
/// Otherwise the output affine is the input affine with each spatial column
/// rescaled to the new voxel size.
///
/// The returned volume's zooms are set explicitly from the computed output
/// zooms, which also covers non-spatial axes.
///
/// # Errors
///
/// - `GeomError::ZoomsDimensionality` if `output_zooms` has the wrong length.
/// - `GeomError::NonSpatial` if the volume has fewer than 3 axes.
/// - `GeomError::InconsistentZooms` if the affine's spatial column norms
///   disagree with the volume's zooms.
/// - `GeomError::UnsupportedDownsampling` in mean mode, when a factor is an
///   upsampling or not expressible as an integer shrink.
/// - `GeomError::InvalidSplineOrder` for spline orders above 5.
/// - `GeomError::ReferenceZoomsMismatch` if the reference's zooms differ from
///   the computed output zooms.
///
/// [`Interpolation::Spline`]: ./enum.Interpolation.html#variant.Spline
/// [`Interpolation::Mean`]: ./enum.Interpolation.html#variant.Mean
pub fn resample(
    input: &Volume,
    output_zooms: &[Option<f32>],
    interpolation: Interpolation,
    prefilter: bool,
    reference: Option<&Volume>,
) -> Result<Volume> {
    let input_zooms = input.zooms().to_vec();
    if output_zooms.len() != input_zooms.len() {
        return Err(GeomError::ZoomsDimensionality(
            input_zooms.len(),
            output_zooms.len(),
        ));
    }
    if input.ndim() < 3 {
        return Err(GeomError::NonSpatial(input.ndim()));
    }
    // voxel size = voxel distance invariant
    let norms = spatial_zooms(input.affine());
    for (&z, &n) in input_zooms.iter().zip(norms.iter()) {
        if !abs_diff_eq!(z, n, epsilon = ZOOM_TOLERANCE) {
            return Err(GeomError::InconsistentZooms(
                input_zooms.clone(),
                norms.to_vec(),
            ));
        }
    }
    // resolve the "keep as input" sentinels early; everything downstream
    // works on a fully specified zooms vector
    let requested: Vec<f32> = input_zooms
        .iter()
        .zip(output_zooms)
        .map(|(&iz, oz)| oz.unwrap_or(iz))
        .collect();

    let (resampled, zoom_factors, actual_zooms) = match interpolation {
        Interpolation::Mean => mean_downsample(input.data(), &input_zooms, &requested)?,
        Interpolation::Spline(order) => {
            spline_resample(input.data(), &input_zooms, &requested, order, prefilter)?
        }
    };

    let (output_array, output_affine) = match reference {
        Some(reference) => {
            let matches = reference.zooms().len() == actual_zooms.len()
                && actual_zooms
                    .iter()
                    .zip(reference.zooms())
                    .all(|(&oz, &rz)| abs_diff_eq!(oz, rz, epsilon = ZOOM_TOLERANCE));
            if !matches {
                return Err(GeomError::ReferenceZoomsMismatch(
                    actual_zooms,
                    reference.zooms().to_vec(),
                ));
            }
            let mut reconciled = ArrayD::zeros(reference.data().raw_dim());
            let overlap: Vec<SliceInfoElem> = resampled
                .shape()
                .iter()
                .zip(reference.shape())
                .map(|(&a, &b)| SliceInfoElem::Slice {
                    start: 0,
                    end: Some(a.min(b) as isize),
                    step: 1,
                })
                .collect();
            reconciled
                .slice_mut(overlap.as_slice())
                .assign(&resampled.slice(overlap.as_slice()));
            (reconciled, *reference.affine())
        }
        None => {
            let mut affine = *input.affine();
            for j in 0..3 {
                for i in 0..3 {
                    affine[(i, j)] /= zoom_factors[j] as f32;
                }
            }
            (resampled, affine)
        }
    };

    let mut output = Volume::new(output_array, output_affine);
    output.set_zooms(&actual_zooms)?;
    Ok(output)
}

/// Block-mean path: snap every axis to an integer shrink factor and average.
fn mean_downsample(
    data: &ArrayD<f32>,
    input_zooms: &[f32],
    requested: &[f32],
) -> Result<(ArrayD<f32>, Vec<f64>, Vec<f32>)> {
    for (&iz, &oz) in input_zooms.iter().zip(requested) {
        if 4.0 / 3.0 * oz < iz {
            return Err(GeomError::UnsupportedDownsampling(input_zooms.to_vec()));
        }
    }
    let mut zoom_factors = Vec::with_capacity(input_zooms.len());
    let mut windows = Vec::with_capacity(input_zooms.len());
    let mut actual_zooms = Vec::with_capacity(input_zooms.len());
    for (&iz, &oz) in input_zooms.iter().zip(requested) {
        let factor = if iz > 2.0 / 3.0 * oz {
            1.0
        } else {
            1.0 / (f64::from(oz) / f64::from(iz)).round()
        };
        windows.push((1.0 / factor).round() as usize);
        actual_zooms.push((f64::from(iz) / factor) as f32);
        zoom_factors.push(factor);
    }
    let out = ndimage::block_mean(data, &windows);
    Ok((out, zoom_factors, actual_zooms))
}

/// Spline path: optional Gaussian anti-aliasing, then spline zooming.
fn spline_resample(
    data: &ArrayD<f32>,
    input_zooms: &[f32],
    requested: &[f32],
    order: usize,
    prefilter: bool,
) -> Result<(ArrayD<f32>, Vec<f64>, Vec<f32>)> {
    if order > 5 {
        return Err(GeomError::InvalidSplineOrder(order));
    }
    let zoom_factors: Vec<f64> = input_zooms
        .iter()
        .zip(requested)
        .map(|(&iz, &oz)| f64::from(iz) / f64::from(oz))
        .collect();
    let smoothed;
    let source = if prefilter {
        // box filter of width 1/factor has variance ((1/factor)^2 - 1) / 12;
        // a Gaussian of matching variance suppresses the aliasing band
        let sigmas: Vec<f64> = zoom_factors
            .iter()
            .map(|&f| {
                if f < 1.0 {
                    (((1.0 / f).powi(2) - 1.0) / 12.0).sqrt()
                } else {
                    0.0
                }
            })
            .collect();
        smoothed = ndimage::gaussian_filter(data, &sigmas);
        &smoothed
    } else {
        data
    };
    let out = ndimage::zoom(source, &zoom_factors, order)?;
    Ok((out, zoom_factors, requested.to_vec()))
}
