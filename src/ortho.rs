//! Orthogonalization of oblique volumes.
//!
//! An oblique acquisition has voxel axes that are rotated against the
//! physical axes. [`resample_volumes`] pulls one or more volumes onto a
//! common axis-aligned grid covering their joint physical extent, governed by
//! two process-wide settings: the padding value used outside the source
//! extent and the spline order of the interpolation.
//!
//! [`orthogonalize`] wraps a single call with a scoped reconfiguration of
//! those settings, restoring the defaults (padding 0, order 0) on every exit
//! path, including errors.
//!
//! # Concurrency caveat
//!
//! The settings are process-wide. Call sites that resample concurrently must
//! serialize access around [`orthogonalize`] (or avoid mixing it with direct
//! calls to [`resample_volumes`]); this module does not lock internally.
//!
//! [`resample_volumes`]: ./fn.resample_volumes.html
//! [`orthogonalize`]: ./fn.orthogonalize.html

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use nalgebra::Vector4;
use ndarray::Ix3;

use crate::affine::Affine4;
use crate::error::{GeomError, Result};
use crate::ndimage;
use crate::volume::Volume;

// f32 stored as bits; 0.0f32 is all-zero bits
static RESAMPLE_PADDING: AtomicU32 = AtomicU32::new(0);
static RESAMPLE_SPLINE_ORDER: AtomicUsize = AtomicUsize::new(0);

/// Set the process-wide padding value used for voxels that fall outside the
/// source volume during grid resampling. Default is 0.
pub fn set_resample_padding(value: f32) {
    RESAMPLE_PADDING.store(value.to_bits(), Ordering::SeqCst);
}

/// The current process-wide resampling padding value.
pub fn resample_padding() -> f32 {
    f32::from_bits(RESAMPLE_PADDING.load(Ordering::SeqCst))
}

/// Set the process-wide spline interpolation order used for grid resampling.
/// Default is 0 (nearest).
pub fn set_resample_spline_order(order: usize) {
    RESAMPLE_SPLINE_ORDER.store(order, Ordering::SeqCst);
}

/// The current process-wide resampling spline order.
pub fn resample_spline_order() -> usize {
    RESAMPLE_SPLINE_ORDER.load(Ordering::SeqCst)
}

/// Restores the default settings when dropped, so a reconfiguration cannot
/// leak past the call that made it.
struct DefaultSettingsGuard;

impl Drop for DefaultSettingsGuard {
    fn drop(&mut self) {
        set_resample_spline_order(0);
        set_resample_padding(0.0);
    }
}

/// Resample 3-D volumes onto a common axis-aligned grid.
///
/// The grid covers the joint physical bounding box of all the volumes'
/// corner voxels, with the first volume's spatial zooms as voxel size and a
/// diagonal affine anchored at the minimum corner. Each volume is
/// pull-resampled onto that grid using the current process-wide spline order
/// and padding value.
///
/// # Errors
///
/// - `GeomError::NonSpatial` if any volume is not 3-dimensional.
/// - `GeomError::SingularAffine` if a volume's affine cannot be inverted.
pub fn resample_volumes(volumes: &[Volume]) -> Result<Vec<Volume>> {
    let first = match volumes.first() {
        Some(v) => v,
        None => return Ok(Vec::new()),
    };
    for volume in volumes {
        if volume.ndim() != 3 {
            return Err(GeomError::NonSpatial(volume.ndim()));
        }
    }
    let voxel_size = [
        f64::from(first.zooms()[0]),
        f64::from(first.zooms()[1]),
        f64::from(first.zooms()[2]),
    ];

    // joint physical bounding box over all corner voxels
    let mut min_world = [f64::INFINITY; 3];
    let mut max_world = [f64::NEG_INFINITY; 3];
    for volume in volumes {
        let m = volume.affine().map(f64::from);
        let shape = volume.shape();
        for corner in 0..8u32 {
            let index = |axis: usize| {
                if corner >> axis & 1 == 1 {
                    shape[axis] as f64 - 1.0
                } else {
                    0.0
                }
            };
            let world = m * Vector4::new(index(0), index(1), index(2), 1.0);
            for axis in 0..3 {
                min_world[axis] = min_world[axis].min(world[axis]);
                max_world[axis] = max_world[axis].max(world[axis]);
            }
        }
    }

    let mut out_shape = [0usize; 3];
    let mut out_affine = Affine4::identity();
    for axis in 0..3 {
        let extent = max_world[axis] - min_world[axis];
        out_shape[axis] = (extent / voxel_size[axis]).ceil() as usize + 1;
        out_affine[(axis, axis)] = voxel_size[axis] as f32;
        out_affine[(axis, 3)] = min_world[axis] as f32;
    }

    let order = resample_spline_order();
    let padding = resample_padding();
    let out_affine_f64 = out_affine.map(f64::from);
    let mut results = Vec::with_capacity(volumes.len());
    for volume in volumes {
        let inverse = volume
            .affine()
            .map(f64::from)
            .try_inverse()
            .ok_or(GeomError::SingularAffine)?;
        let matrix = inverse * out_affine_f64;
        let data = volume
            .data()
            .view()
            .into_dimensionality::<Ix3>()
            .map_err(|_| GeomError::NonSpatial(volume.ndim()))?;
        let resampled = ndimage::affine_transform(
            data,
            &matrix,
            (out_shape[0], out_shape[1], out_shape[2]),
            order,
            padding,
        )?;
        results.push(Volume::new(resampled.into_dyn(), out_affine));
    }
    Ok(results)
}

/// Orthogonalize an oblique volume by resampling it onto an axis-aligned
/// grid, returning the singleton list of resampled volumes.
///
/// The process-wide resampling settings are set to the given padding value
/// and spline order for the duration of the call and unconditionally restored
/// to their defaults afterwards, including on error paths.
pub fn orthogonalize(
    volume: &Volume,
    resample_padding: f32,
    resample_spline_order: usize,
) -> Result<Vec<Volume>> {
    set_resample_padding(resample_padding);
    set_resample_spline_order(resample_spline_order);
    let _restore = DefaultSettingsGuard;
    resample_volumes(std::slice::from_ref(volume))
}
