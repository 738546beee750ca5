//! Geometric transforms for NIfTI volumes.
//!
//! This crate manipulates volumetric medical images represented as a dense
//! voxel array plus a 4x4 affine: loading them from NIfTI files, reorienting
//! them to a canonical anatomical axis ordering, resampling them to new voxel
//! spacings (smoothed spline interpolation or anti-aliased block-mean
//! downsampling), orthogonalizing oblique acquisitions and measuring the
//! axis skew of an affine.
//!
//! File parsing is delegated to the `nifti` crate; arrays are `ndarray`
//! arrays and affines are `nalgebra` matrices.
#![deny(missing_debug_implementations)]
#![warn(missing_docs, trivial_casts, unused_results)]

pub mod affine;
pub mod error;
pub mod ndimage;
pub mod orient;
pub mod ortho;
pub mod resample;
pub mod volume;

pub use crate::affine::{angles_between_axes, is_orthogonal_affine, Affine3, Affine4};
pub use crate::error::{GeomError, Result};
pub use crate::orient::{axis_codes, reorient};
pub use crate::ortho::orthogonalize;
pub use crate::resample::{resample, Interpolation};
pub use crate::volume::Volume;
