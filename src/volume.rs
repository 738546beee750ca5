//! The in-memory volume entity and its loader.
//!
//! A [`Volume`] pairs a dense, fully materialized voxel array with the affine
//! mapping voxel indices to physical space and the per-axis voxel spacing
//! (zooms). The first three zooms conventionally equal the norms of the
//! affine's spatial columns; trailing zooms (e.g. the repetition time of a
//! temporal axis) are carried independently, since they have no representation
//! in the 3x3 spatial block.
//!
//! Transformations in this crate never mutate a volume's geometry in place,
//! they produce new `Volume` values.
//!
//! [`Volume`]: ./struct.Volume.html

use std::path::Path;

use ndarray::ArrayD;
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};

use crate::affine::{spatial_zooms, Affine4};
use crate::error::{GeomError, Result};

/// A volumetric image: voxel array, affine and per-axis spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    data: ArrayD<f32>,
    affine: Affine4,
    zooms: Vec<f32>,
}

impl Volume {
    /// Create a volume from a voxel array and an affine.
    ///
    /// The spatial zooms are derived from the affine's column norms;
    /// any trailing axes default to a spacing of 1.
    pub fn new(data: ArrayD<f32>, affine: Affine4) -> Volume {
        let spatial = spatial_zooms(&affine);
        let zooms = (0..data.ndim())
            .map(|i| if i < 3 { spatial[i] } else { 1.0 })
            .collect();
        Volume {
            data,
            affine,
            zooms,
        }
    }

    /// Create a volume with explicitly given per-axis zooms.
    ///
    /// # Errors
    ///
    /// - `GeomError::ZoomsDimensionality` if the number of zooms does not
    ///   match the array's number of axes.
    pub fn with_zooms(data: ArrayD<f32>, affine: Affine4, zooms: Vec<f32>) -> Result<Volume> {
        if zooms.len() != data.ndim() {
            return Err(GeomError::ZoomsDimensionality(data.ndim(), zooms.len()));
        }
        Ok(Volume {
            data,
            affine,
            zooms,
        })
    }

    /// Load a volume from a NIfTI file (`.nii` or `.nii.gz`).
    ///
    /// The lazily decoded voxel data is materialized into a concrete `f32`
    /// array, with any slope/intercept scaling already applied. The affine is
    /// taken from the header (sform/qform resolution is up to the reader) and
    /// the zooms from the header's grid spacings.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Volume> {
        let obj = ReaderOptions::new().read_file(path)?;
        let header = obj.header().clone();
        let affine: Affine4 = header.affine();
        let data = obj.into_volume().into_ndarray::<f32>()?;
        let zooms = (0..data.ndim()).map(|i| header.pixdim[i + 1].abs()).collect();
        Ok(Volume {
            data,
            affine,
            zooms,
        })
    }

    /// The voxel array.
    pub fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    /// The affine mapping voxel indices to physical coordinates.
    pub fn affine(&self) -> &Affine4 {
        &self.affine
    }

    /// Per-axis voxel spacing.
    pub fn zooms(&self) -> &[f32] {
        &self.zooms
    }

    /// Shape of the voxel array.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Number of axes of the voxel array.
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Replace the stored per-axis zooms.
    ///
    /// This does not touch the affine: it exists so that the spacing of
    /// non-spatial axes can be recorded after a resampling operation.
    ///
    /// # Errors
    ///
    /// - `GeomError::ZoomsDimensionality` on a dimension count mismatch.
    pub fn set_zooms(&mut self, zooms: &[f32]) -> Result<()> {
        if zooms.len() != self.data.ndim() {
            return Err(GeomError::ZoomsDimensionality(self.data.ndim(), zooms.len()));
        }
        self.zooms = zooms.to_vec();
        Ok(())
    }
}
