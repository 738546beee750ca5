//! Crate-wide error types.

use quick_error::quick_error;
use std::io::Error as IOError;

quick_error! {
    /// Error type for all geometric transform operations.
    #[derive(Debug)]
    pub enum GeomError {
        /// Number of requested output zooms differs from the volume's
        /// number of axes.
        ZoomsDimensionality(expected: usize, got: usize) {
            display("dimension count mismatch: volume has {} axes, got {} output zooms", expected, got)
        }
        /// The affine's spatial column norms disagree with the stored zooms
        /// (only voxel size = voxel distance is supported).
        InconsistentZooms(zooms: Vec<f32>, norms: Vec<f32>) {
            display("inconsistent affine and zooms: spatial zooms are {:?}, affine column norms are {:?}", zooms, norms)
        }
        /// The computed output zooms are not equal to the reference volume's zooms.
        ReferenceZoomsMismatch(output: Vec<f32>, reference: Vec<f32>) {
            display("output zooms {:?} are not equal to the reference zooms {:?}", output, reference)
        }
        /// Mean downsampling only supports shrinking by an integer factor.
        UnsupportedDownsampling(input_zooms: Vec<f32>) {
            display("mean interpolation only supports downsampling by an integer factor (input zooms: {:?})", input_zooms)
        }
        /// Unknown or repeated anatomical axis code.
        InvalidOrientationCode(code: String) {
            display("invalid orientation code `{}`", code)
        }
        /// Spline interpolation order outside the supported 0..=5 range.
        InvalidSplineOrder(order: usize) {
            display("invalid spline interpolation order {} (must be 0 to 5)", order)
        }
        /// Operation requires a volume with at least 3 spatial axes.
        NonSpatial(ndim: usize) {
            display("operation requires 3 spatial axes, volume has {} dimensions", ndim)
        }
        /// The affine's spatial block is not invertible.
        SingularAffine {
            display("the spatial block of the affine is singular")
        }
        /// Error from the NIfTI reader.
        Nifti(err: nifti::error::NiftiError) {
            from()
            source(err)
            display("{}", err)
        }
        /// I/O error.
        Io(err: IOError) {
            from()
            source(err)
            display("{}", err)
        }
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, GeomError>;
