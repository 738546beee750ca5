//! Pure functions over 4x4 spatial transforms: separation into rotation and
//! translation parts, axis angle computation and orthogonality tests.
//!
//! The affine maps voxel index coordinates `(i, j, k, 1)` to physical space
//! coordinates `(x, y, z, 1)`. Angles are computed between the first three
//! columns of the matrix, which span the voxel axes in physical space.

use nalgebra::{Matrix3, Matrix4, Vector3};

/// 3x3 affine matrix type (the rotation/zoom/shear block).
pub type Affine3 = Matrix3<f32>;
/// 4x4 affine matrix type.
pub type Affine4 = Matrix4<f32>;

/// Separate a 4x4 affine into its 3x3 affine and translation components.
pub fn get_affine_and_translation(affine: &Affine4) -> (Affine3, Vector3<f32>) {
    let translation = Vector3::new(affine[12], affine[13], affine[14]);
    let affine = affine.fixed_view::<3, 3>(0, 0).into_owned();
    (affine, translation)
}

/// Physical voxel spacing implied by the affine: the norms of the first three
/// columns of the spatial block.
pub fn spatial_zooms(affine: &Affine4) -> [f32; 3] {
    let rzs = affine.fixed_view::<3, 3>(0, 0);
    [
        rzs.column(0).norm(),
        rzs.column(1).norm(),
        rzs.column(2).norm(),
    ]
}

/// Calculate the angles between the voxel axes of an affine, as the
/// `(xy, xz, yz)` pairwise angles between its first three columns.
///
/// Angles are returned in degrees when `in_degrees` is true, in radians
/// otherwise. A perfectly orthogonal acquisition yields `(90, 90, 90)`.
pub fn angles_between_axes(affine: &Affine4, in_degrees: bool) -> (f32, f32, f32) {
    // f64 internally, to keep the arccos stable near orthogonality
    let m = affine.map(f64::from);
    let angle = |a: usize, b: usize| {
        let ca = m.column(a);
        let cb = m.column(b);
        let cosine = ca.dot(&cb) / (ca.norm() * cb.norm());
        let angle = cosine.clamp(-1.0, 1.0).acos();
        if in_degrees {
            angle.to_degrees() as f32
        } else {
            angle as f32
        }
    };
    (angle(0, 1), angle(0, 2), angle(1, 2))
}

/// Whether the affine's voxel axes are pairwise orthogonal, up to the given
/// maximum deviations (in degrees) from 90 for the xy, xz and yz pairs.
pub fn is_orthogonal_affine(affine: &Affine4, max_deviation_degrees: [f32; 3]) -> bool {
    let (xy, xz, yz) = angles_between_axes(affine, true);
    (90.0 - xy).abs() <= max_deviation_degrees[0]
        && (90.0 - xz).abs() <= max_deviation_degrees[1]
        && (90.0 - yz).abs() <= max_deviation_degrees[2]
}
