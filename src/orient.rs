//! Anatomical reorientation of volumes.
//!
//! A volume's voxel axes each run along some anatomical direction, encoded by
//! the letters R/L (right/left), A/P (anterior/posterior) and S/I
//! (superior/inferior); the letter names the direction in which the voxel
//! index *increases*. Reorientation remaps the array axes (by transposition
//! and axis reversal) and updates the affine so that the volume follows a
//! requested 3-letter code such as `"LPS"` or `"RAS"`, without touching
//! physical space. No interpolation is involved, the operation is lossless.

use nalgebra::Matrix4;
use ndarray::Axis;

use crate::affine::{get_affine_and_translation, Affine4};
use crate::error::{GeomError, Result};
use crate::volume::Volume;

/// One entry per spatial array axis: the world axis it runs along
/// (0 = R/L, 1 = A/P, 2 = S/I) and the direction (+1 or -1).
type Orientation = [(usize, f32); 3];

fn axcodes_to_orientation(code: &str) -> Result<Orientation> {
    let invalid = || GeomError::InvalidOrientationCode(code.to_owned());
    let chars: Vec<char> = code.chars().collect();
    if chars.len() != 3 {
        return Err(invalid());
    }
    let mut orientation = [(0, 0.0); 3];
    let mut used = [false; 3];
    for (i, c) in chars.into_iter().enumerate() {
        let (axis, direction) = match c.to_ascii_uppercase() {
            'R' => (0, 1.0),
            'L' => (0, -1.0),
            'A' => (1, 1.0),
            'P' => (1, -1.0),
            'S' => (2, 1.0),
            'I' => (2, -1.0),
            _ => return Err(invalid()),
        };
        if used[axis] {
            return Err(invalid());
        }
        used[axis] = true;
        orientation[i] = (axis, direction);
    }
    Ok(orientation)
}

/// Closest world axis and direction for each voxel axis of the affine,
/// by greedily assigning the dominant component of each normalized column.
fn io_orientation(affine: &Affine4) -> Result<Orientation> {
    let (rzs, _) = get_affine_and_translation(affine);
    let mut r = rzs.map(f64::from);
    for j in 0..3 {
        let norm = r.column(j).norm();
        if norm == 0.0 {
            return Err(GeomError::SingularAffine);
        }
        for i in 0..3 {
            r[(i, j)] /= norm;
        }
    }
    let mut orientation = [(0, 0.0); 3];
    let mut world_used = [false; 3];
    let mut voxel_used = [false; 3];
    for _ in 0..3 {
        let mut best = (0, 0, -1.0);
        for i in 0..3 {
            for j in 0..3 {
                if world_used[i] || voxel_used[j] {
                    continue;
                }
                if r[(i, j)].abs() > best.2 {
                    best = (i, j, r[(i, j)].abs());
                }
            }
        }
        let (i, j, magnitude) = best;
        if magnitude <= 1e-12 {
            return Err(GeomError::SingularAffine);
        }
        world_used[i] = true;
        voxel_used[j] = true;
        orientation[j] = (i, if r[(i, j)] >= 0.0 { 1.0 } else { -1.0 });
    }
    Ok(orientation)
}

/// The anatomical axis-direction codes implied by an affine, e.g.
/// `['L', 'P', 'S']`.
pub fn axis_codes(affine: &Affine4) -> Result<[char; 3]> {
    let orientation = io_orientation(affine)?;
    let mut codes = ['R'; 3];
    for (j, &(axis, direction)) in orientation.iter().enumerate() {
        codes[j] = match (axis, direction > 0.0) {
            (0, true) => 'R',
            (0, false) => 'L',
            (1, true) => 'A',
            (1, false) => 'P',
            (2, true) => 'S',
            _ => 'I',
        };
    }
    Ok(codes)
}

/// Axis permutation and flips taking `start` to `end`: entry `i` holds the
/// destination position of input axis `i` and whether it must be reversed.
fn orientation_transform(start: &Orientation, end: &Orientation) -> Orientation {
    let mut transform = [(0, 0.0); 3];
    for (end_in, &(end_axis, end_dir)) in end.iter().enumerate() {
        for (start_in, &(start_axis, start_dir)) in start.iter().enumerate() {
            if end_axis == start_axis {
                transform[start_in] = (end_in, start_dir * end_dir);
            }
        }
    }
    transform
}

/// Affine mapping indices of the reoriented array back to indices of the
/// original array, so that `affine * inv_orientation_affine` maps reoriented
/// indices to the same physical coordinates as before.
fn inv_orientation_affine(transform: &Orientation, shape: &[usize]) -> Affine4 {
    let mut undo_reorder = Matrix4::zeros();
    undo_reorder[(3, 3)] = 1.0;
    for (in_axis, &(out_axis, _)) in transform.iter().enumerate() {
        undo_reorder[(in_axis, out_axis)] = 1.0;
    }
    let mut undo_flip = Matrix4::identity();
    for (in_axis, &(_, flip)) in transform.iter().enumerate() {
        undo_flip[(in_axis, in_axis)] = flip;
        let center = -(shape[in_axis] as f32 - 1.0) / 2.0;
        undo_flip[(in_axis, 3)] = flip * center - center;
    }
    undo_flip * undo_reorder
}

/// Reorient a volume to the given target orientation code (e.g. `"LPS"`).
///
/// The first three array axes are flipped and permuted as needed, the affine
/// is updated to keep the voxel-to-world mapping identical, and the spatial
/// zooms follow their axes. Trailing (non-spatial) axes are untouched.
///
/// # Errors
///
/// - `GeomError::InvalidOrientationCode` on an unknown or repeated axis code.
/// - `GeomError::NonSpatial` if the volume has fewer than 3 axes.
/// - `GeomError::SingularAffine` if the spatial block is degenerate.
pub fn reorient(volume: &Volume, target: &str) -> Result<Volume> {
    if volume.ndim() < 3 {
        return Err(GeomError::NonSpatial(volume.ndim()));
    }
    let target_orientation = axcodes_to_orientation(target)?;
    let current = io_orientation(volume.affine())?;
    let transform = orientation_transform(&current, &target_orientation);

    let mut data = volume.data().to_owned();
    for (in_axis, &(_, flip)) in transform.iter().enumerate() {
        if flip < 0.0 {
            data.invert_axis(Axis(in_axis));
        }
    }
    let mut permutation: Vec<usize> = (0..data.ndim()).collect();
    for (in_axis, &(out_axis, _)) in transform.iter().enumerate() {
        permutation[out_axis] = in_axis;
    }
    let data = data
        .permuted_axes(permutation.as_slice())
        .as_standard_layout()
        .to_owned();

    let affine = volume.affine() * inv_orientation_affine(&transform, volume.shape());
    let mut zooms = volume.zooms().to_vec();
    for (in_axis, &(out_axis, _)) in transform.iter().enumerate() {
        zooms[out_axis] = volume.zooms()[in_axis];
    }
    Volume::with_zooms(data, affine, zooms)
}
