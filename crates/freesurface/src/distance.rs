//! Signed distance initialization and saturation.
//!
//! Sign convention: negative inside filled cells, positive in empty cells,
//! zero at surface cells. Surface cells sit at distance 0 on the filled side
//! of the interface (the cell is treated as half full).

use crate::error::{ExtrapolationError, Result};
use crate::grid::CenteredGrid;
use crate::surface::occupancy_flags;

/// -1 for filled cells, +1 for empty cells.
#[inline]
pub(crate) fn sign(filled: bool) -> f32 {
    if filled {
        -1.0
    } else {
        1.0
    }
}

/// Starting magnitude for non-surface cells.
///
/// Larger than anything relaxation can reach in `voxel_distance` sweeps, so
/// values from beyond the propagation radius never win a comparison.
#[inline]
pub(crate) fn initial_magnitude(voxel_distance: usize) -> f32 {
    2.0 * (voxel_distance as f32 + 1.0)
}

pub(crate) fn init_distance(filled: &[bool], surface: &[bool], voxel_distance: usize) -> Vec<f32> {
    let magnitude = initial_magnitude(voxel_distance);
    filled
        .iter()
        .zip(surface)
        .map(|(&f, &s)| if s { 0.0 } else { magnitude * sign(f) })
        .collect()
}

/// Replace every value with `|d| >= voxel_distance` by the signed limit.
///
/// Returns the number of saturated cells.
pub(crate) fn saturate(distance: &mut [f32], filled: &[bool], voxel_distance: usize) -> usize {
    let limit = voxel_distance as f32;
    let mut saturated = 0;
    for (d, &f) in distance.iter_mut().zip(filled) {
        if d.abs() >= limit {
            *d = limit * sign(f);
            saturated += 1;
        }
    }
    saturated
}

/// Initial signed distance field for `mask` given its surface mask.
pub fn initial_distance(
    mask: &CenteredGrid,
    surface: &CenteredGrid,
    voxel_distance: i32,
) -> Result<CenteredGrid> {
    let filled = occupancy_flags(mask)?;
    if surface.shape() != mask.shape() {
        return Err(ExtrapolationError::shape_mismatch(
            format!("surface shape {:?}", mask.shape()),
            format!("{:?}", surface.shape()),
        ));
    }
    let surface = occupancy_flags(surface)?;
    let voxel_distance = usize::try_from(voxel_distance).map_err(|_| {
        ExtrapolationError::invalid_parameter(format!(
            "voxel_distance must be non-negative, got {}",
            voxel_distance
        ))
    })?;
    CenteredGrid::from_vec(
        mask.shape().clone(),
        1,
        init_distance(&filled, &surface, voxel_distance),
    )
}
