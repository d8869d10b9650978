//! Surface detection on occupancy masks.
//!
//! A surface cell is a filled cell with at least one non-filled cell among
//! its 3^rank - 1 neighbors. Diagonal neighbors count, so corner and notch
//! cells are flagged even when every face neighbor is filled.

use rayon::prelude::*;

use crate::constants::{EMPTY, FILLED};
use crate::error::{ExtrapolationError, Result};
use crate::grid::{CenteredGrid, GridShape};
use crate::params::BoundaryPadding;
use crate::stencil::NeighborStencil;

/// Check that `mask` is a single-channel binary grid and return it as flags.
pub fn occupancy_flags(mask: &CenteredGrid) -> Result<Vec<bool>> {
    mask.shape().validate()?;
    if mask.channels() != 1 {
        return Err(ExtrapolationError::invalid_parameter(format!(
            "occupancy mask must have one channel, got {}",
            mask.channels()
        )));
    }
    mask.data()
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            if value == FILLED {
                Ok(true)
            } else if value == EMPTY {
                Ok(false)
            } else {
                Err(ExtrapolationError::NonBinaryMask { index, value })
            }
        })
        .collect()
}

/// Binary surface mask of `mask`, same shape.
pub fn surface_mask(mask: &CenteredGrid, boundary: BoundaryPadding) -> Result<CenteredGrid> {
    let filled = occupancy_flags(mask)?;
    let unit = vec![1.0; mask.shape().rank()];
    let stencil = NeighborStencil::new(&unit)?;
    let surface = surface_cells(mask.shape(), &filled, &stencil, boundary);
    let data = surface
        .into_iter()
        .map(|s| if s { FILLED } else { EMPTY })
        .collect();
    CenteredGrid::from_vec(mask.shape().clone(), 1, data)
}

/// Flag filled cells that see a non-filled neighbor in any stencil direction.
pub(crate) fn surface_cells(
    shape: &GridShape,
    filled: &[bool],
    stencil: &NeighborStencil,
    boundary: BoundaryPadding,
) -> Vec<bool> {
    let cells = shape.cell_count();
    let rank = shape.rank();
    let strides = shape.strides();

    (0..filled.len())
        .into_par_iter()
        .map_init(
            || vec![0usize; rank],
            |coords, idx| {
                if !filled[idx] {
                    return false;
                }
                let base = idx - idx % cells;
                shape.cell_coords(idx % cells, coords);

                stencil.directions().iter().any(|d| {
                    let mut neighbor = base;
                    for axis in 0..rank {
                        let c = coords[axis] as i64 + d.offset[axis] as i64;
                        let n = shape.extents[axis] as i64;
                        let c = if (0..n).contains(&c) {
                            c
                        } else {
                            match boundary {
                                // Constant zero padding: outside is empty
                                BoundaryPadding::Empty => return true,
                                BoundaryPadding::Replicate => c.clamp(0, n - 1),
                            }
                        };
                        neighbor += c as usize * strides[axis];
                    }
                    !filled[neighbor]
                })
            },
        )
        .collect()
}
