//! Signed distance construction and field extrapolation into empty cells.
//!
//! Pipeline: surface mask -> initial distance -> (boundary seeding for
//! staggered fields) -> `voxel_distance` relaxation sweeps -> clamp and crop.
//!
//! Every stage is a Jacobi step: candidates are read from a snapshot taken
//! before the stage and written to a second buffer, so the result does not
//! depend on the order cells are visited in. Within one cell, directions are
//! visited in stencil order and a candidate must be strictly closer than the
//! best one so far.
//!
//! Staggered fields are relaxed on a common lattice one cell larger along
//! every axis, with one channel per component and the occupancy mask padded
//! with an empty trailing layer. The extra layer is cropped in `finish`.

use rayon::prelude::*;

use crate::distance::{init_distance, saturate, sign};
use crate::error::{ExtrapolationError, Result};
use crate::grid::{CenteredGrid, Field, GridShape, StaggeredGrid};
use crate::params::ExtrapolationParams;
use crate::stencil::NeighborStencil;
use crate::surface::{occupancy_flags, surface_cells};

/// Layout the working buffers were built from.
#[derive(Clone, Debug)]
enum Layout {
    Centered { channels: usize },
    Staggered,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Stage {
    /// Positive axis directions only, own component kept
    Seed,
    /// All directions, all channels
    Sweep,
}

/// In-progress extrapolation of one field.
///
/// Owns every intermediate buffer. The snapshot buffers are allocated once
/// and reused by each sweep.
pub struct Extrapolation {
    layout: Layout,
    /// Caller-visible cell shape
    shape: GridShape,
    /// Shape the relaxation runs on
    lattice: GridShape,
    channels: usize,
    stencil: NeighborStencil,
    filled: Vec<bool>,
    surface: Vec<bool>,
    distance: Vec<f32>,
    values: Vec<f32>,
    distance_prev: Vec<f32>,
    values_prev: Vec<f32>,
    voxel_distance: usize,
    sweeps_done: usize,
}

impl Extrapolation {
    /// Validate inputs, build the surface mask and initial distance, and
    /// seed staggered interface samples.
    pub fn begin(
        field: &Field,
        mask: &CenteredGrid,
        dx: &[f32],
        params: &ExtrapolationParams,
    ) -> Result<Self> {
        let voxel_distance = params.sweeps()?;
        let filled = occupancy_flags(mask)?;
        let shape = field.shape().clone();
        shape.validate()?;
        if mask.shape() != &shape {
            return Err(ExtrapolationError::shape_mismatch(
                format!("mask shape {:?}", shape),
                format!("{:?}", mask.shape()),
            ));
        }
        if dx.len() != shape.rank() {
            return Err(ExtrapolationError::RankMismatch {
                expected: shape.rank(),
                found: dx.len(),
            });
        }
        let stencil = NeighborStencil::new(dx)?;

        let (layout, lattice, channels, values, filled) = match field {
            Field::Centered(grid) => {
                if grid.channels() == 0 {
                    return Err(ExtrapolationError::invalid_parameter(
                        "field must have at least one channel",
                    ));
                }
                (
                    Layout::Centered {
                        channels: grid.channels(),
                    },
                    shape.clone(),
                    grid.channels(),
                    grid.data().to_vec(),
                    filled,
                )
            }
            Field::Staggered(grid) => {
                let lattice = shape.padded();
                let values = stagger_to_lattice(grid, &lattice);
                let filled = pad_mask(&shape, &lattice, &filled);
                (Layout::Staggered, lattice, shape.rank(), values, filled)
            }
        };

        let surface = surface_cells(&lattice, &filled, &stencil, params.boundary);
        let distance = init_distance(&filled, &surface, voxel_distance);

        log::debug!(
            "extrapolate: rank {} extents {:?} batch {} channels {} voxel_distance {} staggered {}",
            shape.rank(),
            shape.extents,
            shape.batch,
            channels,
            voxel_distance,
            field.is_staggered()
        );

        let mut extrapolation = Self {
            layout,
            shape,
            lattice,
            channels,
            stencil,
            filled,
            distance_prev: distance.clone(),
            values_prev: values.clone(),
            surface,
            distance,
            values,
            voxel_distance,
            sweeps_done: 0,
        };

        if matches!(extrapolation.layout, Layout::Staggered) {
            let seeded = extrapolation.relax(Stage::Seed);
            log::trace!("extrapolate: seeded {} interface cells", seeded);
        }

        Ok(extrapolation)
    }

    /// Run one relaxation sweep. Returns the number of cells whose distance changed.
    pub fn sweep(&mut self) -> usize {
        let updated = self.relax(Stage::Sweep);
        self.sweeps_done += 1;
        log::trace!("extrapolate: sweep {} updated {} cells", self.sweeps_done, updated);
        updated
    }

    /// Run the sweeps remaining up to `voxel_distance`.
    pub fn run(&mut self) {
        while self.sweeps_done < self.voxel_distance {
            self.sweep();
        }
    }

    pub fn sweeps_done(&self) -> usize {
        self.sweeps_done
    }

    pub fn voxel_distance(&self) -> usize {
        self.voxel_distance
    }

    /// Current distance on the working lattice (one cell larger per axis for
    /// staggered fields).
    pub fn distance(&self) -> &[f32] {
        &self.distance
    }

    /// Current field values on the working lattice, channels innermost.
    pub fn field_values(&self) -> &[f32] {
        &self.values
    }

    /// Shape of the working lattice.
    pub fn lattice(&self) -> &GridShape {
        &self.lattice
    }

    /// Surface flags on the working lattice.
    pub fn surface(&self) -> &[bool] {
        &self.surface
    }

    /// Saturate the distance field and restore the caller's layout.
    ///
    /// Does not run outstanding sweeps; call [`run`](Self::run) first.
    pub fn finish(mut self) -> (Field, CenteredGrid) {
        let saturated = saturate(&mut self.distance, &self.filled, self.voxel_distance);
        log::debug!(
            "extrapolate: finished after {} sweeps, {} cells saturated",
            self.sweeps_done,
            saturated
        );

        match self.layout {
            Layout::Centered { channels } => {
                let field = CenteredGrid::from_raw(self.shape.clone(), channels, self.values);
                let distance = CenteredGrid::from_raw(self.shape, 1, self.distance);
                (Field::Centered(field), distance)
            }
            Layout::Staggered => {
                let field = lattice_to_stagger(&self.values, &self.lattice, &self.shape);
                let distance = crop(&self.distance, &self.lattice, &self.shape);
                (
                    Field::Staggered(field),
                    CenteredGrid::from_raw(self.shape, 1, distance),
                )
            }
        }
    }

    /// One Jacobi step over every cell of every batch entry.
    fn relax(&mut self, stage: Stage) -> usize {
        let Self {
            lattice,
            channels,
            stencil,
            filled,
            surface,
            distance,
            values,
            distance_prev,
            values_prev,
            ..
        } = self;

        distance_prev.copy_from_slice(distance);
        values_prev.copy_from_slice(values);

        let channels = *channels;
        let cells = lattice.cell_count();
        let rank = stencil.rank();
        debug_assert_eq!(rank, lattice.rank());
        let strides = lattice.strides();
        let (lattice, stencil, filled, surface) = (&*lattice, &*stencil, &*filled, &*surface);
        let (distance_prev, values_prev) = (&*distance_prev, &*values_prev);

        distance
            .par_iter_mut()
            .zip(values.par_chunks_mut(channels))
            .enumerate()
            .map_init(
                || vec![0usize; rank],
                |coords, (idx, (dist, vals))| {
                    if surface[idx] {
                        return 0usize;
                    }
                    let sign = sign(filled[idx]);
                    let base = idx - idx % cells;
                    lattice.cell_coords(idx % cells, coords);

                    let mut best = distance_prev[idx];
                    let mut accepted = false;
                    for d in stencil.directions() {
                        if stage == Stage::Seed && d.positive_axis.is_none() {
                            continue;
                        }

                        // Edge-replicating shift: the sample arriving from `coords - offset`
                        let mut neighbor = base;
                        for axis in 0..rank {
                            let c = coords[axis] as i64 - d.offset[axis] as i64;
                            let c = c.clamp(0, lattice.extents[axis] as i64 - 1);
                            neighbor += c as usize * strides[axis];
                        }

                        let candidate = distance_prev[neighbor] + d.step * sign;
                        if candidate.abs() >= best.abs() {
                            continue;
                        }
                        best = candidate;
                        accepted = true;

                        // Filled cells are authoritative
                        if sign > 0.0 {
                            let source = &values_prev[neighbor * channels..(neighbor + 1) * channels];
                            for (c, (dst, &src)) in vals.iter_mut().zip(source).enumerate() {
                                // The face sample on the interface along `axis` already holds a valid value
                                if stage == Stage::Seed && d.positive_axis == Some(c) {
                                    continue;
                                }
                                *dst = src;
                            }
                        }
                    }

                    if accepted {
                        *dist = best;
                        1
                    } else {
                        0
                    }
                },
            )
            .sum()
    }
}

// ========== Layout conversion ==========

/// Embed each staggered component into the common lattice, zero elsewhere.
fn stagger_to_lattice(grid: &StaggeredGrid, lattice: &GridShape) -> Vec<f32> {
    let rank = lattice.rank();
    let mut values = vec![0.0; lattice.len() * rank];
    let mut coords = vec![0; rank];
    for axis in 0..rank {
        let faces = grid.face_shape(axis);
        let per_batch = faces.cell_count();
        for (idx, &value) in grid.component(axis).iter().enumerate() {
            let b = idx / per_batch;
            faces.cell_coords(idx % per_batch, &mut coords);
            let cell = b * lattice.cell_count() + lattice.cell_index(&coords);
            values[cell * rank + axis] = value;
        }
    }
    values
}

fn lattice_to_stagger(values: &[f32], lattice: &GridShape, shape: &GridShape) -> StaggeredGrid {
    let rank = lattice.rank();
    StaggeredGrid::from_fn(shape.clone(), |axis, b, coords| {
        let cell = b * lattice.cell_count() + lattice.cell_index(coords);
        values[cell * rank + axis]
    })
}

/// Mask on the padded lattice: the trailing layer is empty.
fn pad_mask(shape: &GridShape, lattice: &GridShape, filled: &[bool]) -> Vec<bool> {
    let mut padded = vec![false; lattice.len()];
    let mut coords = vec![0; shape.rank()];
    let cells = shape.cell_count();
    for (idx, &f) in filled.iter().enumerate() {
        shape.cell_coords(idx % cells, &mut coords);
        padded[(idx / cells) * lattice.cell_count() + lattice.cell_index(&coords)] = f;
    }
    padded
}

/// Drop the trailing layer of a single-channel lattice array.
fn crop(data: &[f32], lattice: &GridShape, shape: &GridShape) -> Vec<f32> {
    let mut coords = vec![0; shape.rank()];
    let cells = shape.cell_count();
    (0..shape.len())
        .map(|idx| {
            shape.cell_coords(idx % cells, &mut coords);
            data[(idx / cells) * lattice.cell_count() + lattice.cell_index(&coords)]
        })
        .collect()
}

/// Extrapolate `field` into the empty cells of `mask`.
///
/// Returns the extrapolated field in the caller's layout and the signed
/// distance field aligned with `mask`, saturated at `±voxel_distance`.
pub fn extrapolate(
    field: &Field,
    mask: &CenteredGrid,
    dx: &[f32],
    params: &ExtrapolationParams,
) -> Result<(Field, CenteredGrid)> {
    let mut extrapolation = Extrapolation::begin(field, mask, dx, params)?;
    extrapolation.run();
    Ok(extrapolation.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(values: &[f32]) -> CenteredGrid {
        CenteredGrid::from_vec(GridShape::single([values.len()]), 1, values.to_vec()).unwrap()
    }

    #[test]
    fn test_single_sweep_reaches_one_layer() {
        let mask = line(&[1.0, 1.0, 0.0, 0.0, 0.0]);
        let field = Field::Centered(line(&[5.0, 7.0, 0.0, 0.0, 0.0]));
        let mut ext = Extrapolation::begin(&field, &mask, &[1.0], &ExtrapolationParams::new(3)).unwrap();

        assert_eq!(ext.sweep(), 1);
        assert_eq!(ext.distance(), &[0.0, 0.0, 1.0, 8.0, 8.0]);
        assert_eq!(ext.field_values(), &[5.0, 7.0, 7.0, 0.0, 0.0]);
    }

    #[test]
    fn test_sweep_reads_snapshot_only() {
        // In-place updates would let index 3 see index 2's new distance in the same sweep
        let mask = line(&[1.0, 0.0, 0.0, 0.0]);
        let field = Field::Centered(line(&[2.0, 0.0, 0.0, 0.0]));
        let mut ext = Extrapolation::begin(&field, &mask, &[1.0], &ExtrapolationParams::new(4)).unwrap();
        ext.sweep();
        assert_eq!(ext.distance()[2], 10.0);
        assert_eq!(ext.field_values()[2], 0.0);
    }

    #[test]
    fn test_stagger_lattice_conversion_preserves_values() {
        let shape = GridShape::new(2, [2, 3]);
        let grid = StaggeredGrid::from_fn(shape.clone(), |axis, b, c| {
            (b * 1000 + axis * 100 + c[0] * 10 + c[1]) as f32
        });
        let lattice = shape.padded();
        let values = stagger_to_lattice(&grid, &lattice);
        assert_eq!(lattice_to_stagger(&values, &lattice, &shape), grid);
    }

    #[test]
    fn test_pad_mask_and_crop() {
        let shape = GridShape::single([2, 2]);
        let lattice = shape.padded();
        let padded = pad_mask(&shape, &lattice, &[true, false, true, true]);
        assert_eq!(
            padded,
            vec![true, false, false, true, true, false, false, false, false]
        );

        let data: Vec<f32> = (0..9).map(|v| v as f32).collect();
        assert_eq!(crop(&data, &lattice, &shape), vec![0.0, 1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_mismatched_mask_rejected() {
        let mask = line(&[1.0, 0.0]);
        let field = Field::Centered(line(&[1.0, 0.0, 0.0]));
        let err = extrapolate(&field, &mask, &[1.0], &ExtrapolationParams::default());
        assert!(matches!(err, Err(ExtrapolationError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_wrong_spacing_rank_rejected() {
        let mask = line(&[1.0, 0.0]);
        let field = Field::Centered(line(&[1.0, 0.0]));
        let err = extrapolate(&field, &mask, &[1.0, 1.0], &ExtrapolationParams::default());
        assert_eq!(
            err.unwrap_err(),
            ExtrapolationError::RankMismatch { expected: 1, found: 2 }
        );
    }
}
