//! Batched N-dimensional grids in centered and staggered (MAC) layouts.
//!
//! All arrays are flat `Vec<f32>` in row-major order with the batch axis
//! outermost, the last spatial axis fastest and channels innermost:
//! `[batch, *spatial, channels]`.
//!
//! A staggered grid stores one array per spatial axis. Component `x` has one
//! extra sample along axis `x`; sample `(i, j, k)` sits on the lower face of
//! cell `(i, j, k)` along that axis:
//! - u (axis 0) at x = i * dx
//! - v (axis 1) at y = j * dx
//! - w (axis 2) at z = k * dx

use serde::{Deserialize, Serialize};

use crate::error::{ExtrapolationError, Result};

/// Batch size and spatial extents of a cell grid.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct GridShape {
    /// Number of independent grids sharing one array
    pub batch: usize,
    /// Number of cells along each spatial axis
    pub extents: Vec<usize>,
}

impl GridShape {
    pub fn new(batch: usize, extents: impl Into<Vec<usize>>) -> Self {
        Self {
            batch,
            extents: extents.into(),
        }
    }

    /// Single-batch shape.
    pub fn single(extents: impl Into<Vec<usize>>) -> Self {
        Self::new(1, extents)
    }

    /// Number of spatial axes.
    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    /// Number of cells in one batch entry.
    pub fn cell_count(&self) -> usize {
        self.extents.iter().product()
    }

    /// Number of cells over all batch entries.
    pub fn len(&self) -> usize {
        self.batch * self.cell_count()
    }

    /// True when the batch or any extent is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major strides of the spatial axes, in cells.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1; self.rank()];
        for axis in (0..self.rank().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * self.extents[axis + 1];
        }
        strides
    }

    /// Flat index of a cell within one batch entry.
    #[inline]
    pub fn cell_index(&self, coords: &[usize]) -> usize {
        debug_assert_eq!(coords.len(), self.rank());
        coords
            .iter()
            .zip(&self.extents)
            .fold(0, |index, (&c, &n)| {
                debug_assert!(c < n, "coordinate {} out of range {}", c, n);
                index * n + c
            })
    }

    /// Inverse of [`cell_index`](Self::cell_index).
    #[inline]
    pub fn cell_coords(&self, mut index: usize, coords: &mut [usize]) {
        for (c, &n) in coords.iter_mut().zip(&self.extents).rev() {
            *c = index % n;
            index /= n;
        }
    }

    /// Extents of the staggered component along `axis`.
    pub fn staggered_extents(&self, axis: usize) -> Vec<usize> {
        let mut extents = self.extents.clone();
        extents[axis] += 1;
        extents
    }

    /// Shape grown by one cell along every spatial axis.
    pub fn padded(&self) -> GridShape {
        GridShape::new(self.batch, self.extents.iter().map(|n| n + 1).collect::<Vec<_>>())
    }

    /// Shape with the same batch and other extents.
    pub fn with_extents(&self, extents: Vec<usize>) -> GridShape {
        GridShape::new(self.batch, extents)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.rank() == 0 {
            return Err(ExtrapolationError::invalid_parameter(
                "grid needs at least one spatial axis",
            ));
        }
        if self.is_empty() {
            return Err(ExtrapolationError::invalid_parameter(format!(
                "grid extents must be non-zero, got batch {} extents {:?}",
                self.batch, self.extents
            )));
        }
        Ok(())
    }
}

// ========== Centered grid ==========

/// Cell-centered samples with a trailing channel axis.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "CenteredGridData")]
pub struct CenteredGrid {
    shape: GridShape,
    channels: usize,
    data: Vec<f32>,
}

impl CenteredGrid {
    /// Grid with every value set to `value`.
    pub fn filled(shape: GridShape, channels: usize, value: f32) -> Self {
        let len = shape.len() * channels;
        Self {
            shape,
            channels,
            data: vec![value; len],
        }
    }

    pub fn zeros(shape: GridShape, channels: usize) -> Self {
        Self::filled(shape, channels, 0.0)
    }

    /// Wrap existing data, checking its length.
    pub fn from_vec(shape: GridShape, channels: usize, data: Vec<f32>) -> Result<Self> {
        let expected = shape.len() * channels;
        if data.len() != expected {
            return Err(ExtrapolationError::shape_mismatch(
                format!("{} values for {:?} x {} channels", expected, shape, channels),
                format!("{} values", data.len()),
            ));
        }
        Ok(Self {
            shape,
            channels,
            data,
        })
    }

    pub(crate) fn from_raw(shape: GridShape, channels: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), shape.len() * channels);
        Self {
            shape,
            channels,
            data,
        }
    }

    /// Build a grid from `f(batch, coords, channel)`.
    pub fn from_fn(
        shape: GridShape,
        channels: usize,
        mut f: impl FnMut(usize, &[usize], usize) -> f32,
    ) -> Self {
        let cells = shape.cell_count();
        let mut coords = vec![0; shape.rank()];
        let mut data = Vec::with_capacity(shape.len() * channels);
        for b in 0..shape.batch {
            for cell in 0..cells {
                shape.cell_coords(cell, &mut coords);
                for c in 0..channels {
                    data.push(f(b, &coords, c));
                }
            }
        }
        Self {
            shape,
            channels,
            data,
        }
    }

    pub fn shape(&self) -> &GridShape {
        &self.shape
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Offset of the first channel of a cell.
    #[inline]
    pub fn offset(&self, batch: usize, coords: &[usize]) -> usize {
        (batch * self.shape.cell_count() + self.shape.cell_index(coords)) * self.channels
    }

    pub fn get(&self, batch: usize, coords: &[usize], channel: usize) -> f32 {
        self.data[self.offset(batch, coords) + channel]
    }

    pub fn set(&mut self, batch: usize, coords: &[usize], channel: usize, value: f32) {
        let idx = self.offset(batch, coords) + channel;
        self.data[idx] = value;
    }

    /// All channels of one cell.
    pub fn sample(&self, batch: usize, coords: &[usize]) -> &[f32] {
        let start = self.offset(batch, coords);
        &self.data[start..start + self.channels]
    }
}

// ========== Staggered grid ==========

/// Face-centered vector field, one array per spatial axis.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "StaggeredGridData")]
pub struct StaggeredGrid {
    /// Cell extents (not face extents)
    shape: GridShape,
    components: Vec<Vec<f32>>,
}

impl StaggeredGrid {
    pub fn zeros(shape: GridShape) -> Self {
        let components = (0..shape.rank())
            .map(|axis| vec![0.0; shape.batch * shape.staggered_extents(axis).iter().product::<usize>()])
            .collect();
        Self { shape, components }
    }

    /// Wrap one array per axis, checking each length.
    pub fn from_components(shape: GridShape, components: Vec<Vec<f32>>) -> Result<Self> {
        if components.len() != shape.rank() {
            return Err(ExtrapolationError::RankMismatch {
                expected: shape.rank(),
                found: components.len(),
            });
        }
        for (axis, component) in components.iter().enumerate() {
            let expected =
                shape.batch * shape.staggered_extents(axis).iter().product::<usize>();
            if component.len() != expected {
                return Err(ExtrapolationError::shape_mismatch(
                    format!("{} values for component {}", expected, axis),
                    format!("{} values", component.len()),
                ));
            }
        }
        Ok(Self { shape, components })
    }

    /// Build a grid from `f(axis, batch, face_coords)`.
    pub fn from_fn(shape: GridShape, mut f: impl FnMut(usize, usize, &[usize]) -> f32) -> Self {
        let mut grid = Self::zeros(shape);
        let mut coords = vec![0; grid.shape.rank()];
        for axis in 0..grid.shape.rank() {
            let faces = grid.face_shape(axis);
            let per_batch = faces.cell_count();
            for (idx, value) in grid.components[axis].iter_mut().enumerate() {
                faces.cell_coords(idx % per_batch, &mut coords);
                *value = f(axis, idx / per_batch, &coords);
            }
        }
        grid
    }

    /// Cell shape of the grid.
    pub fn shape(&self) -> &GridShape {
        &self.shape
    }

    /// Shape of the face array along `axis`.
    pub fn face_shape(&self, axis: usize) -> GridShape {
        self.shape.with_extents(self.shape.staggered_extents(axis))
    }

    pub fn component(&self, axis: usize) -> &[f32] {
        &self.components[axis]
    }

    pub fn component_mut(&mut self, axis: usize) -> &mut [f32] {
        &mut self.components[axis]
    }

    /// Flat index of a face sample within its component array.
    #[inline]
    pub fn face_index(&self, axis: usize, batch: usize, coords: &[usize]) -> usize {
        let faces = self.face_shape(axis);
        batch * faces.cell_count() + faces.cell_index(coords)
    }

    pub fn get(&self, axis: usize, batch: usize, coords: &[usize]) -> f32 {
        self.components[axis][self.face_index(axis, batch, coords)]
    }

    pub fn set(&mut self, axis: usize, batch: usize, coords: &[usize], value: f32) {
        let idx = self.face_index(axis, batch, coords);
        self.components[axis][idx] = value;
    }
}

// ========== Deserialization ==========

/// Unchecked wire form of [`CenteredGrid`].
#[derive(Deserialize)]
struct CenteredGridData {
    shape: GridShape,
    channels: usize,
    data: Vec<f32>,
}

impl TryFrom<CenteredGridData> for CenteredGrid {
    type Error = ExtrapolationError;

    fn try_from(raw: CenteredGridData) -> Result<Self> {
        Self::from_vec(raw.shape, raw.channels, raw.data)
    }
}

/// Unchecked wire form of [`StaggeredGrid`].
#[derive(Deserialize)]
struct StaggeredGridData {
    shape: GridShape,
    components: Vec<Vec<f32>>,
}

impl TryFrom<StaggeredGridData> for StaggeredGrid {
    type Error = ExtrapolationError;

    fn try_from(raw: StaggeredGridData) -> Result<Self> {
        Self::from_components(raw.shape, raw.components)
    }
}

// ========== Field ==========

/// A field to extrapolate, tagged by sample layout.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum Field {
    /// Samples at cell centers, aligned with the occupancy mask
    Centered(CenteredGrid),
    /// Face samples offset half a cell along their own axis
    Staggered(StaggeredGrid),
}

impl Field {
    /// Cell shape the field is aligned with.
    pub fn shape(&self) -> &GridShape {
        match self {
            Field::Centered(grid) => grid.shape(),
            Field::Staggered(grid) => grid.shape(),
        }
    }

    pub fn is_staggered(&self) -> bool {
        matches!(self, Field::Staggered(_))
    }

    pub fn as_centered(&self) -> Option<&CenteredGrid> {
        match self {
            Field::Centered(grid) => Some(grid),
            Field::Staggered(_) => None,
        }
    }

    pub fn as_staggered(&self) -> Option<&StaggeredGrid> {
        match self {
            Field::Staggered(grid) => Some(grid),
            Field::Centered(_) => None,
        }
    }
}

impl From<CenteredGrid> for Field {
    fn from(grid: CenteredGrid) -> Self {
        Field::Centered(grid)
    }
}

impl From<StaggeredGrid> for Field {
    fn from(grid: StaggeredGrid) -> Self {
        Field::Staggered(grid)
    }
}
