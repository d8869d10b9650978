//! Shapes sharing the signed distance convention of the extrapolator, and
//! helpers that rasterize them into occupancy masks and fields.
//!
//! Sign convention: negative inside, positive outside, zero on the boundary.
//! Locations are `Vec3`; grids with fewer than three axes use the leading
//! components and leave the rest at zero, so 2-D rotations are about z.

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::{EMPTY, FILLED};
use crate::error::{ExtrapolationError, Result};
use crate::grid::{CenteredGrid, GridShape, StaggeredGrid};

/// Capabilities shared by all shapes.
pub trait Geometry: std::fmt::Debug + Send + Sync {
    /// Center point the shape is rotated about.
    fn center(&self) -> Vec3;

    /// Distance to the surface, negative inside.
    fn signed_distance(&self, location: Vec3) -> f32;

    /// Whether `location` is inside. Points on the surface count as inside.
    fn lies_inside(&self, location: Vec3) -> bool {
        self.signed_distance(location) <= 0.0
    }

    /// Radius of a sphere around `center` enclosing the shape.
    fn bounding_radius(&self) -> f32;

    /// Per-axis bound on how far the shape reaches from `center`.
    fn bounding_half_extent(&self) -> Vec3;

    fn shifted(&self, delta: Vec3) -> Self
    where
        Self: Sized;

    /// Rotate about `center` by a scaled-axis angle.
    fn rotated(&self, angle: Vec3) -> Self
    where
        Self: Sized;

    /// Approximate fraction of `other` inside this shape.
    ///
    /// `other` is treated as a sphere of its bounding radius: 1 when fully
    /// enclosed, 0 when disjoint.
    fn approximate_fraction_inside(&self, other: &dyn Geometry) -> f32 {
        let radius = other.bounding_radius();
        let distance = self.signed_distance(other.center());
        (0.5 - distance / radius).clamp(0.0, 1.0)
    }
}

// ========== Sphere ==========

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    #[serde(with = "crate::serde_utils::vec3")]
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Geometry for Sphere {
    fn center(&self) -> Vec3 {
        self.center
    }

    fn signed_distance(&self, location: Vec3) -> f32 {
        (location - self.center).length() - self.radius
    }

    fn bounding_radius(&self) -> f32 {
        self.radius
    }

    fn bounding_half_extent(&self) -> Vec3 {
        Vec3::splat(self.radius)
    }

    fn shifted(&self, delta: Vec3) -> Self {
        Self::new(self.center + delta, self.radius)
    }

    fn rotated(&self, _angle: Vec3) -> Self {
        *self
    }
}

// ========== Cuboid ==========

/// Oriented box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cuboid {
    #[serde(with = "crate::serde_utils::vec3")]
    pub center: Vec3,
    #[serde(with = "crate::serde_utils::vec3")]
    pub half_extent: Vec3,
    #[serde(with = "crate::serde_utils::quat")]
    pub rotation: Quat,
}

impl Cuboid {
    pub fn new(center: Vec3, half_extent: Vec3) -> Self {
        Self {
            center,
            half_extent,
            rotation: Quat::IDENTITY,
        }
    }

    /// Axis-aligned box spanning `lower..upper`.
    pub fn from_bounds(lower: Vec3, upper: Vec3) -> Self {
        Self::new((lower + upper) * 0.5, (upper - lower).abs() * 0.5)
    }
}

impl Geometry for Cuboid {
    fn center(&self) -> Vec3 {
        self.center
    }

    fn signed_distance(&self, location: Vec3) -> f32 {
        let local = self.rotation.inverse() * (location - self.center);
        let q = local.abs() - self.half_extent;
        let outside = q.max(Vec3::ZERO).length();
        let inside = q.max_element().min(0.0);
        outside + inside
    }

    fn bounding_radius(&self) -> f32 {
        self.half_extent.length()
    }

    fn bounding_half_extent(&self) -> Vec3 {
        let m = Mat3::from_quat(self.rotation);
        Vec3::new(
            m.row(0).abs().dot(self.half_extent),
            m.row(1).abs().dot(self.half_extent),
            m.row(2).abs().dot(self.half_extent),
        )
    }

    fn shifted(&self, delta: Vec3) -> Self {
        Self {
            center: self.center + delta,
            ..*self
        }
    }

    fn rotated(&self, angle: Vec3) -> Self {
        Self {
            rotation: (Quat::from_scaled_axis(angle) * self.rotation).normalize(),
            ..*self
        }
    }
}

// ========== Rasterization ==========

fn location(coords: &[usize], offset: f32, dx: &[f32]) -> Vec3 {
    let mut p = Vec3::ZERO;
    for (axis, (&c, &h)) in coords.iter().zip(dx).enumerate() {
        p[axis] = (c as f32 + offset) * h;
    }
    p
}

fn check_rank(rank: usize) -> Result<()> {
    if rank > 3 {
        return Err(ExtrapolationError::RankMismatch {
            expected: 3,
            found: rank,
        });
    }
    Ok(())
}

/// Occupancy mask with 1 at cells whose center lies inside any geometry.
pub fn occupancy_from_geometry(
    shape: &GridShape,
    dx: &[f32],
    geometries: &[&dyn Geometry],
) -> Result<CenteredGrid> {
    shape.validate()?;
    check_rank(shape.rank())?;
    if dx.len() != shape.rank() {
        return Err(ExtrapolationError::RankMismatch {
            expected: shape.rank(),
            found: dx.len(),
        });
    }
    Ok(CenteredGrid::from_fn(shape.clone(), 1, |_, coords, _| {
        let p = location(coords, 0.5, dx);
        if geometries.iter().any(|g| g.lies_inside(p)) {
            FILLED
        } else {
            EMPTY
        }
    }))
}

fn check_sphere_values(spheres: &[Sphere], values: Option<&[Vec<f32>]>, channels: usize) -> Result<()> {
    let Some(values) = values else {
        return Ok(());
    };
    if values.len() != spheres.len() {
        return Err(ExtrapolationError::shape_mismatch(
            format!("{} value vectors", spheres.len()),
            format!("{} value vectors", values.len()),
        ));
    }
    if let Some(bad) = values.iter().find(|v| v.len() != channels) {
        return Err(ExtrapolationError::shape_mismatch(
            format!("{} channels", channels),
            format!("{} channels", bad.len()),
        ));
    }
    Ok(())
}

/// Index of the first sphere containing the index-space point `coords`.
fn first_hit(spheres: &[Sphere], coords: &[usize]) -> Option<usize> {
    let p = location(coords, 0.0, &[1.0; 3]);
    spheres.iter().position(|s| s.lies_inside(p))
}

/// Write values into every cell whose index coordinates lie inside a sphere.
///
/// Spheres are given in index space. With `values` unset every channel
/// becomes 1; otherwise the cell takes the value vector of the first sphere
/// containing it.
pub fn insert_spheres(
    field: &mut CenteredGrid,
    spheres: &[Sphere],
    values: Option<&[Vec<f32>]>,
) -> Result<()> {
    let shape = field.shape().clone();
    let channels = field.channels();
    check_rank(shape.rank())?;
    if channels == 0 {
        return Err(ExtrapolationError::invalid_parameter(
            "field must have at least one channel",
        ));
    }
    check_sphere_values(spheres, values, channels)?;

    let cells = shape.cell_count();
    let mut coords = vec![0; shape.rank()];
    for (cell, sample) in field.data_mut().chunks_mut(channels).enumerate() {
        shape.cell_coords(cell % cells, &mut coords);
        let Some(hit) = first_hit(spheres, &coords) else {
            continue;
        };
        match values {
            Some(values) => sample.copy_from_slice(&values[hit]),
            None => sample.fill(FILLED),
        }
    }
    Ok(())
}

/// Staggered version of [`insert_spheres`].
///
/// Face samples are tested at their own index coordinates, so component `x`
/// reaches one face further along `x` than the cells do. A value vector holds
/// one entry per component.
pub fn insert_spheres_staggered(
    field: &mut StaggeredGrid,
    spheres: &[Sphere],
    values: Option<&[Vec<f32>]>,
) -> Result<()> {
    let rank = field.shape().rank();
    check_rank(rank)?;
    check_sphere_values(spheres, values, rank)?;

    let mut coords = vec![0; rank];
    for axis in 0..rank {
        let faces = field.face_shape(axis);
        let per_batch = faces.cell_count();
        for (idx, sample) in field.component_mut(axis).iter_mut().enumerate() {
            faces.cell_coords(idx % per_batch, &mut coords);
            let Some(hit) = first_hit(spheres, &coords) else {
                continue;
            };
            *sample = match values {
                Some(values) => values[hit][axis],
                None => FILLED,
            };
        }
    }
    Ok(())
}

/// Occupancy mask of cells where any channel exceeds `threshold`.
pub fn binary_mask(grid: &CenteredGrid, threshold: f32) -> CenteredGrid {
    let data = grid
        .data()
        .chunks(grid.channels().max(1))
        .map(|sample| {
            if sample.iter().any(|&v| v > threshold) {
                FILLED
            } else {
                EMPTY
            }
        })
        .collect();
    CenteredGrid::from_raw(grid.shape().clone(), 1, data)
}
