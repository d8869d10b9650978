//! Free-surface extrapolation for grid-based fluid simulation.
//!
//! Given a binary occupancy mask (1 = fluid, 0 = empty) this crate builds a
//! bounded signed distance field around the fluid surface and extrapolates a
//! centered or staggered field into the empty cells near it, so stencils
//! evaluated close to the surface sample meaningful values.
//!
//! # Example
//!
//! ```
//! use freesurface::{extrapolate, CenteredGrid, ExtrapolationParams, Field, GridShape};
//!
//! let shape = GridShape::single([5]);
//! let mask = CenteredGrid::from_vec(shape.clone(), 1, vec![1.0, 1.0, 0.0, 0.0, 0.0]).unwrap();
//! let field = Field::Centered(
//!     CenteredGrid::from_vec(shape, 1, vec![5.0, 7.0, 0.0, 0.0, 0.0]).unwrap(),
//! );
//!
//! let (field, distance) =
//!     extrapolate(&field, &mask, &[1.0], &ExtrapolationParams::new(3)).unwrap();
//!
//! assert_eq!(field.as_centered().unwrap().data(), &[5.0, 7.0, 7.0, 7.0, 7.0]);
//! assert_eq!(distance.data(), &[0.0, 0.0, 1.0, 2.0, 3.0]);
//! ```

pub mod constants;
pub mod distance;
pub mod error;
pub mod extrapolate;
pub mod geom;
pub mod grid;
pub mod params;
pub mod serde_utils;
pub mod stencil;
pub mod surface;

pub use distance::initial_distance;
pub use error::{ExtrapolationError, Result};
pub use extrapolate::{extrapolate, Extrapolation};
pub use geom::{
    binary_mask, insert_spheres, insert_spheres_staggered, occupancy_from_geometry, Cuboid, Geometry,
    Sphere,
};
pub use glam::Vec3;
pub use grid::{CenteredGrid, Field, GridShape, StaggeredGrid};
pub use params::{BoundaryPadding, ExtrapolationParams};
pub use stencil::{Direction, NeighborStencil};
pub use surface::surface_mask;
