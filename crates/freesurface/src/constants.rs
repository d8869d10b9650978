//! Default values for extrapolation parameters.

/// Default propagation radius and distance saturation, in cells.
pub const DEFAULT_VOXEL_DISTANCE: i32 = 10;

/// Occupancy value of a filled (fluid) cell.
pub const FILLED: f32 = 1.0;

/// Occupancy value of an empty cell.
pub const EMPTY: f32 = 0.0;
