//! Extrapolation parameters.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_VOXEL_DISTANCE;
use crate::error::{ExtrapolationError, Result};

/// How the surface mask builder treats cells beyond the domain edge.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPadding {
    /// Outside is empty: fluid touching the domain edge is free surface.
    #[default]
    Empty,
    /// Outside replicates the edge cell: domain walls never create surface.
    Replicate,
}

/// Parameters controlling one extrapolation call.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrapolationParams {
    /// Number of relaxation sweeps and saturation magnitude of the distance field.
    pub voxel_distance: i32,
    /// Padding used when detecting surface cells at the domain edge.
    pub boundary: BoundaryPadding,
}

impl Default for ExtrapolationParams {
    fn default() -> Self {
        Self {
            voxel_distance: DEFAULT_VOXEL_DISTANCE,
            boundary: BoundaryPadding::Empty,
        }
    }
}

impl ExtrapolationParams {
    pub fn new(voxel_distance: i32) -> Self {
        Self {
            voxel_distance,
            ..Self::default()
        }
    }

    pub fn with_boundary(mut self, boundary: BoundaryPadding) -> Self {
        self.boundary = boundary;
        self
    }

    /// Check the parameters and return the sweep count.
    pub fn sweeps(&self) -> Result<usize> {
        usize::try_from(self.voxel_distance).map_err(|_| {
            ExtrapolationError::invalid_parameter(format!(
                "voxel_distance must be non-negative, got {}",
                self.voxel_distance
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ExtrapolationParams::default();
        assert_eq!(params.voxel_distance, 10);
        assert_eq!(params.boundary, BoundaryPadding::Empty);
        assert_eq!(params.sweeps(), Ok(10));
    }

    #[test]
    fn test_negative_voxel_distance_rejected() {
        let params = ExtrapolationParams::new(-1);
        assert!(matches!(
            params.sweeps(),
            Err(ExtrapolationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_zero_voxel_distance_is_valid() {
        assert_eq!(ExtrapolationParams::new(0).sweeps(), Ok(0));
    }
}
