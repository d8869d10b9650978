//! Neighbor direction set {-1, 0, 1}^rank without the zero vector.

use crate::error::{ExtrapolationError, Result};

/// One neighbor direction with its physical step length.
#[derive(Clone, Debug, PartialEq)]
pub struct Direction {
    /// Per-axis offset in {-1, 0, 1}
    pub offset: Vec<i32>,
    /// Length of `dx * offset`
    pub step: f32,
    /// Axis index if the direction is a pure positive unit axis (e.g. (0, 1, 0))
    pub positive_axis: Option<usize>,
}

/// Ordered neighbor directions for one rank and cell spacing.
///
/// Directions are enumerated lexicographically with -1 < 0 < 1, first axis
/// slowest. This order decides ties during relaxation.
#[derive(Clone, Debug)]
pub struct NeighborStencil {
    rank: usize,
    directions: Vec<Direction>,
}

impl NeighborStencil {
    pub fn new(dx: &[f32]) -> Result<Self> {
        if dx.is_empty() {
            return Err(ExtrapolationError::invalid_parameter(
                "cell spacing needs at least one axis",
            ));
        }
        if let Some(bad) = dx.iter().find(|h| !(h.is_finite() && **h > 0.0)) {
            return Err(ExtrapolationError::invalid_parameter(format!(
                "cell spacing must be positive and finite, got {}",
                bad
            )));
        }

        let rank = dx.len();
        let count = 3usize.pow(rank as u32);
        let mut directions = Vec::with_capacity(count - 1);
        for code in 0..count {
            // Base-3 digits, first axis most significant
            let mut offset = vec![0i32; rank];
            let mut rest = code;
            for axis in (0..rank).rev() {
                offset[axis] = (rest % 3) as i32 - 1;
                rest /= 3;
            }
            if offset.iter().all(|&o| o == 0) {
                continue;
            }

            let step = offset
                .iter()
                .zip(dx)
                .map(|(&o, &h)| (o as f32 * h).powi(2))
                .sum::<f32>()
                .sqrt();
            let nonzero: Vec<usize> = (0..rank).filter(|&a| offset[a] != 0).collect();
            let positive_axis = match nonzero.as_slice() {
                [axis] if offset[*axis] == 1 => Some(*axis),
                _ => None,
            };

            directions.push(Direction {
                offset,
                step,
                positive_axis,
            });
        }

        Ok(Self { rank, directions })
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// All 3^rank - 1 directions.
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    /// Pure positive axis directions, one per axis.
    pub fn positive_axes(&self) -> impl Iterator<Item = &Direction> {
        self.directions.iter().filter(|d| d.positive_axis.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_count() {
        assert_eq!(NeighborStencil::new(&[1.0]).unwrap().directions().len(), 2);
        assert_eq!(NeighborStencil::new(&[1.0, 1.0]).unwrap().directions().len(), 8);
        assert_eq!(NeighborStencil::new(&[1.0; 3]).unwrap().directions().len(), 26);
    }

    #[test]
    fn test_lexicographic_order() {
        let stencil = NeighborStencil::new(&[1.0, 1.0]).unwrap();
        let offsets: Vec<Vec<i32>> = stencil.directions().iter().map(|d| d.offset.clone()).collect();
        assert_eq!(
            offsets,
            vec![
                vec![-1, -1],
                vec![-1, 0],
                vec![-1, 1],
                vec![0, -1],
                vec![0, 1],
                vec![1, -1],
                vec![1, 0],
                vec![1, 1],
            ]
        );
    }

    #[test]
    fn test_step_lengths_scale_with_spacing() {
        let stencil = NeighborStencil::new(&[0.5, 2.0]).unwrap();
        for d in stencil.directions() {
            let expected = ((d.offset[0] as f32 * 0.5).powi(2) + (d.offset[1] as f32 * 2.0).powi(2)).sqrt();
            assert!((d.step - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_positive_axes() {
        let stencil = NeighborStencil::new(&[1.0; 3]).unwrap();
        let axes: Vec<usize> = stencil.positive_axes().filter_map(|d| d.positive_axis).collect();
        // (0,0,1) comes before (0,1,0) before (1,0,0)
        assert_eq!(axes, vec![2, 1, 0]);
    }

    #[test]
    fn test_rejects_bad_spacing() {
        assert!(NeighborStencil::new(&[]).is_err());
        assert!(NeighborStencil::new(&[1.0, 0.0]).is_err());
        assert!(NeighborStencil::new(&[1.0, f32::NAN]).is_err());
        assert!(NeighborStencil::new(&[-1.0]).is_err());
    }
}
