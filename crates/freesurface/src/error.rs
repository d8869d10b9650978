//! Error types for extrapolation and grid construction.

use thiserror::Error;

/// Result type alias for extrapolation operations.
pub type Result<T> = std::result::Result<T, ExtrapolationError>;

/// Configuration errors reported when a call is made.
///
/// The computation itself is deterministic and has no transient failure modes,
/// so every variant describes bad input that the caller has to fix.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtrapolationError {
    /// Grid extents, batch sizes or buffer lengths disagree.
    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },

    /// Number of spatial axes disagrees between inputs.
    #[error("rank mismatch: expected {expected} spatial axes, found {found}")]
    RankMismatch { expected: usize, found: usize },

    /// A parameter is outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The occupancy mask holds a value other than 0 or 1.
    #[error("occupancy mask must be binary, found {value} at flat index {index}")]
    NonBinaryMask { index: usize, value: f32 },
}

impl ExtrapolationError {
    /// Create a shape mismatch error.
    #[must_use]
    pub fn shape_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(details: impl Into<String>) -> Self {
        Self::InvalidParameter(details.into())
    }
}
