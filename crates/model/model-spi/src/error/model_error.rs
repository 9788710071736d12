//! Estimator error types
//!
//! Defines the standardized error type for all estimator operations.

use thiserror::Error;

/// Result type alias for estimator operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur while fitting or applying an estimator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Not enough samples for the operation
    #[error("Insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Estimator has not been fitted yet
    #[error("Model must be fitted before prediction")]
    NotFitted,

    /// Feature row width differs from the width seen during fit
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Categorical value that the encoder never saw during fit
    #[error("Encoder '{encoder}' contains previously unseen label: '{label}'")]
    UnknownLabel { encoder: String, label: String },

    /// Invalid training or inference data
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl ModelError {
    /// Shorthand for [`ModelError::InvalidParameter`].
    pub fn invalid_parameter(name: &str, reason: &str) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}
