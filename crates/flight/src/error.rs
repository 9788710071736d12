//! Flight domain error types.

use model::ModelError;
use thiserror::Error;

/// Result type for flight operations.
pub type Result<T> = std::result::Result<T, FlightError>;

/// Errors raised while loading data, training, persisting or querying bundles.
#[derive(Debug, Error)]
pub enum FlightError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Dataset has no usable rows: {0}")]
    EmptyDataset(String),

    #[error("Invalid departure time: '{0}'")]
    InvalidTimestamp(String),

    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Unsupported bundle: {0}")]
    UnsupportedBundle(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl FlightError {
    pub(crate) fn validation(field: &str, reason: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for errors caused by the caller's input rather than the bundle or
    /// the environment.
    pub fn is_client_error(&self) -> bool {
        match self {
            FlightError::InvalidTimestamp(_) | FlightError::Validation { .. } => true,
            FlightError::Model(ModelError::UnknownLabel { .. }) => true,
            FlightError::Model(ModelError::DimensionMismatch { .. }) => true,
            _ => false,
        }
    }
}
