//! Model Service Provider Interface
//!
//! Defines the estimator contracts and error types shared by every model
//! that can be placed in a bundle:
//!
//! - [`Classifier`]: fit on feature rows and class ids, predict class probabilities
//! - [`Regressor`]: fit on feature rows and targets, predict a scalar
//! - [`Transformer`]: learn a feature transformation and apply it row by row
//! - [`ModelError`]: standardized error type for all estimator operations

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::{Classifier, Regressor, Transformer};
pub use error::{ModelError, Result};
pub use model::ClassProbabilities;
