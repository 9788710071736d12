//! Error types for estimators.
//!
//! This module contains error types and the Result alias.

mod model_error;

pub use model_error::{ModelError, Result};
