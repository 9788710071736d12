//! Model Facade
//!
//! Unified re-exports for the estimator layer.
//!
//! This facade provides a single entry point to:
//! - `Classifier`, `Regressor`, `Transformer` and `ModelError` from SPI
//! - Configuration types from API
//! - Estimator, preprocessing and metric implementations from Core

// Re-export everything from SPI
pub use model_spi::*;

// Re-export everything from API
pub use model_api::*;

// Re-export everything from Core
pub use model_core::*;
