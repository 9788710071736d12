//! Contract traits for estimator implementations.

mod estimator;

pub use estimator::{Classifier, Regressor, Transformer};
