//! Shared result types.

mod class_probabilities;

pub use class_probabilities::ClassProbabilities;
