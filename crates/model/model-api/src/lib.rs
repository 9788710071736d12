//! Model API
//!
//! Configuration types for estimators and data splitting.

use serde::{Deserialize, Serialize};

// Re-export SPI types
pub use model_spi::{ModelError, Result};

// ============================================================================
// Random Forest Configuration
// ============================================================================

/// Number of candidate features examined at each tree split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// All features.
    All,
    /// `floor(sqrt(n_features))`, at least 1.
    Sqrt,
    /// A fixed count, capped at the number of features.
    Count(usize),
}

impl MaxFeatures {
    /// Resolve to a concrete feature count.
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::Count(c) => (*c).min(n_features),
        };
        n.max(1).min(n_features.max(1))
    }
}

/// Per-class sample weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassWeight {
    /// Every sample weighs 1.
    Uniform,
    /// Weight `n_samples / (n_classes * count(class))`.
    Balanced,
}

/// Random forest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees (default: 200).
    pub n_estimators: usize,
    /// Maximum tree depth, `None` for unbounded (default: 10).
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node (default: 2).
    pub min_samples_split: usize,
    /// Candidate features per split (default: sqrt).
    pub max_features: MaxFeatures,
    /// Class weighting (default: balanced).
    pub class_weight: ClassWeight,
    /// Seed for bootstrap and feature sampling (default: 42).
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            max_depth: Some(10),
            min_samples_split: 2,
            max_features: MaxFeatures::Sqrt,
            class_weight: ClassWeight::Balanced,
            seed: 42,
        }
    }
}

impl ForestConfig {
    pub fn new(n_estimators: usize, max_depth: Option<usize>) -> Self {
        Self {
            n_estimators,
            max_depth,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(ModelError::invalid_parameter(
                "n_estimators",
                "must be at least 1",
            ));
        }
        if self.max_depth == Some(0) {
            return Err(ModelError::invalid_parameter(
                "max_depth",
                "must be at least 1",
            ));
        }
        if self.min_samples_split < 2 {
            return Err(ModelError::invalid_parameter(
                "min_samples_split",
                "must be at least 2",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// KNN Configuration
// ============================================================================

/// K-nearest-neighbours configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnConfig {
    /// Number of neighbours (default: 5).
    pub k: usize,
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self { k: 5 }
    }
}

impl KnnConfig {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

// ============================================================================
// Train/Test Split Configuration
// ============================================================================

/// Hold-out split configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of samples placed in the test split (default: 0.2).
    pub test_size: f64,
    /// Shuffle seed (default: 42).
    pub seed: u64,
    /// Preserve class proportions in both splits (default: true).
    pub stratify: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
            stratify: true,
        }
    }
}

impl SplitConfig {
    pub fn new(test_size: f64, seed: u64) -> Self {
        Self {
            test_size,
            seed,
            stratify: true,
        }
    }

    pub fn without_stratify(mut self) -> Self {
        self.stratify = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forest_defaults() {
        let config = ForestConfig::default();
        assert_eq!(config.n_estimators, 200);
        assert_eq!(config.max_depth, Some(10));
        assert_eq!(config.class_weight, ClassWeight::Balanced);
        assert_eq!(config.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_forest_validate_rejects_zero_trees() {
        let config = ForestConfig::new(0, None);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_forest_validate_rejects_zero_depth() {
        let config = ForestConfig::new(10, Some(0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_features_resolve() {
        assert_eq!(MaxFeatures::Sqrt.resolve(100), 10);
        assert_eq!(MaxFeatures::Sqrt.resolve(3), 1);
        assert_eq!(MaxFeatures::All.resolve(7), 7);
        assert_eq!(MaxFeatures::Count(50).resolve(7), 7);
        assert_eq!(MaxFeatures::Count(0).resolve(7), 1);
    }

    #[test]
    fn test_knn_and_split_defaults() {
        assert_eq!(KnnConfig::default().k, 5);
        let split = SplitConfig::default();
        assert_eq!(split.test_size, 0.2);
        assert_eq!(split.seed, 42);
        assert!(split.stratify);
        assert!(!split.without_stratify().stratify);
    }
}
