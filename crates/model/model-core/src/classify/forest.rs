//! Random forest classifier
//!
//! Bagged ensemble of [`DecisionTree`]s. Each tree sees a bootstrap sample
//! (expressed as per-row multiplicity weights) and a random feature subset at
//! every split. Trees are fitted in parallel; tree `t` is seeded with
//! `seed + t`, so the fitted forest does not depend on thread scheduling.

use super::tree::DecisionTree;
use model_api::{ClassWeight, ForestConfig};
use model_spi::{ClassProbabilities, Classifier, ModelError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random forest classifier.
///
/// # Example
///
/// ```rust
/// use model_api::ForestConfig;
/// use model_core::RandomForest;
/// use model_spi::Classifier;
///
/// let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64]).collect();
/// let y: Vec<usize> = (0..40).map(|i| usize::from(i >= 20)).collect();
///
/// let mut forest = RandomForest::new(ForestConfig::new(25, Some(4))).unwrap();
/// forest.fit(&x, &y).unwrap();
/// assert_eq!(forest.predict(&[35.0]).unwrap(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    n_classes: usize,
    n_features: usize,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            trees: Vec::new(),
            n_classes: 0,
            n_features: 0,
        })
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Per-class weights for `y` under the configured weighting.
    fn class_weights(&self, y: &[usize], n_classes: usize) -> Vec<f64> {
        match self.config.class_weight {
            ClassWeight::Uniform => vec![1.0; n_classes],
            ClassWeight::Balanced => {
                let mut counts = vec![0usize; n_classes];
                for &label in y {
                    counts[label] += 1;
                }
                let present = counts.iter().filter(|&&c| c > 0).count() as f64;
                let n = y.len() as f64;
                counts
                    .into_iter()
                    .map(|c| if c == 0 { 0.0 } else { n / (present * c as f64) })
                    .collect()
            }
        }
    }

    fn fit_tree(
        &self,
        index: usize,
        x: &[Vec<f64>],
        y: &[usize],
        class_weights: &[f64],
        n_classes: usize,
    ) -> Result<DecisionTree> {
        let seed = self.config.seed.wrapping_add(index as u64);
        let mut rng = StdRng::seed_from_u64(seed);

        let n = x.len();
        let mut multiplicity = vec![0.0; n];
        for _ in 0..n {
            multiplicity[rng.gen_range(0..n)] += 1.0;
        }
        let weights: Vec<f64> = multiplicity
            .iter()
            .zip(y.iter())
            .map(|(m, &label)| m * class_weights[label])
            .collect();

        let mut tree = DecisionTree::new(self.config.max_depth)
            .with_max_features(self.config.max_features)
            .with_min_samples_split(self.config.min_samples_split)
            .with_seed(seed);
        tree.fit_weighted(x, y, &weights, n_classes)?;
        Ok(tree)
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize]) -> Result<()> {
        if x.len() != y.len() {
            return Err(ModelError::InvalidData(format!(
                "{} feature rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        let width = crate::matrix_width(x)?;
        let n_classes = y.iter().copied().max().map_or(0, |m| m + 1);
        let class_weights = self.class_weights(y, n_classes);

        let this = &*self;
        let trees = (0..self.config.n_estimators)
            .into_par_iter()
            .map(|t| this.fit_tree(t, x, y, &class_weights, n_classes))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            trees = trees.len(),
            samples = x.len(),
            features = width,
            classes = n_classes,
            "random forest fitted"
        );

        self.trees = trees;
        self.n_classes = n_classes;
        self.n_features = width;
        Ok(())
    }

    fn predict_proba(&self, row: &[f64]) -> Result<ClassProbabilities> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        crate::check_row(row, self.n_features)?;

        let mut sum = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let proba = tree.predict_proba(row)?;
            for (s, p) in sum.iter_mut().zip(proba.probabilities.iter()) {
                *s += p;
            }
        }
        let n = self.trees.len() as f64;
        Ok(ClassProbabilities::new(sum.into_iter().map(|s| s / n).collect()))
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}
