//! K-Nearest Neighbours classifier
//!
//! Stores the training rows and, for a query, takes a uniform vote among the
//! `k` closest rows by Euclidean distance. Distance ties keep training order.

use model_api::KnnConfig;
use model_spi::{ClassProbabilities, Classifier, ModelError, Result};
use serde::{Deserialize, Serialize};

/// Uniform-vote KNN classifier.
///
/// @algorithm KNN
/// @category MachineLearning
/// @complexity O(1) fit, O(n*d + n log n) predict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnClassifier {
    k: usize,
    x: Vec<Vec<f64>>,
    y: Vec<usize>,
    n_classes: usize,
    n_features: usize,
}

impl KnnClassifier {
    /// Create a classifier voting among `k` neighbours.
    pub fn new(k: usize) -> Result<Self> {
        if k < 1 {
            return Err(ModelError::invalid_parameter("k", "must be at least 1"));
        }
        Ok(Self {
            k,
            x: Vec::new(),
            y: Vec::new(),
            n_classes: 0,
            n_features: 0,
        })
    }

    /// Create from configuration.
    pub fn from_config(config: &KnnConfig) -> Result<Self> {
        Self::new(config.k)
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of stored training rows.
    pub fn n_samples(&self) -> usize {
        self.x.len()
    }

    fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
    }
}

impl Classifier for KnnClassifier {
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize]) -> Result<()> {
        if x.len() < self.k {
            return Err(ModelError::InsufficientData {
                required: self.k,
                actual: x.len(),
            });
        }
        if x.len() != y.len() {
            return Err(ModelError::InvalidData(format!(
                "{} feature rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        let width = crate::matrix_width(x)?;

        self.n_features = width;
        self.n_classes = y.iter().copied().max().map_or(0, |m| m + 1);
        self.x = x.to_vec();
        self.y = y.to_vec();
        Ok(())
    }

    fn predict_proba(&self, row: &[f64]) -> Result<ClassProbabilities> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        crate::check_row(row, self.n_features)?;

        let mut distances: Vec<(usize, f64)> = self
            .x
            .iter()
            .enumerate()
            .map(|(i, sample)| (i, Self::squared_distance(row, sample)))
            .collect();
        distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut votes = vec![0.0; self.n_classes];
        for &(i, _) in distances.iter().take(self.k) {
            votes[self.y[i]] += 1.0;
        }
        let k = self.k as f64;
        Ok(ClassProbabilities::new(votes.into_iter().map(|v| v / k).collect()))
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn is_fitted(&self) -> bool {
        !self.x.is_empty()
    }
}
