//! Classifier output type.

use serde::{Deserialize, Serialize};

/// Probability per class id, as returned by [`crate::Classifier::predict_proba`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    /// `probabilities[i]` is the probability of class id `i`.
    pub probabilities: Vec<f64>,
}

impl ClassProbabilities {
    /// Create a new probability vector.
    pub fn new(probabilities: Vec<f64>) -> Self {
        Self { probabilities }
    }

    /// Class id with the highest probability.
    ///
    /// Ties go to the lowest class id.
    pub fn best(&self) -> usize {
        let mut best = 0;
        for (i, &p) in self.probabilities.iter().enumerate() {
            if p > self.probabilities[best] {
                best = i;
            }
        }
        best
    }

    /// Probability of class `class`, 0.0 for an id out of range.
    pub fn get(&self, class: usize) -> f64 {
        self.probabilities.get(class).copied().unwrap_or(0.0)
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// True when there are no classes.
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_picks_max() {
        let p = ClassProbabilities::new(vec![0.2, 0.6, 0.2]);
        assert_eq!(p.best(), 1);
    }

    #[test]
    fn test_best_tie_goes_to_lowest_id() {
        let p = ClassProbabilities::new(vec![0.4, 0.4, 0.2]);
        assert_eq!(p.best(), 0);
    }

    #[test]
    fn test_get_out_of_range() {
        let p = ClassProbabilities::new(vec![1.0]);
        assert_eq!(p.get(0), 1.0);
        assert_eq!(p.get(3), 0.0);
        assert_eq!(p.len(), 1);
        assert!(!p.is_empty());
    }
}
