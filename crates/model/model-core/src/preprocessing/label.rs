//! Label encoding: maps each distinct string to its rank in sorted order.

use model_spi::{ModelError, Result};
use serde::{Deserialize, Serialize};

/// Categorical label encoder.
///
/// Classes are stored sorted, so the id of a label is stable for a given
/// training set regardless of row order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelEncoder {
    name: String,
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Create an encoder; `name` is reported in unknown-label errors.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            classes: Vec::new(),
        }
    }

    /// Learn the sorted set of distinct labels.
    pub fn fit<I, S>(&mut self, labels: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = labels.into_iter().map(|s| s.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();
        if classes.is_empty() {
            return Err(ModelError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        self.classes = classes;
        Ok(())
    }

    /// Fit and encode the same labels.
    pub fn fit_transform<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<Vec<usize>> {
        self.fit(labels.iter().map(|s| s.as_ref()))?;
        labels.iter().map(|s| self.transform(s.as_ref())).collect()
    }

    /// Id of `label`.
    pub fn transform(&self, label: &str) -> Result<usize> {
        if self.classes.is_empty() {
            return Err(ModelError::NotFitted);
        }
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| ModelError::UnknownLabel {
                encoder: self.name.clone(),
                label: label.to_string(),
            })
    }

    /// Label for `id`.
    pub fn inverse(&self, id: usize) -> Result<&str> {
        self.classes
            .get(id)
            .map(|s| s.as_str())
            .ok_or_else(|| ModelError::InvalidData(format!("class id {} out of range", id)))
    }

    /// Sorted known labels.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_fitted(&self) -> bool {
        !self.classes.is_empty()
    }
}
