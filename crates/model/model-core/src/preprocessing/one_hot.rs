//! One-hot encoding over several categorical columns.

use model_spi::{ModelError, Result, Transformer};
use serde::{Deserialize, Serialize};

/// One-hot encoder.
///
/// Each input column expands into one indicator per category seen during
/// fit. A category that was not seen during fit encodes to an all-zero block
/// instead of failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit on owned rows.
    pub fn fit_rows(&mut self, rows: &[Vec<String>]) -> Result<()> {
        let refs: Vec<&[String]> = rows.iter().map(|r| r.as_slice()).collect();
        self.fit(&refs)
    }

    /// Sorted categories per input column.
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Width of an encoded row.
    pub fn n_output_features(&self) -> usize {
        self.categories.iter().map(|c| c.len()).sum()
    }
}

impl Transformer for OneHotEncoder {
    type Input = [String];

    fn fit(&mut self, rows: &[&[String]]) -> Result<()> {
        let width = match rows.first() {
            Some(row) => row.len(),
            None => {
                return Err(ModelError::InsufficientData {
                    required: 1,
                    actual: 0,
                })
            }
        };

        let mut categories: Vec<Vec<String>> = vec![Vec::new(); width];
        for row in rows {
            if row.len() != width {
                return Err(ModelError::DimensionMismatch {
                    expected: width,
                    actual: row.len(),
                });
            }
            for (cats, value) in categories.iter_mut().zip(row.iter()) {
                cats.push(value.clone());
            }
        }
        for cats in categories.iter_mut() {
            cats.sort();
            cats.dedup();
        }

        self.categories = categories;
        Ok(())
    }

    fn transform(&self, row: &[String]) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        if row.len() != self.categories.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.categories.len(),
                actual: row.len(),
            });
        }

        let mut encoded = vec![0.0; self.n_output_features()];
        let mut offset = 0;
        for (cats, value) in self.categories.iter().zip(row.iter()) {
            if let Ok(pos) = cats.binary_search(value) {
                encoded[offset + pos] = 1.0;
            }
            offset += cats.len();
        }
        Ok(encoded)
    }

    fn is_fitted(&self) -> bool {
        !self.categories.is_empty()
    }
}
