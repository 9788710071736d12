//! Standard scaling
//!
//! Centers each column on its mean and divides by its population standard
//! deviation, the same as z-score standardization applied column-wise.

use model_spi::{ModelError, Result, Transformer};
use serde::{Deserialize, Serialize};

/// Column-wise z-score scaler.
///
/// # Example
///
/// ```rust
/// use model_core::StandardScaler;
///
/// let x = vec![vec![1.0, 10.0], vec![3.0, 10.0]];
/// let mut scaler = StandardScaler::new();
/// scaler.fit_matrix(&x).unwrap();
/// let scaled = scaler.transform_matrix(&x).unwrap();
/// assert_eq!(scaled[0], vec![-1.0, 0.0]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit on an owned matrix.
    pub fn fit_matrix(&mut self, x: &[Vec<f64>]) -> Result<()> {
        let rows: Vec<&[f64]> = x.iter().map(|r| r.as_slice()).collect();
        self.fit(&rows)
    }

    /// Transform every row of a matrix.
    pub fn transform_matrix(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        x.iter().map(|row| self.transform(row)).collect()
    }

    /// Fitted column means.
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Fitted column scales (standard deviations, 1.0 for constant columns).
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Number of columns seen during fit.
    pub fn n_features(&self) -> usize {
        self.means.len()
    }
}

impl Transformer for StandardScaler {
    type Input = [f64];

    fn fit(&mut self, rows: &[&[f64]]) -> Result<()> {
        let width = match rows.first() {
            Some(row) => row.len(),
            None => {
                return Err(ModelError::InsufficientData {
                    required: 1,
                    actual: 0,
                })
            }
        };
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(ModelError::DimensionMismatch {
                expected: width,
                actual: bad.len(),
            });
        }

        let n = rows.len() as f64;
        let mut means = vec![0.0; width];
        for row in rows {
            for (m, v) in means.iter_mut().zip(row.iter()) {
                *m += v;
            }
        }
        means.iter_mut().for_each(|m| *m /= n);

        let mut scales = vec![0.0; width];
        for row in rows {
            for ((s, v), m) in scales.iter_mut().zip(row.iter()).zip(means.iter()) {
                *s += (v - m).powi(2);
            }
        }
        for s in scales.iter_mut() {
            let std_dev = (*s / n).sqrt();
            *s = if std_dev < 1e-12 { 1.0 } else { std_dev };
        }

        self.means = means;
        self.scales = scales;
        Ok(())
    }

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        crate::check_row(row, self.means.len())?;
        Ok(row
            .iter()
            .zip(self.means.iter().zip(self.scales.iter()))
            .map(|(v, (m, s))| (v - m) / s)
            .collect())
    }

    fn is_fitted(&self) -> bool {
        !self.means.is_empty()
    }
}
