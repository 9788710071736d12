//! Multiple linear regression
//!
//! Ordinary least squares with an intercept, solved through the normal
//! equations `(XᵀX) β = Xᵀy` by Gaussian elimination with partial pivoting.
//!
//! ## When to Use
//!
//! - Few features, few samples
//! - Quick, interpretable baseline

use model_spi::{ModelError, Regressor, Result};
use serde::{Deserialize, Serialize};

/// OLS linear regression.
///
/// Fits `y = intercept + Σ coefficients[j] * x[j]`.
///
/// # Example
///
/// ```rust
/// use model_core::LinearRegression;
/// use model_spi::Regressor;
///
/// let x = vec![vec![1.0], vec![2.0], vec![3.0]];
/// let y = vec![3.0, 5.0, 7.0];
/// let mut model = LinearRegression::new();
/// model.fit(&x, &y).unwrap();
/// assert!((model.predict(&[4.0]).unwrap() - 9.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearRegression {
    intercept: f64,
    coefficients: Vec<f64>,
    fitted: bool,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        let width = crate::matrix_width(x)?;
        if x.len() != y.len() {
            return Err(ModelError::InvalidData(format!(
                "{} feature rows but {} targets",
                x.len(),
                y.len()
            )));
        }
        let dim = width + 1;
        if x.len() < dim {
            return Err(ModelError::InsufficientData {
                required: dim,
                actual: x.len(),
            });
        }

        // Augmented normal-equation matrix [XᵀX | Xᵀy], column 0 is the intercept
        let mut a = vec![vec![0.0; dim + 1]; dim];
        for (row, &target) in x.iter().zip(y.iter()) {
            let design: Vec<f64> = std::iter::once(1.0).chain(row.iter().copied()).collect();
            for i in 0..dim {
                for j in 0..dim {
                    a[i][j] += design[i] * design[j];
                }
                a[i][dim] += design[i] * target;
            }
        }

        let beta = solve(a)?;
        self.intercept = beta[0];
        self.coefficients = beta[1..].to_vec();
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> Result<f64> {
        if !self.fitted {
            return Err(ModelError::NotFitted);
        }
        crate::check_row(row, self.coefficients.len())?;
        Ok(self.intercept
            + row
                .iter()
                .zip(self.coefficients.iter())
                .map(|(v, c)| v * c)
                .sum::<f64>())
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}

/// Solve an augmented `n x (n+1)` system in place.
fn solve(mut a: Vec<Vec<f64>>) -> Result<Vec<f64>> {
    let n = a.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-10 {
            return Err(ModelError::InvalidData(
                "singular matrix in regression".to_string(),
            ));
        }
        a.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..=n {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    let mut beta = vec![0.0; n];
    for i in (0..n).rev() {
        let tail: f64 = ((i + 1)..n).map(|j| a[i][j] * beta[j]).sum();
        beta[i] = (a[i][n] - tail) / a[i][i];
    }
    Ok(beta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_exact_plane() {
        // y = 2 + 3a - b
        let x = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![2.0, 3.0],
            vec![4.0, 1.0],
        ];
        let y: Vec<f64> = x.iter().map(|r| 2.0 + 3.0 * r[0] - r[1]).collect();
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        assert!((model.intercept() - 2.0).abs() < 1e-9);
        assert!((model.coefficients()[0] - 3.0).abs() < 1e-9);
        assert!((model.coefficients()[1] + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_collinear_features_are_singular() {
        let x = vec![vec![1.0, 2.0], vec![2.0, 4.0], vec![3.0, 6.0]];
        let mut model = LinearRegression::new();
        assert!(matches!(
            model.fit(&x, &[1.0, 2.0, 3.0]),
            Err(ModelError::InvalidData(_))
        ));
    }

    #[test]
    fn test_needs_more_rows_than_features() {
        let mut model = LinearRegression::new();
        let result = model.fit(&[vec![1.0, 2.0]], &[1.0]);
        assert_eq!(
            result,
            Err(ModelError::InsufficientData {
                required: 3,
                actual: 1
            })
        );
    }

    #[test]
    fn test_predict_before_fit() {
        let model = LinearRegression::new();
        assert_eq!(model.predict(&[1.0]), Err(ModelError::NotFitted));
        assert!(!model.is_fitted());
    }
}
