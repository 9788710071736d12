//! Estimator implementations
//!
//! Small, dependency-light estimators that can be fitted offline, stored
//! inside a bundle and evaluated per request:
//!
//! - [`preprocessing`]: standard scaling, label encoding, one-hot encoding
//! - [`classify`]: k-nearest-neighbours, decision tree, random forest
//! - [`regression`]: ordinary least squares
//! - [`split`]: seeded (optionally stratified) train/test split
//! - [`metrics`]: accuracy, MSE, R²
//!
//! ## Example
//!
//! ```rust
//! use model_core::classify::KnnClassifier;
//! use model_spi::Classifier;
//!
//! let x = vec![vec![0.0], vec![0.1], vec![5.0], vec![5.1]];
//! let y = vec![0, 0, 1, 1];
//! let mut knn = KnnClassifier::new(1).unwrap();
//! knn.fit(&x, &y).unwrap();
//! assert_eq!(knn.predict(&[4.9]).unwrap(), 1);
//! ```

pub mod classify;
pub mod metrics;
pub mod preprocessing;
pub mod regression;
pub mod split;

pub use classify::{DecisionTree, KnnClassifier, RandomForest};
pub use preprocessing::{LabelEncoder, OneHotEncoder, StandardScaler};
pub use regression::LinearRegression;
pub use split::train_test_split;

use model_spi::{ModelError, Result};

/// Check that every row of `x` has the same non-zero width and return it.
pub(crate) fn matrix_width(x: &[Vec<f64>]) -> Result<usize> {
    let width = match x.first() {
        Some(row) => row.len(),
        None => {
            return Err(ModelError::InsufficientData {
                required: 1,
                actual: 0,
            })
        }
    };
    if width == 0 {
        return Err(ModelError::InvalidData("feature rows are empty".to_string()));
    }
    if let Some(bad) = x.iter().find(|row| row.len() != width) {
        return Err(ModelError::DimensionMismatch {
            expected: width,
            actual: bad.len(),
        });
    }
    if x.iter().flatten().any(|v| !v.is_finite()) {
        return Err(ModelError::InvalidData(
            "feature matrix contains NaN or infinite values".to_string(),
        ));
    }
    Ok(width)
}

/// Reject a query row whose width differs from the fitted width.
pub(crate) fn check_row(row: &[f64], expected: usize) -> Result<()> {
    if row.len() != expected {
        return Err(ModelError::DimensionMismatch {
            expected,
            actual: row.len(),
        });
    }
    Ok(())
}
