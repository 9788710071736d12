//! Estimator traits
//!
//! Every estimator follows the fit/predict pattern: fit once on a matrix of
//! feature rows, then answer single-row queries. Rows are plain `&[f64]`
//! slices; callers are responsible for producing them in the column order
//! used during fit.

use crate::error::Result;
use crate::model::ClassProbabilities;

/// Common trait for classifiers over dense feature rows.
///
/// Class labels are dense ids `0..n_classes`. String labels are mapped to ids
/// by the caller (typically through a label encoder), so that
/// `predict_proba(row).probabilities[i]` is the probability of class `i`.
pub trait Classifier: Send + Sync {
    /// Fit the classifier.
    ///
    /// # Arguments
    ///
    /// * `x` - Feature rows, all of the same width
    /// * `y` - Class id per row
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize]) -> Result<()>;

    /// Class membership probabilities for one row.
    fn predict_proba(&self, row: &[f64]) -> Result<ClassProbabilities>;

    /// Most probable class id for one row.
    fn predict(&self, row: &[f64]) -> Result<usize> {
        Ok(self.predict_proba(row)?.best())
    }

    /// Number of classes seen during fit.
    fn n_classes(&self) -> usize;

    /// Check if the classifier has been fitted.
    fn is_fitted(&self) -> bool;
}

/// Common trait for scalar regressors.
pub trait Regressor: Send + Sync {
    /// Fit the regressor on feature rows and targets.
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()>;

    /// Predict the target for one row.
    fn predict(&self, row: &[f64]) -> Result<f64>;

    /// Check if the regressor has been fitted.
    fn is_fitted(&self) -> bool;
}

/// Learned row-wise feature transformation (scaling, encoding).
pub trait Transformer: Send + Sync {
    /// Input row type.
    type Input: ?Sized;

    /// Learn the transformation parameters from sample rows.
    fn fit(&mut self, rows: &[&Self::Input]) -> Result<()>;

    /// Apply the learned transformation to one row.
    fn transform(&self, row: &Self::Input) -> Result<Vec<f64>>;

    /// Check if the transformer has been fitted.
    fn is_fitted(&self) -> bool;
}
