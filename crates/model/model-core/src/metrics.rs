//! Evaluation metrics
//!
//! Mismatched or empty inputs yield `NaN` rather than an error.

/// Fraction of predictions equal to the true label.
///
/// # Example
///
/// ```rust
/// use model_core::metrics::accuracy;
///
/// assert_eq!(accuracy(&[0, 1, 1, 2], &[0, 1, 2, 2]), 0.75);
/// ```
pub fn accuracy(actual: &[usize], predicted: &[usize]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let hits = actual
        .iter()
        .zip(predicted.iter())
        .filter(|(a, p)| a == p)
        .count();
    hits as f64 / actual.len() as f64
}

/// Mean Squared Error (MSE)
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    sum / actual.len() as f64
}

/// Coefficient of determination (R²)
///
/// 1.0 is a perfect fit. A constant target scores 1.0 when predicted exactly
/// and 0.0 otherwise.
pub fn r2(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    if ss_tot < 1e-12 {
        if ss_res < 1e-12 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}
