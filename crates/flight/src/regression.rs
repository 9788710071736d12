//! Linear regression baseline
//!
//! Fits price on square footage and bedroom count from a small built-in
//! sample. Kept as the simplest end-to-end bundle: train, save, load, predict.

use crate::bundle::Bundle;
use crate::error::{FlightError, Result};
use model::{metrics, LinearRegression, Regressor};
use serde::{Deserialize, Serialize};

/// Built-in training sample: `([square_footage, bedrooms], price)`.
pub const TRAINING_SAMPLE: [([f64; 2], f64); 6] = [
    ([1500.0, 3.0], 300000.0),
    ([1200.0, 2.0], 250000.0),
    ([1800.0, 4.0], 400000.0),
    ([2000.0, 5.0], 500000.0),
    ([1400.0, 2.0], 270000.0),
    ([1600.0, 3.0], 320000.0),
];

/// Regression request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuery {
    pub square_footage: f64,
    pub bedrooms: f64,
}

/// Regression response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePrediction {
    pub prediction: f64,
}

/// Fitted regression with its in-sample fit statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionBundle {
    pub model: LinearRegression,
    pub mse: f64,
    pub r2: f64,
}

impl Bundle for RegressionBundle {
    const KIND: &'static str = "regression";
}

impl RegressionBundle {
    /// Fit on [`TRAINING_SAMPLE`].
    pub fn train() -> Result<Self> {
        let x: Vec<Vec<f64>> = TRAINING_SAMPLE.iter().map(|(f, _)| f.to_vec()).collect();
        let y: Vec<f64> = TRAINING_SAMPLE.iter().map(|(_, t)| *t).collect();
        Self::train_on(&x, &y)
    }

    /// Fit on arbitrary `[square_footage, bedrooms]` rows.
    pub fn train_on(x: &[Vec<f64>], y: &[f64]) -> Result<Self> {
        let mut regressor = LinearRegression::new();
        regressor.fit(x, y)?;

        let fitted = x
            .iter()
            .map(|row| regressor.predict(row))
            .collect::<model::Result<Vec<_>>>()?;
        let mse = metrics::mse(y, &fitted);
        let r2 = metrics::r2(y, &fitted);
        tracing::info!(mse, r2, "regression model trained");

        Ok(Self {
            model: regressor,
            mse,
            r2,
        })
    }

    pub fn predict(&self, query: &PriceQuery) -> Result<PricePrediction> {
        if !query.square_footage.is_finite() || query.square_footage < 0.0 {
            return Err(FlightError::validation(
                "square_footage",
                "must be a non-negative number",
            ));
        }
        if !query.bedrooms.is_finite() || query.bedrooms < 0.0 {
            return Err(FlightError::validation(
                "bedrooms",
                "must be a non-negative number",
            ));
        }
        let prediction = self.model.predict(&[query.square_footage, query.bedrooms])?;
        Ok(PricePrediction { prediction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_on_builtin_sample() {
        let bundle = RegressionBundle::train().unwrap();
        assert!(bundle.r2 > 0.95);
        assert!(bundle.mse > 0.0);
        assert_eq!(bundle.model.coefficients().len(), 2);
    }

    #[test]
    fn test_predict_between_samples() {
        let bundle = RegressionBundle::train().unwrap();
        let price = bundle
            .predict(&PriceQuery {
                square_footage: 1700.0,
                bedrooms: 3.0,
            })
            .unwrap()
            .prediction;
        assert!(price > 300000.0 && price < 400000.0);
    }

    #[test]
    fn test_negative_input_rejected() {
        let bundle = RegressionBundle::train().unwrap();
        let result = bundle.predict(&PriceQuery {
            square_footage: -1.0,
            bedrooms: 3.0,
        });
        assert!(matches!(result, Err(FlightError::Validation { .. })));
    }
}
