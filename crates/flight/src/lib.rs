//! # flight
//!
//! Flight-delay estimation on top of the `model` estimators.
//!
//! Three independent model bundles are supported, each with an offline
//! training entry point and a request-time inference method:
//!
//! - **Risk** ([`risk`]): random forest over per-route monthly aggregates of
//!   the delay-cause dataset; answers "is weather a high-impact delay cause
//!   for this carrier at this airport in this month?", with a fallback to
//!   global averages for unknown routes.
//! - **Severity** ([`severity`]): KNN over departure-time and label-encoded
//!   categorical features; classifies a flight as `No Delay`, `Minor` or
//!   `Major`.
//! - **Regression** ([`regression`]): ordinary least squares baseline.
//!
//! [`heuristic`] needs no bundle at all.

pub mod aggregate;
pub mod bundle;
pub mod delay_cause;
mod error;
pub mod heuristic;
pub mod regression;
pub mod risk;
pub mod severity;

pub use aggregate::{AggregateRow, AggregateTable, Competitor, DataSource, TrendPoint};
pub use bundle::Bundle;
pub use delay_cause::{DelayCauseDataset, DelayCauseRecord};
pub use error::{FlightError, Result};
pub use heuristic::{HeuristicAssessment, HeuristicInput};
pub use regression::{PricePrediction, PriceQuery, RegressionBundle};
pub use risk::{FlightQuery, RiskAssessment, RiskBundle, RiskFeatureEncoder};
pub use severity::{
    DelaySeverity, DepartureFeatures, FlightInput, FlightRecord, SeverityBundle,
    SeverityPrediction,
};

/// Trim and upper-case a carrier or airport code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
