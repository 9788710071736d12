//! Rule-based delay estimate
//!
//! Needs no trained model: the score is plain arithmetic on the delay counts
//! supplied by the caller.

use crate::error::{FlightError, Result};
use crate::normalize_code;
use crate::severity::DelaySeverity;
use serde::{Deserialize, Serialize};

/// Weather delay count above which weather risk is flagged.
pub const WEATHER_RISK_THRESHOLD: f64 = 10.0;

/// Minutes charged per cancelled flight.
pub const CANCELLATION_PENALTY_MINUTES: f64 = 30.0;

pub const MESSAGE: &str = "Rule-based estimate (no trained model involved)";

/// Heuristic request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicInput {
    pub carrier: String,
    pub airport: String,
    pub month: u32,
    pub weather_delay_count: f64,
    pub carrier_delay_count: f64,
    pub late_aircraft_count: f64,
    pub cancelled_flights: f64,
}

/// Heuristic response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicAssessment {
    pub message: String,
    pub high_weather_risk: bool,
    pub total_delay_minutes: f64,
    pub delay_category: DelaySeverity,
}

impl HeuristicInput {
    /// Range-check every field and normalise the codes.
    pub fn validated(&self) -> Result<Self> {
        if !(1..=12).contains(&self.month) {
            return Err(FlightError::validation("month", "must be between 1 and 12"));
        }
        let counts = [
            ("weather_delay_count", self.weather_delay_count),
            ("carrier_delay_count", self.carrier_delay_count),
            ("late_aircraft_count", self.late_aircraft_count),
            ("cancelled_flights", self.cancelled_flights),
        ];
        for (field, value) in counts {
            if !value.is_finite() || value < 0.0 {
                return Err(FlightError::validation(field, "must be greater than or equal to 0"));
            }
        }

        let carrier = normalize_code(&self.carrier);
        let airport = normalize_code(&self.airport);
        if carrier.is_empty() {
            return Err(FlightError::validation("carrier", "must not be empty"));
        }
        if airport.is_empty() {
            return Err(FlightError::validation("airport", "must not be empty"));
        }

        Ok(Self {
            carrier,
            airport,
            ..self.clone()
        })
    }

    /// Validate, then score.
    pub fn assess(&self) -> Result<HeuristicAssessment> {
        let input = self.validated()?;
        let total_delay_minutes = input.carrier_delay_count
            + input.late_aircraft_count
            + input.cancelled_flights * CANCELLATION_PENALTY_MINUTES;

        Ok(HeuristicAssessment {
            message: MESSAGE.to_string(),
            high_weather_risk: input.weather_delay_count > WEATHER_RISK_THRESHOLD,
            total_delay_minutes,
            delay_category: DelaySeverity::from_minutes(total_delay_minutes),
        })
    }
}
