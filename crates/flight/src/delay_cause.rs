//! Airline delay-cause dataset
//!
//! One CSV row per (year, month, carrier, airport) with arrival counts and
//! delay attribution. Header spellings vary between exports, so headers are
//! normalised before lookup: every character outside `[A-Za-z0-9_]` is
//! removed and a few verbose names are renamed to short ones.

use crate::error::{FlightError, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const RENAMES: &[(&str, &str)] = &[
    ("Numberofarrivingflights", "TotalFlights"),
    ("Numberofflightsdelayedby15minutesormore", "TotalDelayedFlights"),
    ("Weathercountdelayduetoweather", "WeatherDelayCount"),
    ("Delayattributedtoweather", "DelayAttributedToWeatherMinutes"),
];

/// Columns parsed as numbers; rows where any of them fails to parse, or whose
/// month is not a whole number from 1 to 12, are dropped.
const NUMERIC_COLUMNS: &[&str] = &[
    "TotalFlights",
    "TotalDelayedFlights",
    "WeatherDelayCount",
    "Totalarrivaldelay",
    "DelayAttributedToWeatherMinutes",
    "month",
];

/// One cleaned dataset row with its derived proportions.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayCauseRecord {
    pub carrier: String,
    pub airport: String,
    pub month: u32,
    pub total_flights: f64,
    pub total_delayed_flights: f64,
    pub weather_delay_count: f64,
    pub total_arrival_delay: f64,
    pub weather_delay_minutes: f64,
}

impl DelayCauseRecord {
    /// Share of delayed flights attributed to weather, 0 when nothing was delayed.
    pub fn weather_delay_proportion(&self) -> f64 {
        if self.total_delayed_flights > 0.0 {
            self.weather_delay_count / self.total_delayed_flights
        } else {
            0.0
        }
    }

    /// Share of delay minutes attributed to weather, 0 when there was no delay.
    pub fn weather_minute_proportion(&self) -> f64 {
        if self.total_arrival_delay > 0.0 {
            self.weather_delay_minutes / self.total_arrival_delay
        } else {
            0.0
        }
    }
}

/// Cleaned delay-cause dataset.
#[derive(Debug, Clone, Default)]
pub struct DelayCauseDataset {
    pub records: Vec<DelayCauseRecord>,
}

impl DelayCauseDataset {
    /// Load from a CSV file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "loading delay-cause dataset");
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(normalize_header).collect();

        let column = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| FlightError::MissingColumn(name.to_string()))
        };
        let carrier_idx = column("carrier")?;
        let airport_idx = column("airport")?;
        let numeric_idx = NUMERIC_COLUMNS
            .iter()
            .map(|name| column(name))
            .collect::<Result<Vec<_>>>()?;

        let mut records = Vec::new();
        let mut dropped = 0usize;
        for row in rdr.records() {
            let row = row?;
            let carrier = row.get(carrier_idx).map(str::trim).unwrap_or_default();
            let airport = row.get(airport_idx).map(str::trim).unwrap_or_default();
            let numbers: Option<Vec<f64>> = numeric_idx
                .iter()
                .map(|&i| row.get(i).and_then(|v| v.trim().parse::<f64>().ok()))
                .collect();

            match numbers {
                Some(n)
                    if !carrier.is_empty()
                        && !airport.is_empty()
                        && n.iter().all(|v| v.is_finite())
                        && is_calendar_month(n[5]) =>
                {
                    records.push(DelayCauseRecord {
                        carrier: carrier.to_string(),
                        airport: airport.to_string(),
                        total_flights: n[0],
                        total_delayed_flights: n[1],
                        weather_delay_count: n[2],
                        total_arrival_delay: n[3],
                        weather_delay_minutes: n[4],
                        month: n[5] as u32,
                    });
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::debug!(dropped, "dropped rows with missing or non-numeric fields");
        }
        if records.is_empty() {
            return Err(FlightError::EmptyDataset(
                "no delay-cause rows with complete numeric fields".to_string(),
            ));
        }
        Ok(Self { records })
    }

    /// Sorted distinct carrier codes.
    pub fn carriers(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.carrier.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted distinct airport codes.
    pub fn airports(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.airport.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Whole numbers from 1 to 12.
fn is_calendar_month(value: f64) -> bool {
    value.fract() == 0.0 && (1.0..=12.0).contains(&value)
}

/// Strip non-identifier characters and apply the short-name renames.
pub fn normalize_header(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    RENAMES
        .iter()
        .find(|(from, _)| *from == cleaned)
        .map(|(_, to)| to.to_string())
        .unwrap_or(cleaned)
}
