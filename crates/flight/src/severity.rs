//! Delay-severity model
//!
//! Classifies a single flight as `No Delay`, `Minor` or `Major` from its
//! departure time and four label-encoded categorical fields, using a KNN
//! classifier on standard-scaled features.

use crate::bundle::Bundle;
use crate::error::{FlightError, Result};
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};
use model::{
    metrics, train_test_split, Classifier, KnnClassifier, KnnConfig, LabelEncoder, SplitConfig,
    StandardScaler, Transformer,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Column order of the feature vector.
pub const FEATURE_ORDER: [&str; 8] = [
    "Dep_Hour",
    "Dep_Day",
    "Dep_Month",
    "Dep_Weekday",
    "Airline_Encoded",
    "Departure_Encoded",
    "Arrival_Encoded",
    "Status_Encoded",
];

/// Accepted departure-time layouts, tried in order after RFC 3339.
const TIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Delay bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DelaySeverity {
    #[serde(rename = "No Delay")]
    NoDelay,
    Minor,
    Major,
}

impl DelaySeverity {
    /// `0` is no delay, up to 30 minutes is minor, anything longer is major.
    pub fn from_minutes(minutes: f64) -> Self {
        if minutes == 0.0 {
            DelaySeverity::NoDelay
        } else if minutes <= 30.0 {
            DelaySeverity::Minor
        } else {
            DelaySeverity::Major
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DelaySeverity::NoDelay => "No Delay",
            DelaySeverity::Minor => "Minor",
            DelaySeverity::Major => "Major",
        }
    }
}

impl fmt::Display for DelaySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightInput {
    #[serde(rename = "Airline")]
    pub airline: String,
    #[serde(rename = "Departure_Airport")]
    pub departure_airport: String,
    #[serde(rename = "Arrival_Airport")]
    pub arrival_airport: String,
    #[serde(rename = "Flight_Status")]
    pub flight_status: String,
    #[serde(rename = "Departure_Time")]
    pub departure_time: String,
}

/// Training row: a [`FlightInput`] with its observed delay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightRecord {
    #[serde(rename = "Airline")]
    pub airline: String,
    #[serde(rename = "Departure_Airport")]
    pub departure_airport: String,
    #[serde(rename = "Arrival_Airport")]
    pub arrival_airport: String,
    #[serde(rename = "Flight_Status")]
    pub flight_status: String,
    #[serde(rename = "Departure_Time")]
    pub departure_time: String,
    #[serde(rename = "Delay_Minutes")]
    pub delay_minutes: f64,
}

impl FlightRecord {
    pub fn input(&self) -> FlightInput {
        FlightInput {
            airline: self.airline.clone(),
            departure_airport: self.departure_airport.clone(),
            arrival_airport: self.arrival_airport.clone(),
            flight_status: self.flight_status.clone(),
            departure_time: self.departure_time.clone(),
        }
    }

    pub fn severity(&self) -> DelaySeverity {
        DelaySeverity::from_minutes(self.delay_minutes)
    }

    /// Read every row of a CSV file; rows that fail to deserialize are skipped.
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "loading flight records");
        Self::read_csv_from(BufReader::new(File::open(path)?))
    }

    pub fn read_csv_from<R: Read>(reader: R) -> Result<Vec<Self>> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();
        let mut skipped = 0usize;
        for row in rdr.deserialize::<FlightRecord>() {
            match row {
                Ok(record) => records.push(record),
                Err(err) => {
                    skipped += 1;
                    tracing::debug!(error = %err, "skipping malformed flight record");
                }
            }
        }
        if skipped > 0 {
            tracing::warn!(skipped, "skipped malformed flight records");
        }
        Ok(records)
    }
}

/// Calendar features derived from the departure time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepartureFeatures {
    pub hour: u32,
    pub day: u32,
    pub month: u32,
    /// Monday is 0.
    pub weekday: u32,
}

impl DepartureFeatures {
    /// Parse a departure time in any accepted layout.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let parsed = DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.naive_local())
            .ok()
            .or_else(|| {
                TIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            })
            .ok_or_else(|| FlightError::InvalidTimestamp(raw.to_string()))?;

        Ok(Self {
            hour: parsed.hour(),
            day: parsed.day(),
            month: parsed.month(),
            weekday: parsed.weekday().num_days_from_monday(),
        })
    }
}

/// Label encoders for the four categorical inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityEncoders {
    pub airline: LabelEncoder,
    pub departure: LabelEncoder,
    pub arrival: LabelEncoder,
    pub status: LabelEncoder,
}

impl SeverityEncoders {
    fn fit(records: &[FlightRecord]) -> Result<Self> {
        let mut airline = LabelEncoder::new("airline");
        let mut departure = LabelEncoder::new("departure");
        let mut arrival = LabelEncoder::new("arrival");
        let mut status = LabelEncoder::new("status");
        airline.fit(records.iter().map(|r| r.airline.as_str()))?;
        departure.fit(records.iter().map(|r| r.departure_airport.as_str()))?;
        arrival.fit(records.iter().map(|r| r.arrival_airport.as_str()))?;
        status.fit(records.iter().map(|r| r.flight_status.as_str()))?;
        Ok(Self {
            airline,
            departure,
            arrival,
            status,
        })
    }

    /// Unscaled feature row in [`FEATURE_ORDER`].
    pub fn features(&self, input: &FlightInput) -> Result<Vec<f64>> {
        let time = DepartureFeatures::parse(&input.departure_time)?;
        Ok(vec![
            time.hour as f64,
            time.day as f64,
            time.month as f64,
            time.weekday as f64,
            self.airline.transform(&input.airline)? as f64,
            self.departure.transform(&input.departure_airport)? as f64,
            self.arrival.transform(&input.arrival_airport)? as f64,
            self.status.transform(&input.flight_status)? as f64,
        ])
    }
}

/// Severity response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityPrediction {
    pub prediction: String,
    pub probabilities: BTreeMap<String, f64>,
}

/// Fitted severity model with its preprocessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityBundle {
    pub model: KnnClassifier,
    pub scaler: StandardScaler,
    pub encoders: SeverityEncoders,
    /// Class names; the classifier predicts ids into this encoder.
    pub target: LabelEncoder,
    pub feature_order: Vec<String>,
    /// Accuracy on the held-out split at training time.
    pub holdout_accuracy: f64,
}

impl Bundle for SeverityBundle {
    const KIND: &'static str = "severity";
}

impl SeverityBundle {
    /// Encode, split, scale and fit.
    ///
    /// Encoders see every usable record so that any label in the dataset can
    /// be queried later; the scaler and classifier only see the training split.
    pub fn train(records: &[FlightRecord], knn: KnnConfig, split: SplitConfig) -> Result<Self> {
        let usable: Vec<&FlightRecord> = records
            .iter()
            .filter(|r| DepartureFeatures::parse(&r.departure_time).is_ok())
            .collect();
        let dropped = records.len() - usable.len();
        if dropped > 0 {
            tracing::warn!(dropped, "dropped records with unparseable departure time");
        }
        if usable.is_empty() {
            return Err(FlightError::EmptyDataset(
                "no flight records with a valid departure time".to_string(),
            ));
        }
        let usable: Vec<FlightRecord> = usable.into_iter().cloned().collect();

        let encoders = SeverityEncoders::fit(&usable)?;
        let x = usable
            .iter()
            .map(|r| encoders.features(&r.input()))
            .collect::<Result<Vec<_>>>()?;

        let severities: Vec<&str> = usable.iter().map(|r| r.severity().as_str()).collect();
        let mut target = LabelEncoder::new("severity");
        let y = target.fit_transform(&severities)?;

        let (train_idx, test_idx) = train_test_split(&y, &split)?;
        let x_train: Vec<Vec<f64>> = train_idx.iter().map(|&i| x[i].clone()).collect();
        let y_train: Vec<usize> = train_idx.iter().map(|&i| y[i]).collect();

        let mut scaler = StandardScaler::new();
        scaler.fit_matrix(&x_train)?;
        let mut model = KnnClassifier::from_config(&knn)?;
        model.fit(&scaler.transform_matrix(&x_train)?, &y_train)?;

        let predicted = test_idx
            .iter()
            .map(|&i| model.predict(&scaler.transform(&x[i])?).map_err(FlightError::from))
            .collect::<Result<Vec<_>>>()?;
        let actual: Vec<usize> = test_idx.iter().map(|&i| y[i]).collect();
        let holdout_accuracy = metrics::accuracy(&actual, &predicted);

        tracing::info!(
            train = train_idx.len(),
            test = test_idx.len(),
            k = model.k(),
            holdout_accuracy,
            "severity model trained"
        );

        Ok(Self {
            model,
            scaler,
            encoders,
            target,
            feature_order: FEATURE_ORDER.iter().map(|s| s.to_string()).collect(),
            holdout_accuracy,
        })
    }

    /// Predict the severity class and per-class probabilities.
    pub fn predict(&self, input: &FlightInput) -> Result<SeverityPrediction> {
        let features = self.encoders.features(input)?;
        let scaled = self.scaler.transform(&features)?;
        let proba = self.model.predict_proba(&scaled)?;

        let prediction = self.target.inverse(proba.best())?.to_string();
        let probabilities = self
            .target
            .classes()
            .iter()
            .enumerate()
            .map(|(i, class)| (class.clone(), proba.get(i)))
            .collect();

        Ok(SeverityPrediction {
            prediction,
            probabilities,
        })
    }
}
