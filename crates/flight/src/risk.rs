//! Weather-risk model
//!
//! Training labels each aggregate row as high impact when its weather delay
//! proportion reaches the 75th percentile of all rows, then fits a random
//! forest on scaled numeric features plus one-hot month/carrier/airport.
//! The proportion itself is never a model input.
//!
//! At request time the route is looked up in the aggregate table; unknown
//! routes use the column means of the table so the model still gets a full
//! feature row.

use crate::aggregate::{AggregateRow, AggregateTable, Competitor, DataSource, TrendPoint};
use crate::bundle::Bundle;
use crate::delay_cause::DelayCauseDataset;
use crate::error::{FlightError, Result};
use crate::normalize_code;
use model::{Classifier, ForestConfig, OneHotEncoder, RandomForest, StandardScaler, Transformer};
use serde::{Deserialize, Serialize};

/// Quantile of the weather delay proportion separating high and low impact.
pub const HIGH_IMPACT_QUANTILE: f64 = 0.75;

/// Number of competitors reported per assessment.
pub const COMPETITOR_LIMIT: usize = 3;

/// Scaled numeric features followed by one-hot categorical features.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskFeatureEncoder {
    numeric: StandardScaler,
    categorical: OneHotEncoder,
}

impl RiskFeatureEncoder {
    /// Numeric input columns, in order.
    pub const NUMERIC_FEATURES: [&'static str; 4] = [
        "WeatherMinuteProportion",
        "TotalFlights",
        "WeatherDelayCount",
        "TotalDelayedFlights",
    ];

    /// Categorical input columns, in order.
    pub const CATEGORICAL_FEATURES: [&'static str; 3] = ["month", "carrier", "airport"];

    fn numeric_row(row: &AggregateRow) -> Vec<f64> {
        vec![
            row.weather_minute_proportion,
            row.total_flights,
            row.weather_delay_count,
            row.total_delayed_flights,
        ]
    }

    fn categorical_row(row: &AggregateRow) -> Vec<String> {
        vec![row.month.to_string(), row.carrier.clone(), row.airport.clone()]
    }

    pub fn fit(&mut self, rows: &[AggregateRow]) -> Result<()> {
        let numeric: Vec<Vec<f64>> = rows.iter().map(Self::numeric_row).collect();
        let categorical: Vec<Vec<String>> = rows.iter().map(Self::categorical_row).collect();
        self.numeric.fit_matrix(&numeric)?;
        self.categorical.fit_rows(&categorical)?;
        Ok(())
    }

    pub fn transform(&self, row: &AggregateRow) -> Result<Vec<f64>> {
        let mut features = self.numeric.transform(&Self::numeric_row(row))?;
        features.extend(self.categorical.transform(&Self::categorical_row(row))?);
        Ok(features)
    }

    /// Width of an encoded row.
    pub fn n_features(&self) -> usize {
        self.numeric.n_features() + self.categorical.n_output_features()
    }
}

/// Risk request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightQuery {
    /// Accepted for compatibility; aggregates are already averaged over years.
    #[serde(default)]
    pub year: Option<i32>,
    pub month: u32,
    pub carrier: String,
    pub airport: String,
}

impl FlightQuery {
    /// Check the month range and normalise the codes.
    pub fn validated(&self) -> Result<Self> {
        if !(1..=12).contains(&self.month) {
            return Err(FlightError::validation("month", "must be between 1 and 12"));
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
            year: self.year,
            month: self.month,
            carrier,
            airport,
        })
    }
}

/// Risk response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: String,
    pub risk_class: u8,
    pub confidence_high_risk: f64,
    pub confidence_low_risk: f64,
    pub data_source: DataSource,
    pub historical_weather_prop: f64,
    pub threshold: f64,
    pub trend_data: Vec<TrendPoint>,
    pub competitors: Vec<Competitor>,
}

/// Fitted risk model plus everything needed to answer a [`FlightQuery`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskBundle {
    pub forest: RandomForest,
    pub encoder: RiskFeatureEncoder,
    pub table: AggregateTable,
    pub threshold: f64,
    pub carriers: Vec<String>,
    pub airports: Vec<String>,
}

impl Bundle for RiskBundle {
    const KIND: &'static str = "risk";
}

impl RiskBundle {
    /// Aggregate the dataset, label rows and fit the forest.
    pub fn train(dataset: &DelayCauseDataset, config: ForestConfig) -> Result<Self> {
        if dataset.is_empty() {
            return Err(FlightError::EmptyDataset("delay-cause dataset".to_string()));
        }
        let carriers = dataset.carriers();
        let airports = dataset.airports();
        tracing::info!(
            carriers = carriers.len(),
            airports = airports.len(),
            records = dataset.len(),
            "building aggregate table"
        );

        let table = AggregateTable::from_records(&dataset.records);
        let threshold = table.proportion_quantile(HIGH_IMPACT_QUANTILE);
        let labels: Vec<usize> = table
            .rows()
            .iter()
            .map(|r| usize::from(r.weather_delay_proportion >= threshold))
            .collect();

        let mut encoder = RiskFeatureEncoder::default();
        encoder.fit(table.rows())?;
        let x = table
            .rows()
            .iter()
            .map(|r| encoder.transform(r))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            rows = x.len(),
            features = encoder.n_features(),
            high_impact = labels.iter().filter(|&&l| l == 1).count(),
            threshold,
            trees = config.n_estimators,
            "training random forest"
        );
        let mut forest = RandomForest::new(config)?;
        forest.fit(&x, &labels)?;

        Ok(Self {
            forest,
            encoder,
            table,
            threshold,
            carriers,
            airports,
        })
    }

    /// Score one route and attach trend and competitor context.
    pub fn assess(&self, query: &FlightQuery) -> Result<RiskAssessment> {
        let query = query.validated()?;
        let (row, source) = self.table.lookup(&query.carrier, &query.airport, query.month);

        let features = self.encoder.transform(&row)?;
        let proba = self.forest.predict_proba(&features)?;
        let risk_class = proba.best();
        tracing::debug!(
            carrier = %query.carrier,
            airport = %query.airport,
            month = query.month,
            source = %source,
            risk_class,
            "risk assessed"
        );

        Ok(RiskAssessment {
            risk_level: (if risk_class == 1 { "HIGH RISK" } else { "LOW RISK" }).to_string(),
            risk_class: risk_class as u8,
            confidence_high_risk: proba.get(1),
            confidence_low_risk: proba.get(0),
            data_source: source,
            historical_weather_prop: row.weather_delay_proportion,
            threshold: self.threshold,
            trend_data: self.table.yearly_trend(&query.carrier, &query.airport),
            competitors: self.table.competitors(
                &query.carrier,
                &query.airport,
                query.month,
                COMPETITOR_LIMIT,
            ),
        })
    }
}
