//! Per-route monthly aggregates
//!
//! The delay-cause dataset is reduced to one row per
//! `(carrier, airport, month)` holding the mean of five features across
//! years. The table doubles as training data for the risk model and as the
//! reference data looked up at request time.

use crate::delay_cause::DelayCauseRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Mean features for one `(carrier, airport, month)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub carrier: String,
    pub airport: String,
    pub month: u32,
    pub weather_delay_proportion: f64,
    pub weather_minute_proportion: f64,
    pub total_flights: f64,
    pub weather_delay_count: f64,
    pub total_delayed_flights: f64,
}

/// Whether a lookup hit a real row or fell back to global means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    #[serde(rename = "Historical Match")]
    HistoricalMatch,
    #[serde(rename = "Global Fallback")]
    GlobalFallback,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::HistoricalMatch => write!(f, "Historical Match"),
            DataSource::GlobalFallback => write!(f, "Global Fallback"),
        }
    }
}

/// One month of a route's yearly trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub month: u32,
    pub risk_score: f64,
    pub flight_volume: u64,
}

/// Another carrier serving the same airport in the same month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub carrier: String,
    pub risk_score: f64,
    pub flight_volume: u64,
}

#[derive(Serialize, Deserialize)]
struct TableRepr {
    rows: Vec<AggregateRow>,
}

/// Aggregate rows indexed by `(carrier, airport, month)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "TableRepr", into = "TableRepr")]
pub struct AggregateTable {
    rows: Vec<AggregateRow>,
    index: HashMap<(String, String, u32), usize>,
}

impl From<TableRepr> for AggregateTable {
    fn from(repr: TableRepr) -> Self {
        Self::from_rows(repr.rows)
    }
}

impl From<AggregateTable> for TableRepr {
    fn from(table: AggregateTable) -> Self {
        Self { rows: table.rows }
    }
}

#[derive(Default)]
struct Accumulator {
    n: f64,
    weather_delay_proportion: f64,
    weather_minute_proportion: f64,
    total_flights: f64,
    weather_delay_count: f64,
    total_delayed_flights: f64,
}

impl AggregateTable {
    /// Build from already-aggregated rows. Later duplicates of a key are
    /// unreachable through [`lookup`](Self::lookup).
    pub fn from_rows(rows: Vec<AggregateRow>) -> Self {
        let mut index = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            index
                .entry((row.carrier.clone(), row.airport.clone(), row.month))
                .or_insert(i);
        }
        Self { rows, index }
    }

    /// Group raw records by `(carrier, airport, month)` and average them.
    ///
    /// Rows come out sorted by key.
    pub fn from_records(records: &[DelayCauseRecord]) -> Self {
        let mut groups: BTreeMap<(String, String, u32), Accumulator> = BTreeMap::new();
        for r in records {
            let acc = groups
                .entry((r.carrier.clone(), r.airport.clone(), r.month))
                .or_default();
            acc.n += 1.0;
            acc.weather_delay_proportion += r.weather_delay_proportion();
            acc.weather_minute_proportion += r.weather_minute_proportion();
            acc.total_flights += r.total_flights;
            acc.weather_delay_count += r.weather_delay_count;
            acc.total_delayed_flights += r.total_delayed_flights;
        }

        let rows = groups
            .into_iter()
            .map(|((carrier, airport, month), acc)| AggregateRow {
                carrier,
                airport,
                month,
                weather_delay_proportion: acc.weather_delay_proportion / acc.n,
                weather_minute_proportion: acc.weather_minute_proportion / acc.n,
                total_flights: acc.total_flights / acc.n,
                weather_delay_count: acc.weather_delay_count / acc.n,
                total_delayed_flights: acc.total_delayed_flights / acc.n,
            })
            .collect();
        Self::from_rows(rows)
    }

    pub fn rows(&self) -> &[AggregateRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact row for a key, if any.
    pub fn get(&self, carrier: &str, airport: &str, month: u32) -> Option<&AggregateRow> {
        self.index
            .get(&(carrier.to_string(), airport.to_string(), month))
            .map(|&i| &self.rows[i])
    }

    /// Column-wise mean of every numeric feature, labelled with the given key.
    pub fn mean_row(&self, carrier: &str, airport: &str, month: u32) -> AggregateRow {
        let n = self.rows.len().max(1) as f64;
        let mean = |f: fn(&AggregateRow) -> f64| self.rows.iter().map(f).sum::<f64>() / n;
        AggregateRow {
            carrier: carrier.to_string(),
            airport: airport.to_string(),
            month,
            weather_delay_proportion: mean(|r| r.weather_delay_proportion),
            weather_minute_proportion: mean(|r| r.weather_minute_proportion),
            total_flights: mean(|r| r.total_flights),
            weather_delay_count: mean(|r| r.weather_delay_count),
            total_delayed_flights: mean(|r| r.total_delayed_flights),
        }
    }

    /// Exact row when present, otherwise the column-wise mean row for the key.
    pub fn lookup(&self, carrier: &str, airport: &str, month: u32) -> (AggregateRow, DataSource) {
        match self.get(carrier, airport, month) {
            Some(row) => (row.clone(), DataSource::HistoricalMatch),
            None => (
                self.mean_row(carrier, airport, month),
                DataSource::GlobalFallback,
            ),
        }
    }

    /// Twelve monthly points for a route; months without data are zero.
    pub fn yearly_trend(&self, carrier: &str, airport: &str) -> Vec<TrendPoint> {
        (1..=12)
            .map(|month| match self.get(carrier, airport, month) {
                Some(row) => TrendPoint {
                    month,
                    risk_score: row.weather_delay_proportion,
                    flight_volume: row.total_flights as u64,
                },
                None => TrendPoint {
                    month,
                    risk_score: 0.0,
                    flight_volume: 0,
                },
            })
            .collect()
    }

    /// Up to `limit` other carriers at the same airport and month, lowest
    /// weather proportion first.
    pub fn competitors(&self, carrier: &str, airport: &str, month: u32, limit: usize) -> Vec<Competitor> {
        let mut rows: Vec<&AggregateRow> = self
            .rows
            .iter()
            .filter(|r| r.airport == airport && r.month == month && r.carrier != carrier)
            .collect();
        rows.sort_by(|a, b| {
            a.weather_delay_proportion
                .partial_cmp(&b.weather_delay_proportion)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.carrier.cmp(&b.carrier))
        });
        rows.into_iter()
            .take(limit)
            .map(|r| Competitor {
                carrier: r.carrier.clone(),
                risk_score: r.weather_delay_proportion,
                flight_volume: r.total_flights as u64,
            })
            .collect()
    }

    /// Linear-interpolated quantile of the weather delay proportion.
    pub fn proportion_quantile(&self, q: f64) -> f64 {
        let mut values: Vec<f64> = self.rows.iter().map(|r| r.weather_delay_proportion).collect();
        quantile(&mut values, q)
    }
}

/// Linear-interpolated quantile; `NaN` for an empty slice.
pub fn quantile(values: &mut [f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let pos = q.clamp(0.0, 1.0) * (values.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    values[lower] + (values[upper] - values[lower]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(carrier: &str, airport: &str, month: u32, delayed: f64, weather: f64, flights: f64) -> DelayCauseRecord {
        DelayCauseRecord {
            carrier: carrier.to_string(),
            airport: airport.to_string(),
            month,
            total_flights: flights,
            total_delayed_flights: delayed,
            weather_delay_count: weather,
            total_arrival_delay: 100.0,
            weather_delay_minutes: 10.0,
        }
    }

    fn table() -> AggregateTable {
        AggregateTable::from_records(&[
            record("9E", "ABE", 1, 10.0, 2.0, 100.0),
            record("9E", "ABE", 1, 10.0, 4.0, 200.0),
            record("AA", "ABE", 1, 10.0, 1.0, 80.0),
            record("DL", "ABE", 1, 10.0, 5.0, 90.0),
            record("UA", "ABE", 1, 10.0, 3.0, 70.0),
            record("OO", "ABE", 1, 10.0, 0.5, 60.0),
            record("9E", "ABE", 7, 10.0, 9.0, 120.5),
        ])
    }

    #[test]
    fn test_groups_are_averaged() {
        let t = table();
        assert_eq!(t.len(), 6);
        let row = t.get("9E", "ABE", 1).unwrap();
        assert!((row.weather_delay_proportion - 0.3).abs() < 1e-12);
        assert!((row.total_flights - 150.0).abs() < 1e-12);
        assert!((row.weather_minute_proportion - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_lookup_exact_match() {
        let t = table();
        let (row, source) = t.lookup("AA", "ABE", 1);
        assert_eq!(source, DataSource::HistoricalMatch);
        assert_eq!(row.carrier, "AA");
        assert!((row.weather_delay_proportion - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_lookup_falls_back_to_column_means() {
        let t = table();
        let (row, source) = t.lookup("ZZ", "XYZ", 4);
        assert_eq!(source, DataSource::GlobalFallback);
        assert_eq!(row.carrier, "ZZ");
        assert_eq!(row.airport, "XYZ");
        assert_eq!(row.month, 4);
        let expected_flights = (150.0 + 80.0 + 90.0 + 70.0 + 60.0 + 120.5) / 6.0;
        assert!((row.total_flights - expected_flights).abs() < 1e-9);
        let expected_prop = (0.3 + 0.1 + 0.5 + 0.3 + 0.05 + 0.9) / 6.0;
        assert!((row.weather_delay_proportion - expected_prop).abs() < 1e-9);
    }

    #[test]
    fn test_yearly_trend_has_twelve_months() {
        let trend = table().yearly_trend("9E", "ABE");
        assert_eq!(trend.len(), 12);
        assert_eq!(trend[0].month, 1);
        assert_eq!(trend[0].flight_volume, 150);
        assert_eq!(trend[6].flight_volume, 120);
        assert!((trend[6].risk_score - 0.9).abs() < 1e-12);
        assert_eq!(trend[1].flight_volume, 0);
        assert_eq!(trend[1].risk_score, 0.0);
    }

    #[test]
    fn test_competitors_sorted_and_limited() {
        let comps = table().competitors("9E", "ABE", 1, 3);
        let carriers: Vec<&str> = comps.iter().map(|c| c.carrier.as_str()).collect();
        assert_eq!(carriers, vec!["OO", "AA", "UA"]);
        assert!(comps.iter().all(|c| c.carrier != "9E"));
    }

    #[test]
    fn test_no_competitors() {
        assert!(table().competitors("9E", "ABE", 7, 3).is_empty());
    }

    #[test]
    fn test_quantile_interpolates() {
        let mut v = vec![4.0, 1.0, 3.0, 2.0];
        assert!((quantile(&mut v, 0.75) - 3.25).abs() < 1e-12);
        assert!(quantile(&mut [], 0.5).is_nan());
    }

    #[test]
    fn test_serde_rebuilds_index() {
        let t = table();
        let json = serde_json::to_string(&t).unwrap();
        let back: AggregateTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rows(), t.rows());
        assert!(back.get("DL", "ABE", 1).is_some());
    }
}
