//! End-to-end checks: train each bundle, persist it, reload it and query it.

use flight::{
    Bundle, DataSource, DelayCauseDataset, DelaySeverity, FlightInput, FlightQuery, FlightRecord,
    HeuristicInput, PriceQuery, RegressionBundle, RiskBundle, SeverityBundle,
};
use model::{ForestConfig, KnnConfig, SplitConfig};

/// Winter months at ORD see heavy weather delay, everything else is mild.
fn delay_cause_csv() -> String {
    let mut csv = String::from(
        "year,month,carrier,airport,Number of arriving flights,\
         Number of flights delayed by 15 minutes or more,\
         Weather count (delay due to weather),Total arrival delay,\
         Delay attributed to weather\n",
    );
    for year in [2022, 2023] {
        for month in 1..=12u32 {
            for (i, carrier) in ["AA", "DL", "UA"].iter().enumerate() {
                for airport in ["ATL", "ORD"] {
                    let flights = 100 + 20 * i as u32 + month;
                    let delayed = 20 + i as u32;
                    let winter = airport == "ORD" && (month <= 2 || month == 12);
                    let weather = if winter { 12 } else { 1 + (month % 2) };
                    let minutes = 40 * delayed;
                    let weather_minutes = weather * 30;
                    csv.push_str(&format!(
                        "{year},{month},{carrier},{airport},{flights},{delayed},{weather},{minutes},{weather_minutes}\n"
                    ));
                }
            }
        }
    }
    csv
}

fn flight_records() -> Vec<FlightRecord> {
    let airlines = ["Delta", "United", "American"];
    let statuses = ["On Time", "Delayed", "Cancelled"];
    let delays = [0.0, 10.0, 25.0, 45.0, 90.0, 0.0];
    (0..36)
        .map(|i| FlightRecord {
            airline: airlines[i % 3].to_string(),
            departure_airport: if i % 2 == 0 { "JFK" } else { "SFO" }.to_string(),
            arrival_airport: if i % 4 < 2 { "LAX" } else { "ORD" }.to_string(),
            flight_status: statuses[(i / 2) % 3].to_string(),
            departure_time: format!("{:02}/03/2024 {:02}:15", 1 + i % 28, 6 + i % 14),
            delay_minutes: delays[i % 6],
        })
        .collect()
}

#[test]
fn test_risk_bundle_train_save_load_assess() {
    let dataset = DelayCauseDataset::from_reader(delay_cause_csv().as_bytes()).unwrap();
    let config = ForestConfig::new(15, Some(6)).with_seed(7);
    let bundle = RiskBundle::train(&dataset, config).unwrap();
    assert_eq!(bundle.carriers, vec!["AA", "DL", "UA"]);
    assert_eq!(bundle.airports, vec!["ATL", "ORD"]);
    // 3 carriers * 2 airports * 12 months, years averaged together
    assert_eq!(bundle.table.len(), 72);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flight_model.json");
    bundle.save(&path).unwrap();
    let loaded = RiskBundle::load(&path).unwrap();

    let known = loaded
        .assess(&FlightQuery {
            year: Some(2024),
            month: 1,
            carrier: "aa".to_string(),
            airport: " ord".to_string(),
        })
        .unwrap();
    assert_eq!(known.data_source, DataSource::HistoricalMatch);
    assert_eq!(known.risk_level, "HIGH RISK");
    assert_eq!(known.risk_class, 1);
    assert!((known.confidence_high_risk + known.confidence_low_risk - 1.0).abs() < 1e-9);
    assert_eq!(known.trend_data.len(), 12);
    assert_eq!(known.competitors.len(), 2);
    assert!(known.competitors.iter().all(|c| c.carrier != "AA"));

    let unknown = loaded
        .assess(&FlightQuery {
            year: None,
            month: 6,
            carrier: "ZZ".to_string(),
            airport: "XXX".to_string(),
        })
        .unwrap();
    assert_eq!(unknown.data_source, DataSource::GlobalFallback);
    assert!(unknown.competitors.is_empty());
    assert_eq!(unknown.threshold, loaded.threshold);
}

#[test]
fn test_risk_bundle_rejects_bad_month() {
    let dataset = DelayCauseDataset::from_reader(delay_cause_csv().as_bytes()).unwrap();
    let bundle = RiskBundle::train(&dataset, ForestConfig::new(5, Some(4))).unwrap();
    let err = bundle
        .assess(&FlightQuery {
            year: None,
            month: 13,
            carrier: "AA".to_string(),
            airport: "ORD".to_string(),
        })
        .unwrap_err();
    assert!(err.is_client_error());
}

#[test]
fn test_severity_bundle_train_save_load_predict() {
    let records = flight_records();
    let bundle =
        SeverityBundle::train(&records, KnnConfig::new(3), SplitConfig::default()).unwrap();
    assert!((0.0..=1.0).contains(&bundle.holdout_accuracy));
    assert_eq!(bundle.feature_order.len(), 8);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("delay_severity_model.json");
    bundle.save(&path).unwrap();
    let loaded = SeverityBundle::load(&path).unwrap();

    let prediction = loaded.predict(&records[0].input()).unwrap();
    let names: Vec<&str> = prediction.probabilities.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Major", "Minor", "No Delay"]);
    let total: f64 = prediction.probabilities.values().sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!(prediction.probabilities.contains_key(&prediction.prediction));
}

#[test]
fn test_severity_unknown_label_is_client_error() {
    let bundle =
        SeverityBundle::train(&flight_records(), KnnConfig::new(3), SplitConfig::default())
            .unwrap();
    let err = bundle
        .predict(&FlightInput {
            airline: "Delta".to_string(),
            departure_airport: "JFK".to_string(),
            arrival_airport: "LAX".to_string(),
            flight_status: "Teleported".to_string(),
            departure_time: "2024-03-01T08:00:00".to_string(),
        })
        .unwrap_err();
    assert!(err.is_client_error());
}

#[test]
fn test_regression_bundle_round_trip() {
    let bundle = RegressionBundle::train().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("simple_model.json");
    bundle.save(&path).unwrap();

    let loaded = RegressionBundle::load(&path).unwrap();
    let query = PriceQuery {
        square_footage: 1500.0,
        bedrooms: 3.0,
    };
    let a = bundle.predict(&query).unwrap().prediction;
    let b = loaded.predict(&query).unwrap().prediction;
    assert!((a - b).abs() < 1e-6);
    assert!(RiskBundle::load(&path).is_err());
}

#[test]
fn test_heuristic_needs_no_bundle() {
    let result = HeuristicInput {
        carrier: "dl".to_string(),
        airport: "atl".to_string(),
        month: 12,
        weather_delay_count: 3.0,
        carrier_delay_count: 10.0,
        late_aircraft_count: 5.0,
        cancelled_flights: 0.0,
    }
    .assess()
    .unwrap();
    assert!(!result.high_weather_risk);
    assert_eq!(result.total_delay_minutes, 15.0);
    assert_eq!(result.delay_category, DelaySeverity::Minor);
}
