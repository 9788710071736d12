//! Router tests driven through `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use flight::{
    Bundle, DelayCauseDataset, FlightRecord, RegressionBundle, RiskBundle, SeverityBundle,
};
use model::{ForestConfig, KnnConfig, SplitConfig};
use serde_json::{json, Value};
use server::{router, AppState};
use std::sync::Arc;
use tower::ServiceExt;

const DELAY_CAUSE_CSV: &str = "\
year,month,carrier,airport,Number of arriving flights,Number of flights delayed by 15 minutes or more,Weather count (delay due to weather),Total arrival delay,Delay attributed to weather
2023,1,AA,ORD,120,30,12,1500,600
2023,1,DL,ORD,90,20,1,900,30
2023,1,UA,ORD,150,25,2,1100,60
2023,2,AA,ORD,110,28,10,1400,500
2023,2,DL,ORD,95,18,1,800,20
2023,7,AA,ATL,200,40,1,1600,40
2023,7,DL,ATL,210,35,2,1500,70
2023,7,UA,ATL,180,30,1,1200,30
";

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn risk_state() -> AppState {
    let dataset = DelayCauseDataset::from_reader(DELAY_CAUSE_CSV.as_bytes()).unwrap();
    let bundle = RiskBundle::train(&dataset, ForestConfig::new(10, Some(4))).unwrap();
    AppState {
        risk: Some(Arc::new(bundle)),
        ..AppState::default()
    }
}

fn severity_state() -> AppState {
    let airlines = ["Delta", "United", "American"];
    let statuses = ["On Time", "Delayed", "Cancelled"];
    let delays = [0.0, 12.0, 55.0];
    let records: Vec<FlightRecord> = (0..30)
        .map(|i| FlightRecord {
            airline: airlines[i % 3].to_string(),
            departure_airport: if i % 2 == 0 { "JFK" } else { "SFO" }.to_string(),
            arrival_airport: "LAX".to_string(),
            flight_status: statuses[(i / 3) % 3].to_string(),
            departure_time: format!("{:02}/04/2024 {:02}:30", 1 + i % 28, 5 + i % 15),
            delay_minutes: delays[i % 3],
        })
        .collect();
    let bundle = SeverityBundle::train(&records, KnnConfig::new(3), SplitConfig::default()).unwrap();
    AppState {
        severity: Some(Arc::new(bundle)),
        ..AppState::default()
    }
}

fn severity_body(status: &str, departure_time: &str) -> Value {
    json!({
        "Airline": "Delta",
        "Departure_Airport": "JFK",
        "Arrival_Airport": "LAX",
        "Flight_Status": status,
        "Departure_Time": departure_time
    })
}

fn heuristic_body(month: i64) -> Value {
    json!({
        "carrier": " aa ",
        "airport": "ord",
        "month": month,
        "weather_delay_count": 15,
        "carrier_delay_count": 5,
        "late_aircraft_count": 3,
        "cancelled_flights": 1
    })
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(AppState::default(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());

    let (status, body) = send(AppState::default(), get("/health/live")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_readiness_without_bundles() {
    let (status, body) = send(AppState::default(), get("/health/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["models"]["risk"], false);
}

#[tokio::test]
async fn test_root_reports_missing_model() {
    let (status, body) = send(AppState::default(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["status"].as_str().unwrap().contains("NOT LOADED"));
}

#[tokio::test]
async fn test_endpoints_unavailable_without_bundles() {
    let requests = vec![
        get("/options"),
        post(
            "/predict",
            json!({"year": 2024, "month": 1, "carrier": "AA", "airport": "ORD"}),
        ),
        post(
            "/predict/severity",
            json!({
                "Airline": "Delta",
                "Departure_Airport": "JFK",
                "Arrival_Airport": "LAX",
                "Flight_Status": "On Time",
                "Departure_Time": "2024-03-01T08:00:00"
            }),
        ),
        post(
            "/predict/regression",
            json!({"square_footage": 1500, "bedrooms": 3}),
        ),
    ];
    for request in requests {
        let (status, body) = send(AppState::default(), request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "Model not loaded.");
    }
}

#[tokio::test]
async fn test_heuristic_prediction() {
    let (status, body) = send(
        AppState::default(),
        post("/predict/heuristic", heuristic_body(7)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["high_weather_risk"], true);
    assert_eq!(body["total_delay_minutes"], 38.0);
    assert_eq!(body["delay_category"], "Major");
}

#[tokio::test]
async fn test_heuristic_validation_error() {
    let (status, body) = send(
        AppState::default(),
        post("/predict/heuristic", heuristic_body(13)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("month"));
}

#[tokio::test]
async fn test_risk_prediction_and_options() {
    let state = risk_state();

    let (status, body) = send(state.clone(), get("/options")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["carriers"], json!(["AA", "DL", "UA"]));
    assert_eq!(body["airports"], json!(["ATL", "ORD"]));

    let (status, body) = send(
        state.clone(),
        post(
            "/predict",
            json!({"year": 2024, "month": 1, "carrier": "AA", "airport": "ORD"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data_source"], "Historical Match");
    assert_eq!(body["trend_data"].as_array().unwrap().len(), 12);
    let competitors = body["competitors"].as_array().unwrap();
    assert_eq!(competitors.len(), 2);
    assert_eq!(competitors[0]["carrier"], "DL");

    let (status, body) = send(
        state,
        post(
            "/predict",
            json!({"month": 5, "carrier": "ZZ", "airport": "XXX"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data_source"], "Global Fallback");
}

#[tokio::test]
async fn test_regression_from_saved_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("simple_model.json");
    RegressionBundle::train().unwrap().save(&path).unwrap();

    let state = AppState {
        regression: Some(Arc::new(RegressionBundle::load(&path).unwrap())),
        ..AppState::default()
    };
    let (status, body) = send(
        state.clone(),
        post(
            "/predict/regression",
            json!({"square_footage": 1700, "bedrooms": 3}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let price = body["prediction"].as_f64().unwrap();
    assert!(price > 300000.0 && price < 400000.0);

    let (status, _) = send(state, get("/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rejected_body_uses_detail_envelope() {
    let (status, body) = send(
        AppState::default(),
        post("/predict/heuristic", heuristic_body(-1)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("month"));

    let mut with_null = heuristic_body(6);
    with_null["weather_delay_count"] = Value::Null;
    let (status, body) = send(AppState::default(), post("/predict/heuristic", with_null)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_malformed_json_uses_detail_envelope() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict/regression")
        .header("content-type", "application/json")
        .body(Body::from("{\"square_footage\": 1500,"))
        .unwrap();
    let (status, body) = send(AppState::default(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_severity_prediction() {
    let (status, body) = send(
        severity_state(),
        post("/predict/severity", severity_body("On Time", "2024-04-03T07:30:00")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let probabilities = body["probabilities"].as_object().unwrap();
    assert_eq!(probabilities.len(), 3);
    let total: f64 = probabilities.values().map(|p| p.as_f64().unwrap()).sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!(probabilities.contains_key(body["prediction"].as_str().unwrap()));
}

#[tokio::test]
async fn test_severity_errors_are_bad_requests() {
    let state = severity_state();

    let (status, body) = send(
        state.clone(),
        post("/predict/severity", severity_body("Teleported", "2024-04-03T07:30:00")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("Teleported"));

    let (status, body) = send(state, post("/predict/severity", severity_body("On Time", "soon"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid departure time: 'soon'");
}
