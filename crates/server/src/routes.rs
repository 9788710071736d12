//! API route handlers

use crate::error::{ApiError, ApiJson};
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use flight::{
    FlightInput, FlightQuery, HeuristicAssessment, HeuristicInput, PricePrediction, PriceQuery,
    RiskAssessment, SeverityPrediction,
};
use serde::Serialize;
use serde_json::{json, Value};

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub carriers: Vec<String>,
    pub airports: Vec<String>,
}

/// Status line saying whether the risk model is available.
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let status = if state.risk.is_some() {
        "Flight Risk API is running and Model is Loaded"
    } else {
        "API running, but MODEL NOT LOADED. Run skydelay train-risk first."
    };
    Json(json!({ "status": status }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "detail": "skydelay API is running",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Liveness probe - is the server running?
pub async fn liveness() -> Json<Value> {
    Json(json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe - is at least one bundle loaded?
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let (status, label) = if state.any_loaded() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready")
    };
    (
        status,
        Json(json!({
            "status": label,
            "version": env!("CARGO_PKG_VERSION"),
            "models": {
                "risk": state.risk.is_some(),
                "severity": state.severity.is_some(),
                "regression": state.regression.is_some()
            }
        })),
    )
}

/// Carrier and airport codes known to the risk model.
pub async fn options(State(state): State<AppState>) -> ApiResult<OptionsResponse> {
    let risk = state.risk.as_ref().ok_or_else(ApiError::not_loaded)?;
    if risk.carriers.is_empty() {
        return Err(ApiError::not_loaded());
    }
    Ok(Json(OptionsResponse {
        carriers: risk.carriers.clone(),
        airports: risk.airports.clone(),
    }))
}

pub async fn predict_risk(
    State(state): State<AppState>,
    ApiJson(query): ApiJson<FlightQuery>,
) -> ApiResult<RiskAssessment> {
    let risk = state.risk.as_ref().ok_or_else(ApiError::not_loaded)?;
    risk.assess(&query)
        .map(Json)
        .map_err(ApiError::from_prediction)
}

pub async fn predict_severity(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<FlightInput>,
) -> ApiResult<SeverityPrediction> {
    let severity = state.severity.as_ref().ok_or_else(ApiError::not_loaded)?;
    severity
        .predict(&input)
        .map(Json)
        .map_err(ApiError::bad_request)
}

pub async fn predict_heuristic(
    ApiJson(input): ApiJson<HeuristicInput>,
) -> ApiResult<HeuristicAssessment> {
    input.assess().map(Json).map_err(ApiError::from_prediction)
}

pub async fn predict_regression(
    State(state): State<AppState>,
    ApiJson(query): ApiJson<PriceQuery>,
) -> ApiResult<PricePrediction> {
    let regression = state.regression.as_ref().ok_or_else(ApiError::not_loaded)?;
    regression
        .predict(&query)
        .map(Json)
        .map_err(ApiError::from_prediction)
}
