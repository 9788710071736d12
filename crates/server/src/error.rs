//! Error types for the HTTP layer.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use flight::FlightError;
use thiserror::Error;

/// Startup and configuration failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("PORT must be a valid number, got '{0}'")]
    InvalidPort(String),

    #[error("Invalid HOST:PORT configuration: {0}")]
    InvalidAddress(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// `Json` extractor whose rejections use the `{"detail": ...}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Request failure rendered as `{"detail": ...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// 503 for an endpoint whose bundle failed to load.
    pub fn not_loaded() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "Model not loaded.")
    }

    /// 400 for every failure, whatever its cause.
    pub fn bad_request(err: FlightError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err.to_string())
    }

    /// 422 for invalid input, 500 for anything else.
    pub fn from_prediction(err: FlightError) -> Self {
        if err.is_client_error() {
            Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        } else {
            tracing::error!(error = %err, "prediction failed");
            Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Prediction failed: {err}"),
            )
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}
