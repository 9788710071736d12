//! # server
//!
//! REST API serving the skydelay model bundles.
//!
//! Bundles are read from disk once at startup and shared read-only across
//! handlers. A bundle that cannot be loaded is logged and left out; its
//! endpoints answer 503 while the rest of the API keeps working.

use axum::{
    routing::{get, post},
    Router,
};
use flight::{Bundle, RegressionBundle, RiskBundle, SeverityBundle};
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod error;
pub mod routes;

pub use error::{ApiError, ApiJson, ServerError};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "skydelay=info,server=info,flight=info,model_core=info,tower_http=info";

/// Application state shared across handlers
#[derive(Clone, Default)]
pub struct AppState {
    pub risk: Option<Arc<RiskBundle>>,
    pub severity: Option<Arc<SeverityBundle>>,
    pub regression: Option<Arc<RegressionBundle>>,
}

impl AppState {
    /// Load every bundle named in `config`, skipping the ones that fail.
    pub fn load(config: &ServerConfig) -> Self {
        Self {
            risk: load_bundle(&config.risk_model_path),
            severity: load_bundle(&config.severity_model_path),
            regression: load_bundle(&config.regression_model_path),
        }
    }

    pub fn any_loaded(&self) -> bool {
        self.risk.is_some() || self.severity.is_some() || self.regression.is_some()
    }
}

fn load_bundle<B: Bundle>(path: &Path) -> Option<Arc<B>> {
    match B::load(path) {
        Ok(bundle) => Some(Arc::new(bundle)),
        Err(err) => {
            tracing::warn!(
                kind = B::KIND,
                path = %path.display(),
                error = %err,
                "model bundle not loaded"
            );
            None
        }
    }
}

/// Server configuration from environment
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub risk_model_path: PathBuf,
    pub severity_model_path: PathBuf,
    pub regression_model_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            risk_model_path: PathBuf::from("flight_model.json"),
            severity_model_path: PathBuf::from("delay_severity_model.json"),
            regression_model_path: PathBuf::from("simple_model.json"),
        }
    }
}

impl ServerConfig {
    /// Read `HOST`, `PORT` and the `*_MODEL_PATH` variables over the defaults.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let defaults = Self::default();
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ServerError::InvalidPort(raw.clone()))?,
            None => defaults.port,
        };
        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            risk_model_path: lookup("RISK_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.risk_model_path),
            severity_model_path: lookup("SEVERITY_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.severity_model_path),
            regression_model_path: lookup("REGRESSION_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.regression_model_path),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", self.host, self.port)))
    }
}

/// Install the global tracing subscriber.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();
}

/// Build the router with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::root))
        // Health endpoints (Kubernetes-compatible)
        .route("/health", get(routes::health))
        .route("/health/live", get(routes::liveness))
        .route("/health/ready", get(routes::readiness))
        // API endpoints
        .route("/options", get(routes::options))
        .route("/predict", post(routes::predict_risk))
        .route("/predict/severity", post(routes::predict_severity))
        .route("/predict/heuristic", post(routes::predict_heuristic))
        .route("/predict/regression", post(routes::predict_regression))
        // Middleware layers
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Load bundles, bind and serve until the process exits.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let addr = config.socket_addr()?;
    let state = AppState::load(&config);
    if !state.any_loaded() {
        tracing::warn!("no model bundles loaded; prediction endpoints will answer 503");
    }

    tracing::info!("skydelay-server v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}
