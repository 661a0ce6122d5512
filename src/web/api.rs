use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::analytics::compute_metrics;
use crate::error::YieldError;
use crate::forecast::{demo_forecast, forecast_with};
use crate::insights::stakeholder_insights;
use crate::types::{CounterInput, DerivedMetrics, ForecastResult};
use super::AppState;

// === Errors ===

#[derive(Debug)]
pub enum ApiError {
    Engine(YieldError),
    Timeout,
    Internal(String),
}

impl From<YieldError> for ApiError {
    fn from(e: YieldError) -> Self {
        ApiError::Engine(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Engine(e) if e.is_input_error() => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Engine(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "forecast timed out".to_string()),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(json!({"error": message}))).into_response()
    }
}

// === Health ===

pub async fn health_check() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

// === Calculator ===

#[derive(Debug, Deserialize)]
pub struct MetricsRequest {
    pub impressions: i64,
    pub clicks: i64,
    pub conversions: i64,
    pub cost: Decimal,
}

pub async fn post_metrics(
    Json(req): Json<MetricsRequest>,
) -> Result<Json<DerivedMetrics>, ApiError> {
    let input = CounterInput::from_raw(req.impressions, req.clicks, req.conversions, req.cost)?;
    let metrics = compute_metrics(&input)?;
    Ok(Json(metrics))
}

// === Forecast ===

#[derive(Debug, Default, Deserialize)]
pub struct ForecastRequest {
    /// Observed prices; the seeded demo history is used when absent
    pub history: Option<Vec<f64>>,
    /// Seed for the demo history; rejected together with `history`
    pub seed: Option<u64>,
    pub horizon: Option<usize>,
}

pub async fn get_demo_forecast(
    State(state): State<AppState>,
) -> Result<Json<ForecastResult>, ApiError> {
    let settings = state.config.forecast.clone();
    let result = run_fit(&state, move || demo_forecast(&settings)).await?;
    Ok(Json(result))
}

pub async fn post_forecast(
    State(state): State<AppState>,
    Json(req): Json<ForecastRequest>,
) -> Result<Json<ForecastResult>, ApiError> {
    let mut settings = state.config.forecast.clone();
    if let Some(horizon) = req.horizon {
        settings.horizon = horizon;
    }
    settings.check_horizon()?;
    if let Some(seed) = req.seed {
        if req.history.is_some() {
            return Err(YieldError::invalid_input("seed", "only applies to the demo history").into());
        }
        settings.seed = seed;
    }

    let result = match req.history {
        Some(history) => {
            info!("Forecasting {} supplied observations", history.len());
            run_fit(&state, move || forecast_with(&history, &settings)).await?
        }
        None => run_fit(&state, move || demo_forecast(&settings)).await?,
    };
    Ok(Json(result))
}

/// Model fitting is CPU-bound: run it off the async workers, bounded by the
/// configured request timeout
async fn run_fit<F>(state: &AppState, job: F) -> Result<ForecastResult, ApiError>
where
    F: FnOnce() -> crate::error::Result<ForecastResult> + Send + 'static,
{
    match tokio::time::timeout(state.request_timeout(), tokio::task::spawn_blocking(job)).await {
        Err(_) => {
            warn!("Forecast exceeded {:?}", state.request_timeout());
            Err(ApiError::Timeout)
        }
        Ok(Err(join_error)) => Err(ApiError::Internal(join_error.to_string())),
        Ok(Ok(result)) => result.map_err(ApiError::from),
    }
}

// === Insights ===

pub async fn get_insights() -> impl IntoResponse {
    Json(json!({"insights": stakeholder_insights()}))
}
