use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::Result;
use crate::health::HealthChecker;
use crate::rate_limiter::RateLimiter;
use crate::response::{RateLimitResponse, ResetResponse, UsageResponse};
use crate::validation::RequestValidator;

/// Shared application state
pub type SharedState = Arc<AppState>;

/// Application state containing the rate limiter and per-client limit
pub struct AppState {
    pub rate_limiter: RateLimiter,
    pub api_rate_limit: u64,
    pub started_at: Instant,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            rate_limiter: RateLimiter::new(config.limiter_options())?,
            api_rate_limit: config.api_rate_limit,
            started_at: Instant::now(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub limit: Option<u64>,
}

/// Count a call against a token
pub async fn check_token(
    State(state): State<SharedState>,
    Path(token): Path<String>,
    payload: Option<Json<CheckRequest>>,
) -> Result<impl IntoResponse> {
    let token = RequestValidator::validate_token(&token)?;
    let Json(payload) = payload.unwrap_or_default();
    let limit = RequestValidator::validate_limit(payload.limit.unwrap_or(state.api_rate_limit))?;

    let status = state.rate_limiter.check(limit, &token)?;

    Ok(Json(RateLimitResponse::allowed(&token, status)))
}

/// Current usage of a token, without counting
pub async fn get_usage(
    State(state): State<SharedState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    let token = RequestValidator::validate_token(&token)?;
    let current = state.rate_limiter.usage(&token)?;

    Ok(Json(UsageResponse { token, current }))
}

/// Forget a token's usage
pub async fn reset_token(
    State(state): State<SharedState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    let token = RequestValidator::validate_token(&token)?;
    let was_tracked = state.rate_limiter.reset(&token)?;
    tracing::info!(token = %token, was_tracked, "Rate limit token reset");

    Ok(Json(ResetResponse::new(token, was_tracked)))
}

/// Health check endpoint
pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    let health = HealthChecker::new(&state.rate_limiter, state.started_at).check_health();
    let status = if health.status == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(health))
}

/// Readiness check endpoint
pub async fn readiness_check(State(state): State<SharedState>) -> impl IntoResponse {
    match state.rate_limiter.len() {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ready" })),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "not_ready", "error": err.to_string() })),
        ),
    }
}
