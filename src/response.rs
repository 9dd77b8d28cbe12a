use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::time::Duration;

use crate::rate_limiter::RateLimitStatus;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Set the usage headers every gated response carries.
pub fn apply_rate_limit_headers(headers: &mut HeaderMap, limit: u64, remaining: u64) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
}

/// Whole seconds a rejected client should wait, never less than one.
pub fn retry_after_secs(interval: Duration) -> u64 {
    interval.as_millis().div_ceil(1000).max(1) as u64
}

#[derive(Debug, Serialize)]
pub struct RateLimitResponse {
    pub token: String,
    pub allowed: bool,
    pub limit: u64,
    pub current: u64,
    pub remaining: u64,
}

impl RateLimitResponse {
    pub fn allowed(token: &str, status: RateLimitStatus) -> Self {
        Self {
            token: token.to_string(),
            allowed: true,
            limit: status.limit,
            current: status.current,
            remaining: status.remaining,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub token: String,
    pub current: u64,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: String,
    pub token: String,
    pub was_tracked: bool,
}

impl ResetResponse {
    pub fn new(token: String, was_tracked: bool) -> Self {
        Self {
            status: "success".to_string(),
            token,
            was_tracked,
        }
    }
}
