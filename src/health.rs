use serde::{Deserialize, Serialize};
use std::time::{Instant, SystemTime};

use crate::rate_limiter::{LimiterOptions, RateLimiter};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub limiter: LimiterStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LimiterStatus {
    pub status: String,
    pub tracked_tokens: usize,
    pub options: LimiterOptions,
    pub error: Option<String>,
}

pub struct HealthChecker<'a> {
    rate_limiter: &'a RateLimiter,
    started_at: Instant,
}

impl<'a> HealthChecker<'a> {
    pub fn new(rate_limiter: &'a RateLimiter, started_at: Instant) -> Self {
        Self {
            rate_limiter,
            started_at,
        }
    }

    pub fn check_health(&self) -> HealthStatus {
        let limiter = self.check_limiter();

        let overall_status = if limiter.status == "healthy" {
            "healthy"
        } else {
            "unhealthy"
        };

        HealthStatus {
            status: overall_status.to_string(),
            timestamp: SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.started_at.elapsed().as_secs(),
            limiter,
        }
    }

    fn check_limiter(&self) -> LimiterStatus {
        let options = self.rate_limiter.options().clone();

        match self.rate_limiter.len() {
            Ok(tracked_tokens) => LimiterStatus {
                status: "healthy".to_string(),
                tracked_tokens,
                options,
                error: None,
            },
            Err(err) => LimiterStatus {
                status: "unavailable".to_string(),
                tracked_tokens: 0,
                options,
                error: Some(err.to_string()),
            },
        }
    }
}
