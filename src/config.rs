use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use validator::Validate;

use crate::error::{ApiError, Result};
use crate::rate_limiter::{LimiterOptions, DEFAULT_INTERVAL, DEFAULT_UNIQUE_TOKENS};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_API_RATE_LIMIT: u64 = 10;

#[derive(Debug, Clone, Validate)]
pub struct Config {
    /// Server bind address
    pub bind_addr: SocketAddr,

    /// Log level for the `ecogym` target
    pub log_level: String,

    /// Maximum distinct client tokens tracked by the limiter
    #[validate(range(min = 1))]
    pub unique_token_per_interval: usize,

    /// Rate limit window in milliseconds
    #[validate(range(min = 1))]
    pub interval_ms: u64,

    /// Requests allowed per client per window on `/api` routes
    #[validate(range(min = 1))]
    pub api_rate_limit: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            unique_token_per_interval: DEFAULT_UNIQUE_TOKENS,
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
            api_rate_limit: DEFAULT_API_RATE_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            bind_addr: parse_var(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            unique_token_per_interval: parse_var(
                &lookup,
                "RATE_LIMIT_UNIQUE_TOKENS",
                &DEFAULT_UNIQUE_TOKENS.to_string(),
            )?,
            interval_ms: parse_var(
                &lookup,
                "RATE_LIMIT_INTERVAL_MS",
                &DEFAULT_INTERVAL.as_millis().to_string(),
            )?,
            api_rate_limit: parse_var(
                &lookup,
                "API_RATE_LIMIT",
                &DEFAULT_API_RATE_LIMIT.to_string(),
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Options for the shared rate limiter
    pub fn limiter_options(&self) -> LimiterOptions {
        LimiterOptions {
            unique_token_per_interval: self.unique_token_per_interval,
            interval: Duration::from_millis(self.interval_ms),
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .map_err(|e| ApiError::Configuration(format!("Invalid {}={:?}: {}", key, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.limiter_options(), LimiterOptions::default());
        assert_eq!(config.api_rate_limit, 10);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("RATE_LIMIT_UNIQUE_TOKENS", "25"),
            ("RATE_LIMIT_INTERVAL_MS", "1500"),
            ("API_RATE_LIMIT", " 3 "),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.limiter_options().unique_token_per_interval, 25);
        assert_eq!(
            config.limiter_options().interval,
            Duration::from_millis(1500)
        );
        assert_eq!(config.api_rate_limit, 3);
    }

    #[test]
    fn test_unparseable_value() {
        let err = Config::from_lookup(lookup(&[("BIND_ADDR", "localhost")])).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let err = Config::from_lookup(lookup(&[("API_RATE_LIMIT", "0")])).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
