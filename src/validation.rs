use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ApiError, Result};

/// Longest token accepted on the HTTP surface
pub const MAX_TOKEN_LEN: usize = 128;

// Client ids are IPs (v4 or v6), API keys or e-mail-like user ids.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9@._:\-]+$").unwrap_or_else(|e| panic!("invalid token pattern: {e}"))
});

/// Request validation utilities
pub struct RequestValidator;

impl RequestValidator {
    /// Validates a rate limit token taken from a path or header
    pub fn validate_token(token: &str) -> Result<String> {
        let token = token.trim();

        if token.is_empty() {
            return Err(ApiError::Validation(
                "Rate limit token cannot be empty".to_string(),
            ));
        }

        if token.len() > MAX_TOKEN_LEN {
            return Err(ApiError::Validation(format!(
                "Rate limit token cannot be longer than {} characters",
                MAX_TOKEN_LEN
            )));
        }

        if !TOKEN_PATTERN.is_match(token) {
            return Err(ApiError::Validation(
                "Rate limit token contains invalid characters".to_string(),
            ));
        }

        Ok(token.to_string())
    }

    /// Validates a caller-supplied limit
    pub fn validate_limit(limit: u64) -> Result<u64> {
        if limit == 0 {
            return Err(ApiError::InvalidRequest(
                "Limit must be greater than 0".to_string(),
            ));
        }
        Ok(limit)
    }
}
