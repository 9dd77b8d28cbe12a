//! Fixed-window request counting per client token.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{ApiError, Result};

pub const DEFAULT_UNIQUE_TOKENS: usize = 500;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(60_000);

/// Construction-time options for a [`RateLimiter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LimiterOptions {
    /// Maximum number of distinct tokens tracked at once
    #[validate(range(min = 1))]
    #[serde(default = "default_unique_tokens")]
    pub unique_token_per_interval: usize,
    /// Time-to-live of a token's counter
    #[validate(custom(function = validate_interval))]
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for LimiterOptions {
    fn default() -> Self {
        Self {
            unique_token_per_interval: DEFAULT_UNIQUE_TOKENS,
            interval: DEFAULT_INTERVAL,
        }
    }
}

fn default_unique_tokens() -> usize {
    DEFAULT_UNIQUE_TOKENS
}

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

fn validate_interval(interval: &Duration) -> std::result::Result<(), ValidationError> {
    if interval.is_zero() {
        return Err(ValidationError::new("interval_must_be_positive"));
    }
    Ok(())
}

/// Usage of a token after a successful check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    pub limit: u64,
    pub current: u64,
    pub remaining: u64,
}

#[derive(Debug)]
struct TokenEntry {
    count: u64,
    written_at: Instant,
    last_used: u64,
}

/// LRU map of token counters. `recency` orders tokens by their last access tick.
#[derive(Debug)]
struct TokenCache {
    entries: HashMap<String, TokenEntry>,
    recency: BTreeMap<u64, String>,
    tick: u64,
    capacity: usize,
    ttl: Duration,
}

impl TokenCache {
    fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            tick: 0,
            capacity,
            ttl,
        }
    }

    fn is_expired(&self, entry: &TokenEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.written_at) >= self.ttl
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn remove(&mut self, token: &str) -> bool {
        match self.entries.remove(token) {
            Some(entry) => {
                self.recency.remove(&entry.last_used);
                true
            }
            None => false,
        }
    }

    /// Drop the entry for `token` if its window has elapsed.
    fn expire(&mut self, token: &str, now: Instant) {
        let expired = self
            .entries
            .get(token)
            .is_some_and(|entry| self.is_expired(entry, now));
        if expired {
            self.remove(token);
        }
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| self.is_expired(entry, now))
            .map(|(token, _)| token.clone())
            .collect();

        for token in &expired {
            self.remove(token);
        }
        expired.len()
    }

    fn evict_least_recent(&mut self) -> Option<String> {
        let (_, token) = self.recency.pop_first()?;
        self.entries.remove(&token);
        Some(token)
    }

    /// Count one use of `token` and return the new count.
    fn increment(&mut self, token: &str, now: Instant) -> u64 {
        self.expire(token, now);

        if !self.entries.contains_key(token) {
            if self.entries.len() >= self.capacity {
                self.purge_expired(now);
            }
            while self.entries.len() >= self.capacity {
                match self.evict_least_recent() {
                    Some(evicted) => tracing::debug!(token = %evicted, "Evicted least recently used token"),
                    None => break,
                }
            }
            self.entries.insert(
                token.to_string(),
                TokenEntry {
                    count: 0,
                    written_at: now,
                    last_used: 0,
                },
            );
        }

        let tick = self.next_tick();
        let Some(entry) = self.entries.get_mut(token) else {
            return 0;
        };
        self.recency.remove(&entry.last_used);
        entry.last_used = tick;
        entry.count += 1;
        self.recency.insert(tick, token.to_string());
        entry.count
    }

    fn count(&self, token: &str, now: Instant) -> u64 {
        self.entries
            .get(token)
            .filter(|entry| !self.is_expired(entry, now))
            .map(|entry| entry.count)
            .unwrap_or(0)
    }
}

/// Shared, lock-guarded rate limiter. Cloning yields a handle to the same cache.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    options: LimiterOptions,
    cache: Arc<Mutex<TokenCache>>,
}

impl RateLimiter {
    pub fn new(options: LimiterOptions) -> Result<Self> {
        options.validate()?;

        let cache = TokenCache::new(options.unique_token_per_interval, options.interval);
        Ok(Self {
            options,
            cache: Arc::new(Mutex::new(cache)),
        })
    }

    pub fn options(&self) -> &LimiterOptions {
        &self.options
    }

    fn lock(&self) -> Result<MutexGuard<'_, TokenCache>> {
        self.cache
            .lock()
            .map_err(|_| ApiError::Internal("Failed to acquire lock on token cache".to_string()))
    }

    /// Count a call for `token` and compare it against `limit`.
    ///
    /// The first `limit` calls in a window succeed. Every later call is
    /// rejected with [`ApiError::RateLimitExceeded`] and still counted.
    pub fn check(&self, limit: u64, token: &str) -> Result<RateLimitStatus> {
        self.check_at(limit, token, Instant::now())
    }

    /// [`RateLimiter::check`] against an explicit clock reading.
    pub fn check_at(&self, limit: u64, token: &str, now: Instant) -> Result<RateLimitStatus> {
        let current = {
            let mut cache = self.lock()?;
            cache.increment(token, now)
        };

        if current > limit {
            tracing::debug!(token, limit, current, "Rate limit exceeded");
            return Err(ApiError::RateLimitExceeded { limit });
        }

        Ok(RateLimitStatus {
            limit,
            current,
            remaining: limit - current,
        })
    }

    /// Calls counted for `token` in its current window, without counting this one.
    pub fn usage(&self, token: &str) -> Result<u64> {
        self.usage_at(token, Instant::now())
    }

    pub fn usage_at(&self, token: &str, now: Instant) -> Result<u64> {
        Ok(self.lock()?.count(token, now))
    }

    /// Forget a token. Returns whether it was tracked.
    pub fn reset(&self, token: &str) -> Result<bool> {
        Ok(self.lock()?.remove(token))
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> Result<usize> {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> Result<usize> {
        Ok(self.lock()?.purge_expired(now))
    }

    /// Number of tokens currently held, expired or not.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
