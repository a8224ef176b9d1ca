//! In-process fixed-window rate limiter

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::errors::DomainError;

use super::traits::{RateLimitDecision, RateLimiter};

/// Request counter for one identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitWindow {
    pub count: u32,
    pub window_start: DateTime<Utc>,
}

impl RateLimitWindow {
    fn start(now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }

    /// A window is over once strictly more than `duration` has elapsed
    pub fn is_expired(&self, now: DateTime<Utc>, duration: Duration) -> bool {
        now - self.window_start > duration
    }

    fn retry_after(&self, now: DateTime<Utc>, duration: Duration) -> u64 {
        let remaining = (self.window_start + duration - now).num_seconds();
        // Denial lasts until the window has strictly passed
        (remaining + 1).max(1) as u64
    }
}

/// Fixed-window limiter keyed by identity
///
/// Single-process only: counters live in a `HashMap` behind a tokio mutex.
#[derive(Clone)]
pub struct InMemoryRateLimiter {
    limit: u32,
    window: Duration,
    windows: Arc<Mutex<HashMap<String, RateLimitWindow>>>,
}

impl InMemoryRateLimiter {
    pub fn new(limit: u32, window_seconds: u64) -> Self {
        Self {
            limit,
            window: Duration::seconds(window_seconds as i64),
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn from_config(config: &dt_shared::VerificationConfig) -> Self {
        Self::new(config.rate_limit_count, config.rate_limit_window_seconds)
    }

    /// Current window for `identity`, if one exists
    pub async fn window(&self, identity: &str) -> Option<RateLimitWindow> {
        self.windows.lock().await.get(identity).copied()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn allow(&self, identity: &str, now: DateTime<Utc>) -> Result<RateLimitDecision, DomainError> {
        let mut windows = self.windows.lock().await;

        let window = windows
            .entry(identity.to_string())
            .or_insert_with(|| RateLimitWindow::start(now));

        if window.is_expired(now, self.window) {
            *window = RateLimitWindow::start(now);
        }

        if window.count < self.limit {
            window.count += 1;
            Ok(RateLimitDecision::Allowed {
                remaining: self.limit - window.count,
            })
        } else {
            Ok(RateLimitDecision::Denied {
                retry_after_seconds: window.retry_after(now, self.window),
            })
        }
    }

    async fn reset(&self, identity: &str) -> Result<(), DomainError> {
        self.windows.lock().await.remove(identity);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        let duration = self.window;
        windows.retain(|_, window| !window.is_expired(now, duration));
        Ok(before - windows.len())
    }
}
