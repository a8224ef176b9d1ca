//! Rate limiting trait used by the verification service

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::DomainError;

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// The request was counted against the window
    Allowed { remaining: u32 },
    /// The window is exhausted
    Denied { retry_after_seconds: u64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Bounds how often a new code may be issued for one identity
///
/// This is a best-effort abuse guard. Implementations may lose their
/// counters on restart.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count a request for `identity` if the current window allows it
    async fn allow(&self, identity: &str, now: DateTime<Utc>) -> Result<RateLimitDecision, DomainError>;

    /// Forget the window for `identity`
    async fn reset(&self, identity: &str) -> Result<(), DomainError>;

    /// Drop windows that ended before `now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;
}
