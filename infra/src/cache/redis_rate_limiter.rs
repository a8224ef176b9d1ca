//! Redis-backed fixed window rate limiter
//!
//! Shares its counters across processes. The window starts with the first
//! counted request and ends when the key expires.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::Script;
use std::sync::Arc;
use tracing::debug;

use dt_core::{DomainError, RateLimitDecision, RateLimiter};
use dt_shared::VerificationConfig;

use super::{hash_identity, RedisClient};

/// Returns {allowed, remaining_or_ttl}
///
/// KEYS[1] counter key, ARGV[1] limit, ARGV[2] window seconds
const CHECK_AND_INCREMENT: &str = r#"
local limit = tonumber(ARGV[1])
local current = tonumber(redis.call('GET', KEYS[1]) or '0')
if current >= limit then
    return {0, redis.call('TTL', KEYS[1])}
end
current = redis.call('INCR', KEYS[1])
if current == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[2])
end
return {1, limit - current}
"#;

pub struct RedisRateLimiter {
    client: Arc<RedisClient>,
    limit: u32,
    window_seconds: u64,
    script: Script,
}

impl RedisRateLimiter {
    pub fn new(client: Arc<RedisClient>, limit: u32, window_seconds: u64) -> Self {
        Self {
            client,
            limit,
            window_seconds,
            script: Script::new(CHECK_AND_INCREMENT),
        }
    }

    pub fn from_config(client: Arc<RedisClient>, config: &VerificationConfig) -> Self {
        Self::new(client, config.rate_limit_count, config.rate_limit_window_seconds)
    }

    fn counter_key(&self, identity: &str) -> String {
        self.client.key(&format!("rate_limit:{}", hash_identity(identity)))
    }
}

/// Map the script reply onto a decision
///
/// A negative TTL means the key lost its expiry or vanished between the
/// two calls; the full window is reported then.
fn decision_from_reply(allowed: i64, value: i64, window_seconds: u64) -> RateLimitDecision {
    if allowed == 1 {
        RateLimitDecision::Allowed {
            remaining: value.max(0) as u32,
        }
    } else {
        let retry_after_seconds = if value > 0 { value as u64 } else { window_seconds };
        RateLimitDecision::Denied { retry_after_seconds }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn allow(&self, identity: &str, _now: DateTime<Utc>) -> Result<RateLimitDecision, DomainError> {
        let key = self.counter_key(identity);
        let (allowed, value): (i64, i64) = self
            .client
            .run_script(
                &self.script,
                &[key],
                &[self.limit.to_string(), self.window_seconds.to_string()],
            )
            .await?;

        let decision = decision_from_reply(allowed, value, self.window_seconds);
        debug!(?decision, "Rate limit checked");
        Ok(decision)
    }

    async fn reset(&self, identity: &str) -> Result<(), DomainError> {
        self.client.delete(&self.counter_key(identity)).await?;
        Ok(())
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<usize, DomainError> {
        Ok(0)
    }
}
