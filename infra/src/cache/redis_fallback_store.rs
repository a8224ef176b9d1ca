//! Redis-backed fallback store
//!
//! Entries are stored as JSON under `fallback:{purpose}:{sha256(identity)}`
//! with a Redis TTL matching the entry's expiry. Consumption is a Lua
//! compare-and-delete so two concurrent redemptions cannot both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::Script;
use std::sync::Arc;
use tracing::{debug, warn};

use dt_core::{CodePurpose, DomainError, FallbackEntry, FallbackStore};

use super::{hash_identity, RedisClient};

/// Deletes KEYS[1] only if it still holds ARGV[1]
const COMPARE_AND_DELETE: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
"#;

pub struct RedisFallbackStore {
    client: Arc<RedisClient>,
    compare_and_delete: Script,
}

impl RedisFallbackStore {
    pub fn new(client: Arc<RedisClient>) -> Self {
        Self {
            client,
            compare_and_delete: Script::new(COMPARE_AND_DELETE),
        }
    }

    fn entry_key(&self, identity: &str, purpose: CodePurpose) -> String {
        self.client
            .key(&format!("fallback:{}:{}", purpose.as_str(), hash_identity(identity)))
    }

    async fn load(&self, key: &str) -> Result<Option<(String, FallbackEntry)>, DomainError> {
        let Some(raw) = self.client.get(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<FallbackEntry>(&raw) {
            Ok(entry) => Ok(Some((raw, entry))),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding unreadable fallback entry");
                self.client.delete(key).await?;
                Ok(None)
            }
        }
    }
}

/// Seconds until `expires_at`, rounded up and never below one
fn ttl_seconds(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (expires_at - now).num_milliseconds();
    if millis <= 0 {
        1
    } else {
        ((millis as u64) + 999) / 1000
    }
}

#[async_trait]
impl FallbackStore for RedisFallbackStore {
    async fn store(&self, entry: FallbackEntry, now: DateTime<Utc>) -> Result<(), DomainError> {
        let key = self.entry_key(&entry.identity, entry.purpose);
        let value = serde_json::to_string(&entry)
            .map_err(|e| DomainError::storage(format!("Failed to serialize fallback entry: {}", e)))?;

        self.client
            .set_with_expiry(&key, &value, ttl_seconds(entry.expires_at, now))
            .await?;

        debug!(purpose = %entry.purpose, "Stored fallback entry");
        Ok(())
    }

    async fn lookup_and_consume(
        &self,
        identity: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let key = self.entry_key(identity, purpose);
        let Some((raw, entry)) = self.load(&key).await? else {
            return Ok(false);
        };

        if !entry.accepts(code, now) {
            return Ok(false);
        }

        let deleted: i64 = self
            .client
            .run_script(&self.compare_and_delete, &[key], &[raw])
            .await?;

        Ok(deleted > 0)
    }

    async fn peek(
        &self,
        identity: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let key = self.entry_key(identity, purpose);
        Ok(self
            .load(&key)
            .await?
            .map(|(_, entry)| entry.accepts(code, now))
            .unwrap_or(false))
    }

    async fn discard(&self, identity: &str, purpose: CodePurpose) -> Result<bool, DomainError> {
        let key = self.entry_key(identity, purpose);
        Ok(self.client.delete(&key).await?)
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<usize, DomainError> {
        // Redis expires the keys itself
        Ok(0)
    }
}
