//! Store for codes whose delivery failed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::FallbackEntry;
use crate::domain::value_objects::CodePurpose;
use crate::errors::DomainError;

/// Short-lived key/value store keyed by (identity, purpose)
///
/// Storing a new entry replaces any previous entry for the same key.
/// `lookup_and_consume` must be an atomic compare-and-delete so that a
/// fallback code can be redeemed at most once.
#[async_trait]
pub trait FallbackStore: Send + Sync {
    /// Store an entry, replacing any existing one for its key
    ///
    /// `now` is the issuing clock's time; stores with native expiry derive
    /// the entry's lifetime from it.
    async fn store(&self, entry: FallbackEntry, now: DateTime<Utc>) -> Result<(), DomainError>;

    /// Delete the entry if it matches and is unexpired
    ///
    /// # Returns
    /// * `Ok(true)` - The entry matched and was removed by this call
    /// * `Ok(false)` - No entry, a different code, or an expired entry
    async fn lookup_and_consume(
        &self,
        identity: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Check for a matching, unexpired entry without removing it
    async fn peek(
        &self,
        identity: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Drop the entry for (identity, purpose), if any
    async fn discard(&self, identity: &str, purpose: CodePurpose) -> Result<bool, DomainError>;

    /// Remove entries that expired before `now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;
}
