//! Repository trait for the authoritative verification code store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::VerificationCode;
use crate::domain::value_objects::CodePurpose;
use crate::errors::DomainError;

/// Durable store of issued codes
///
/// Implementations must make `consume` atomic: of several concurrent calls
/// for the same record, exactly one may observe `true`.
///
/// # Security Considerations
/// - Records are never deleted while still valid, only marked used
/// - `lookup_valid` must compare codes in constant time
#[async_trait]
pub trait VerificationCodeRepository: Send + Sync {
    /// Mark every unused code for (identity, purpose) as used
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records retired
    async fn invalidate_prior(&self, identity: &str, purpose: CodePurpose) -> Result<usize, DomainError>;

    /// Persist a freshly issued code
    async fn save(&self, code: VerificationCode) -> Result<VerificationCode, DomainError>;

    /// Find an unused, unexpired record matching identity, code and purpose
    ///
    /// # Returns
    /// * `Ok(Some(VerificationCode))` - A record that `consume` may still win
    /// * `Ok(None)` - No match, or the match is used or expired
    async fn lookup_valid(
        &self,
        identity: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>, DomainError>;

    /// Conditionally flip `used` from false to true while unexpired at `now`
    ///
    /// # Returns
    /// * `Ok(true)` - This call consumed the record
    /// * `Ok(false)` - The record was already used, expired or does not exist
    async fn consume(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, DomainError>;

    /// Remove records that expired before `now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;
}
