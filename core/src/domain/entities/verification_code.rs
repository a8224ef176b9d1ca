//! Verification code entity for email verification and password reset.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::CodePurpose;

/// Default length of a verification code
pub const CODE_LENGTH: usize = 6;

/// One-time code bound to an identity and a purpose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    /// Unique identifier for the verification code
    pub id: Uuid,

    /// Normalized email address the code was issued for
    pub identity: String,

    /// The numeric code
    pub code: String,

    /// Namespace the code is valid in
    pub purpose: CodePurpose,

    /// Timestamp when the code was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp when the code expires
    pub expires_at: DateTime<Utc>,

    /// Whether the code has been consumed or superseded; never reset
    pub used: bool,
}

impl VerificationCode {
    /// Creates a new unused code expiring `ttl` after `issued_at`
    ///
    /// An expiry past the representable range saturates at the maximum
    /// timestamp; callers that need to reject such a lifetime use
    /// [`VerificationCode::expiry_for`] first.
    ///
    /// # Arguments
    ///
    /// * `identity` - Normalized email address
    /// * `purpose` - Namespace of the code
    /// * `code` - Generated code value
    /// * `issued_at` - Issue timestamp from the service clock
    /// * `ttl` - Purpose-specific lifetime
    pub fn issue(
        identity: impl Into<String>,
        purpose: CodePurpose,
        code: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity: identity.into(),
            code: code.into(),
            purpose,
            issued_at,
            expires_at: Self::expiry_for(issued_at, ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
            used: false,
        }
    }

    /// Expiry of a code issued at `issued_at`, `None` on overflow
    pub fn expiry_for(issued_at: DateTime<Utc>, ttl: Duration) -> Option<DateTime<Utc>> {
        issued_at.checked_add_signed(ttl)
    }

    /// Checks if the code has expired at `now`
    ///
    /// Expiry is inclusive: a code expiring exactly at `now` is expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Checks if the code is unused and unexpired at `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.used && !self.is_expired_at(now)
    }

    /// Compares the candidate against the stored code in constant time
    pub fn matches(&self, candidate: &str) -> bool {
        self.code.len() == candidate.len()
            && constant_time_eq(self.code.as_bytes(), candidate.as_bytes())
    }

    /// Checks if the code authorises `candidate` for `identity` and `purpose` at `now`
    pub fn accepts(&self, identity: &str, candidate: &str, purpose: CodePurpose, now: DateTime<Utc>) -> bool {
        self.identity == identity
            && self.purpose == purpose
            && self.is_valid_at(now)
            && self.matches(candidate)
    }

    /// Gets the time remaining until expiration, or zero if expired
    pub fn time_until_expiration(&self, now: DateTime<Utc>) -> Duration {
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }

    /// Marks the verification code as used
    pub fn mark_as_used(&mut self) {
        self.used = true;
    }
}
