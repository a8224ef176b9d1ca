//! Fallback copy of a code whose delivery failed.

use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::CodePurpose;

/// Short-lived, non-authoritative copy of a code that could not be delivered
///
/// Created only when the notifier fails; deleted on the first successful match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackEntry {
    pub identity: String,
    pub code: String,
    pub purpose: CodePurpose,
    pub expires_at: DateTime<Utc>,
}

impl FallbackEntry {
    pub fn new(
        identity: impl Into<String>,
        code: impl Into<String>,
        purpose: CodePurpose,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            identity: identity.into(),
            code: code.into(),
            purpose,
            expires_at,
        }
    }

    /// Store key: entries are unique per (identity, purpose)
    pub fn key(&self) -> (String, CodePurpose) {
        (self.identity.clone(), self.purpose)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Unexpired and the candidate matches in constant time
    pub fn accepts(&self, candidate: &str, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now)
            && self.code.len() == candidate.len()
            && constant_time_eq(self.code.as_bytes(), candidate.as_bytes())
    }
}
