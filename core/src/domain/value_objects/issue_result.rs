//! Outcome of issuing a one-time code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a successful `issue` call
///
/// Delivery problems never fail `issue`; they are described here instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueResult {
    /// The notifier confirmed the transport attempt
    pub delivered: bool,

    /// Delivery failed and the code was moved to fallback storage
    pub used_fallback: bool,

    /// Delivery was handed to a background task and has not completed yet
    pub pending: bool,

    /// When the issued code stops being valid
    pub expires_at: DateTime<Utc>,

    /// Raw code, only when fallback was used and exposure is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposed_code: Option<String>,
}

impl IssueResult {
    /// Code reached the notifier successfully
    pub fn delivered(expires_at: DateTime<Utc>) -> Self {
        Self {
            delivered: true,
            used_fallback: false,
            pending: false,
            expires_at,
            exposed_code: None,
        }
    }

    /// Delivery failed; the code lives in fallback storage
    pub fn fallback(expires_at: DateTime<Utc>, exposed_code: Option<String>) -> Self {
        Self {
            delivered: false,
            used_fallback: true,
            pending: false,
            expires_at,
            exposed_code,
        }
    }

    /// Delivery continues in the background
    pub fn pending(expires_at: DateTime<Utc>) -> Self {
        Self {
            delivered: false,
            used_fallback: false,
            pending: true,
            expires_at,
            exposed_code: None,
        }
    }

    /// Delivery failed after the code had already been superseded
    pub fn undelivered(expires_at: DateTime<Utc>) -> Self {
        Self {
            delivered: false,
            used_fallback: false,
            pending: false,
            expires_at,
            exposed_code: None,
        }
    }

    /// Whether the user has to obtain the code some other way than email
    pub fn is_degraded(&self) -> bool {
        self.used_fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_are_mutually_exclusive() {
        let now = Utc::now();

        let delivered = IssueResult::delivered(now);
        assert!(delivered.delivered && !delivered.used_fallback && !delivered.pending);

        let fallback = IssueResult::fallback(now, None);
        assert!(!fallback.delivered && fallback.used_fallback && !fallback.pending);
        assert!(fallback.is_degraded());

        let pending = IssueResult::pending(now);
        assert!(!pending.delivered && !pending.used_fallback && pending.pending);
    }

    #[test]
    fn test_exposed_code_omitted_from_json_when_absent() {
        let json = serde_json::to_value(IssueResult::delivered(Utc::now())).unwrap();
        assert!(json.get("exposed_code").is_none());

        let json = serde_json::to_value(IssueResult::fallback(Utc::now(), Some("123456".into()))).unwrap();
        assert_eq!(json["exposed_code"], "123456");
    }
}
