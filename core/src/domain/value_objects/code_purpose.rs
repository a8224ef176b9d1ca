//! Purpose namespace for one-time codes.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use dt_shared::VerificationConfig;

/// What a one-time code authorises
///
/// Purposes are distinct namespaces: a code issued for one purpose never
/// validates another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodePurpose {
    /// Confirms ownership of the email address after registration
    EmailVerification,
    /// Authorises a password change
    PasswordReset,
}

impl CodePurpose {
    /// Stable string used for storage columns and cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            CodePurpose::EmailVerification => "email_verification",
            CodePurpose::PasswordReset => "password_reset",
        }
    }

    /// Lifetime of a code issued for this purpose, `None` if out of range
    pub fn ttl(&self, config: &VerificationConfig) -> Option<Duration> {
        Duration::try_minutes(self.ttl_minutes(config))
    }

    /// Lifetime in minutes, as rendered into outgoing messages
    pub fn ttl_minutes(&self, config: &VerificationConfig) -> i64 {
        match self {
            CodePurpose::EmailVerification => config.verification_ttl_minutes,
            CodePurpose::PasswordReset => config.reset_ttl_minutes,
        }
    }
}

impl fmt::Display for CodePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodePurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email_verification" => Ok(CodePurpose::EmailVerification),
            "password_reset" => Ok(CodePurpose::PasswordReset),
            other => Err(format!("Unknown code purpose: {}", other)),
        }
    }
}
