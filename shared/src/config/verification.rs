//! Verification code lifecycle configuration

use serde::{Deserialize, Serialize};
use std::env;

/// How the notifier is driven when a code is issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Deliver within the `issue` call, bounded by the notifier timeout
    #[default]
    Inline,
    /// Hand delivery to a spawned task and return immediately
    Background,
}

impl std::str::FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inline" | "sync" => Ok(DeliveryMode::Inline),
            "background" | "async" => Ok(DeliveryMode::Background),
            _ => Err(format!("Invalid delivery mode: {}", s)),
        }
    }
}

/// Tunables for code issuance, delivery and consumption
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Lifetime of an email verification code
    pub verification_ttl_minutes: i64,

    /// Lifetime of a password reset code
    pub reset_ttl_minutes: i64,

    /// Number of digits in a generated code
    pub code_length: usize,

    /// Codes that may be issued to one identity per window
    pub rate_limit_count: u32,

    /// Rate limit window length in seconds
    pub rate_limit_window_seconds: u64,

    /// Upper bound on a single notifier call
    pub notifier_timeout_seconds: u64,

    /// Return the raw code to the caller when delivery fell back
    pub expose_codes_on_failure: bool,

    /// Inline or background delivery
    pub delivery_mode: DeliveryMode,

    /// Interval of the periodic expired-entry sweep
    pub cleanup_interval_seconds: u64,

    /// Product name rendered into outgoing messages
    pub app_name: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            verification_ttl_minutes: 10,
            reset_ttl_minutes: 15,
            code_length: 6,
            rate_limit_count: 5,
            rate_limit_window_seconds: 300,
            notifier_timeout_seconds: 10,
            expose_codes_on_failure: false,
            delivery_mode: DeliveryMode::Inline,
            cleanup_interval_seconds: 300,
            app_name: String::from("Simple Debt Tracker"),
        }
    }
}

impl VerificationConfig {
    /// Maximum supported code length
    pub const MAX_CODE_LENGTH: usize = 12;

    /// Longest accepted code lifetime (one year)
    pub const MAX_TTL_MINUTES: i64 = 365 * 24 * 60;

    /// Create from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            verification_ttl_minutes: env_or("VERIFICATION_TTL_MINUTES", defaults.verification_ttl_minutes),
            reset_ttl_minutes: env_or("VERIFICATION_RESET_TTL_MINUTES", defaults.reset_ttl_minutes),
            code_length: env_or("VERIFICATION_CODE_LENGTH", defaults.code_length),
            rate_limit_count: env_or("VERIFICATION_RATE_LIMIT_COUNT", defaults.rate_limit_count),
            rate_limit_window_seconds: env_or(
                "VERIFICATION_RATE_LIMIT_WINDOW_SECONDS",
                defaults.rate_limit_window_seconds,
            ),
            notifier_timeout_seconds: env_or(
                "VERIFICATION_NOTIFIER_TIMEOUT_SECONDS",
                defaults.notifier_timeout_seconds,
            ),
            expose_codes_on_failure: env_or(
                "VERIFICATION_EXPOSE_CODES_ON_FAILURE",
                defaults.expose_codes_on_failure,
            ),
            delivery_mode: env_or("VERIFICATION_DELIVERY_MODE", defaults.delivery_mode),
            cleanup_interval_seconds: env_or(
                "VERIFICATION_CLEANUP_INTERVAL_SECONDS",
                defaults.cleanup_interval_seconds,
            ),
            app_name: env::var("APP_NAME").unwrap_or(defaults.app_name),
        }
    }

    /// Check that every tunable is usable
    pub fn validate(&self) -> Result<(), String> {
        if self.verification_ttl_minutes <= 0 || self.verification_ttl_minutes > Self::MAX_TTL_MINUTES {
            return Err(format!(
                "verification_ttl_minutes must be between 1 and {}",
                Self::MAX_TTL_MINUTES
            ));
        }
        if self.reset_ttl_minutes <= 0 || self.reset_ttl_minutes > Self::MAX_TTL_MINUTES {
            return Err(format!(
                "reset_ttl_minutes must be between 1 and {}",
                Self::MAX_TTL_MINUTES
            ));
        }
        if self.code_length == 0 || self.code_length > Self::MAX_CODE_LENGTH {
            return Err(format!(
                "code_length must be between 1 and {}",
                Self::MAX_CODE_LENGTH
            ));
        }
        if self.rate_limit_count == 0 {
            return Err("rate_limit_count must be positive".to_string());
        }
        if self.rate_limit_window_seconds == 0 {
            return Err("rate_limit_window_seconds must be positive".to_string());
        }
        if self.notifier_timeout_seconds == 0 {
            return Err("notifier_timeout_seconds must be positive".to_string());
        }
        if self.cleanup_interval_seconds == 0 {
            return Err("cleanup_interval_seconds must be positive".to_string());
        }
        Ok(())
    }

    /// Builder-style override of the rate limit
    pub fn with_rate_limit(mut self, count: u32, window_seconds: u64) -> Self {
        self.rate_limit_count = count;
        self.rate_limit_window_seconds = window_seconds;
        self
    }

    /// Builder-style override of the delivery mode
    pub fn with_delivery_mode(mut self, mode: DeliveryMode) -> Self {
        self.delivery_mode = mode;
        self
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VerificationConfig::default();
        assert_eq!(config.verification_ttl_minutes, 10);
        assert_eq!(config.reset_ttl_minutes, 15);
        assert_eq!(config.code_length, 6);
        assert_eq!(config.rate_limit_count, 5);
        assert_eq!(config.rate_limit_window_seconds, 300);
        assert_eq!(config.notifier_timeout_seconds, 10);
        assert!(!config.expose_codes_on_failure);
        assert_eq!(config.delivery_mode, DeliveryMode::Inline);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = VerificationConfig::default();
        config.code_length = 0;
        assert!(config.validate().is_err());

        let mut config = VerificationConfig::default();
        config.code_length = VerificationConfig::MAX_CODE_LENGTH + 1;
        assert!(config.validate().is_err());

        let config = VerificationConfig::default().with_rate_limit(0, 300);
        assert!(config.validate().is_err());

        let mut config = VerificationConfig::default();
        config.reset_ttl_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_caps_ttls() {
        let mut config = VerificationConfig::default();
        config.verification_ttl_minutes = VerificationConfig::MAX_TTL_MINUTES;
        assert!(config.validate().is_ok());

        config.verification_ttl_minutes = i64::MAX / 60_000;
        assert!(config.validate().is_err());

        let mut config = VerificationConfig::default();
        config.reset_ttl_minutes = VerificationConfig::MAX_TTL_MINUTES + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_cleanup_interval() {
        let mut config = VerificationConfig::default();
        config.cleanup_interval_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize() {
        let config: VerificationConfig =
            serde_json::from_str(r#"{"rate_limit_count": 3, "delivery_mode": "background"}"#).unwrap();
        assert_eq!(config.rate_limit_count, 3);
        assert_eq!(config.delivery_mode, DeliveryMode::Background);
        assert_eq!(config.verification_ttl_minutes, 10);
    }

    #[test]
    fn test_delivery_mode_from_str() {
        assert_eq!("inline".parse::<DeliveryMode>().unwrap(), DeliveryMode::Inline);
        assert_eq!("Background".parse::<DeliveryMode>().unwrap(), DeliveryMode::Background);
        assert!("later".parse::<DeliveryMode>().is_err());
    }
}
