//! Domain-specific error types and error handling.
//!
//! Invalid codes and delivery problems are not errors at the service
//! boundary: `consume` returns `false` and `issue` returns a degraded
//! `IssueResult`. Only rate limiting, malformed input and storage faults
//! surface as `DomainError`.

use dt_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Too many code requests. Try again in {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    /// Deliberately does not say whether the code was wrong, expired or used
    #[error("Invalid or expired code")]
    InvalidOrExpiredCode,

    #[error("Delivery failed: {message}")]
    DeliveryFailed { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    /// Shorthand for a storage failure
    pub fn storage(message: impl Into<String>) -> Self {
        DomainError::Storage {
            message: message.into(),
        }
    }

    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation {
            message: message.into(),
        }
    }

    /// Whether the caller can fix the condition by retrying or changing input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DomainError::Validation { .. }
                | DomainError::RateLimited { .. }
                | DomainError::InvalidOrExpiredCode
        )
    }

    /// HTTP-equivalent status code for the boundary layer
    pub fn status_code(&self) -> u16 {
        match self {
            DomainError::Validation { .. } => 400,
            DomainError::InvalidOrExpiredCode => 400,
            DomainError::RateLimited { .. } => 429,
            DomainError::DeliveryFailed { .. } => 502,
            DomainError::Storage { .. } => 500,
        }
    }

    /// Stable machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => error_codes::VALIDATION_ERROR,
            DomainError::RateLimited { .. } => error_codes::RATE_LIMIT_EXCEEDED,
            DomainError::InvalidOrExpiredCode => error_codes::INVALID_OR_EXPIRED_CODE,
            DomainError::DeliveryFailed { .. } => error_codes::DELIVERY_FAILED,
            DomainError::Storage { .. } => error_codes::STORAGE_ERROR,
        }
    }
}

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            DomainError::RateLimited { retry_after_seconds } => {
                ErrorResponse::new(self.error_code(), self.to_string())
                    .add_detail("retry_after_seconds", retry_after_seconds)
            }
            // Internal details stay in the logs
            DomainError::Storage { .. } | DomainError::DeliveryFailed { .. } => {
                ErrorResponse::new(self.error_code(), "Internal server error")
            }
            _ => ErrorResponse::new(self.error_code(), self.to_string()),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(DomainError::RateLimited { retry_after_seconds: 10 }.status_code(), 429);
        assert_eq!(DomainError::InvalidOrExpiredCode.status_code(), 400);
        assert_eq!(DomainError::storage("db down").status_code(), 500);
    }

    #[test]
    fn test_recoverability() {
        assert!(DomainError::InvalidOrExpiredCode.is_recoverable());
        assert!(DomainError::RateLimited { retry_after_seconds: 1 }.is_recoverable());
        assert!(!DomainError::storage("db down").is_recoverable());
        assert!(!DomainError::DeliveryFailed { message: "smtp".into() }.is_recoverable());
    }

    #[test]
    fn test_error_response_hides_storage_details() {
        let response = DomainError::storage("connection refused to 10.0.0.1").to_error_response();
        assert_eq!(response.error, error_codes::STORAGE_ERROR);
        assert!(!response.message.contains("10.0.0.1"));
    }

    #[test]
    fn test_rate_limited_response_carries_retry_after() {
        let response = DomainError::RateLimited { retry_after_seconds: 42 }.to_error_response();
        assert_eq!(response.error, error_codes::RATE_LIMIT_EXCEEDED);
        let details = response.details.unwrap();
        assert_eq!(details["retry_after_seconds"], serde_json::json!(42));
    }

    #[test]
    fn test_invalid_code_message_is_generic() {
        let message = DomainError::InvalidOrExpiredCode.to_string();
        assert_eq!(message, "Invalid or expired code");
    }
}
