//! # Infrastructure Layer
//!
//! Concrete implementations of the verification code lifecycle's storage
//! and delivery seams:
//! - **Database**: MySQL code store using SQLx
//! - **Cache**: Redis fallback store and rate limiter
//! - **Notify**: Notifier decorators (retry with backoff, development logger)
//! - **Config / Telemetry**: layered configuration loading and tracing setup
//! - **Bootstrap**: wiring everything into a `VerificationService`
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis caching support (default)

// Re-export core error types for convenience
pub use dt_core::errors::{DomainError, DomainResult};

pub mod bootstrap;

/// Cache module - Redis client, fallback store and rate limiter
pub mod cache;

/// Configuration loading
pub mod config;

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Notifier implementations and decorators
pub mod notify;

/// Tracing subscriber setup
pub mod telemetry;

pub use bootstrap::{build_verification_infrastructure, AppVerificationService, VerificationInfrastructure};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration source could not be read or deserialized
    #[error("Configuration error: {0}")]
    Settings(#[from] ::config::ConfigError),

    /// Configuration was read but is not usable
    #[error("Configuration error: {0}")]
    Config(String),

    /// A store failed while the infrastructure was being prepared
    #[error("Store setup error: {0}")]
    Domain(#[from] DomainError),

    /// Tracing subscriber could not be installed
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        DomainError::Storage {
            message: error.to_string(),
        }
    }
}
