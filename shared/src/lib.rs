//! Shared utilities and common types for the Debt Tracker server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Identity (email) validation and masking

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheBackend, CacheConfig, DatabaseConfig, DeliveryMode, Environment, LogFormat, LoggingConfig,
    VerificationConfig,
};
pub use errors::{error_codes, ApiResult, ErrorResponse, IntoErrorResponse};
pub use utils::identity;
