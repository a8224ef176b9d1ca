//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Redis configuration for fallback storage and rate limiting
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `verification` - Verification code lifecycle tuning

pub mod cache;
pub mod database;
pub mod environment;
pub mod verification;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::{CacheBackend, CacheConfig};
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use verification::{DeliveryMode, VerificationConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Verification code configuration
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            verification: VerificationConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig::new("mysql://localhost:3306/debt_tracker_dev"),
            cache: CacheConfig::default(),
            verification: VerificationConfig {
                expose_codes_on_failure: true,
                ..Default::default()
            },
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig::new("mysql://prod-db:3306/debt_tracker")
                .with_max_connections(50),
            cache: CacheConfig::new("redis://prod-cache:6379").with_prefix("dt"),
            verification: VerificationConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Baseline configuration for an environment
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::development();
                config.environment = Environment::Staging;
                config.verification.expose_codes_on_failure = false;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        }
    }

    /// Load configuration from environment
    pub fn from_env() -> Self {
        let mut config = Self::for_environment(Environment::from_env());
        config.database = DatabaseConfig::from_env();
        config.cache = CacheConfig::from_env();
        config.verification = VerificationConfig::from_env();
        config
    }
}
