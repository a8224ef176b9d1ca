//! Cache configuration module

use serde::{Deserialize, Serialize};

/// Where ephemeral state (fallback entries, rate-limit windows) lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local maps; single-process deployments only
    #[default]
    Memory,
    /// Shared Redis instance
    Redis,
}

impl std::str::FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(CacheBackend::Memory),
            "redis" => Ok(CacheBackend::Redis),
            _ => Err(format!("Invalid cache backend: {}", s)),
        }
    }
}

/// Redis cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend used for fallback entries and rate-limit windows
    pub backend: CacheBackend,

    /// Redis connection URL
    pub url: String,

    /// Connection timeout in seconds
    pub connection_timeout: u64,

    /// Response timeout in seconds
    pub response_timeout: u64,

    /// Enable cache key prefix
    pub key_prefix: Option<String>,

    /// Maximum connection attempts on startup
    pub max_retries: u32,

    /// Base delay between connection attempts (doubled per attempt)
    pub retry_delay_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            url: String::from("redis://localhost:6379"),
            connection_timeout: 5,
            response_timeout: 5,
            key_prefix: None,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let url = std::env::var("REDIS_URL")
            .unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let backend = std::env::var("CACHE_BACKEND")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();
        let key_prefix = std::env::var("REDIS_KEY_PREFIX").ok();

        Self {
            backend,
            url,
            key_prefix,
            ..Default::default()
        }
    }

    /// Create a new Redis-backed cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            backend: CacheBackend::Redis,
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}
