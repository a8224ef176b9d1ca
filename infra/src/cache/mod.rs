//! Redis-backed stores for the verification service
//!
//! The fallback store and the rate limiter share one multiplexed client.
//! Identities never appear in keys in clear text.

pub mod redis_client;
pub mod redis_fallback_store;
pub mod redis_rate_limiter;

#[cfg(test)]
mod tests;

use sha2::{Digest, Sha256};

pub use redis_client::RedisClient;
pub use redis_fallback_store::RedisFallbackStore;
pub use redis_rate_limiter::RedisRateLimiter;

pub use dt_shared::CacheConfig;

/// Hex-encoded SHA-256 of a normalized identity, used in cache keys
pub fn hash_identity(identity: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    format!("{:x}", hasher.finalize())
}
