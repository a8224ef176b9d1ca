//! Wires configuration, stores and a notifier into a running service
//!
//! The code store is always MySQL. Fallback entries and rate-limit windows
//! live in Redis or in process memory depending on `cache.backend`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

use dt_core::{
    CodePurpose, DomainError, FallbackEntry, FallbackStore, InMemoryFallbackStore, InMemoryRateLimiter, Notifier,
    RateLimitDecision, RateLimiter, VerificationCleanupTask, VerificationService,
};
use dt_shared::{AppConfig, CacheBackend};

use crate::cache::{RedisClient, RedisFallbackStore, RedisRateLimiter};
use crate::database::{DatabasePool, MySqlVerificationCodeRepository};
use crate::notify::RetryingNotifier;
use crate::InfrastructureError;

/// Fallback store selected at startup
pub enum AnyFallbackStore {
    Memory(InMemoryFallbackStore),
    Redis(RedisFallbackStore),
}

#[async_trait]
impl FallbackStore for AnyFallbackStore {
    async fn store(&self, entry: FallbackEntry, now: DateTime<Utc>) -> Result<(), DomainError> {
        match self {
            AnyFallbackStore::Memory(store) => store.store(entry, now).await,
            AnyFallbackStore::Redis(store) => store.store(entry, now).await,
        }
    }

    async fn lookup_and_consume(
        &self,
        identity: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        match self {
            AnyFallbackStore::Memory(store) => store.lookup_and_consume(identity, code, purpose, now).await,
            AnyFallbackStore::Redis(store) => store.lookup_and_consume(identity, code, purpose, now).await,
        }
    }

    async fn peek(
        &self,
        identity: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        match self {
            AnyFallbackStore::Memory(store) => store.peek(identity, code, purpose, now).await,
            AnyFallbackStore::Redis(store) => store.peek(identity, code, purpose, now).await,
        }
    }

    async fn discard(&self, identity: &str, purpose: CodePurpose) -> Result<bool, DomainError> {
        match self {
            AnyFallbackStore::Memory(store) => store.discard(identity, purpose).await,
            AnyFallbackStore::Redis(store) => store.discard(identity, purpose).await,
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        match self {
            AnyFallbackStore::Memory(store) => store.purge_expired(now).await,
            AnyFallbackStore::Redis(store) => store.purge_expired(now).await,
        }
    }
}

/// Rate limiter selected at startup
pub enum AnyRateLimiter {
    Memory(InMemoryRateLimiter),
    Redis(RedisRateLimiter),
}

#[async_trait]
impl RateLimiter for AnyRateLimiter {
    async fn allow(&self, identity: &str, now: DateTime<Utc>) -> Result<RateLimitDecision, DomainError> {
        match self {
            AnyRateLimiter::Memory(limiter) => limiter.allow(identity, now).await,
            AnyRateLimiter::Redis(limiter) => limiter.allow(identity, now).await,
        }
    }

    async fn reset(&self, identity: &str) -> Result<(), DomainError> {
        match self {
            AnyRateLimiter::Memory(limiter) => limiter.reset(identity).await,
            AnyRateLimiter::Redis(limiter) => limiter.reset(identity).await,
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        match self {
            AnyRateLimiter::Memory(limiter) => limiter.purge_expired(now).await,
            AnyRateLimiter::Redis(limiter) => limiter.purge_expired(now).await,
        }
    }
}

/// Verification service as assembled by `build_verification_infrastructure`
pub type AppVerificationService = VerificationService<
    MySqlVerificationCodeRepository,
    AnyFallbackStore,
    AnyRateLimiter,
    RetryingNotifier<Arc<dyn Notifier>>,
>;

/// Everything the host application needs to hold on to
pub struct VerificationInfrastructure {
    pub service: Arc<AppVerificationService>,
    pub pool: DatabasePool,
    /// Present when the Redis backend is configured
    pub redis: Option<Arc<RedisClient>>,
    cleanup_interval: Duration,
}

impl VerificationInfrastructure {
    /// Spawn the periodic cleanup sweep
    pub fn start_cleanup(&self) -> JoinHandle<()> {
        VerificationCleanupTask::new(self.service.clone(), self.cleanup_interval).start_background_task()
    }

    /// Close the database pool
    pub async fn shutdown(&self) {
        self.pool.close().await;
    }
}

/// Build the verification service from configuration
///
/// Connects to MySQL (and Redis when configured), bootstraps the
/// `verification_codes` table and wraps `notifier` in a retry decorator.
pub async fn build_verification_infrastructure(
    config: &AppConfig,
    notifier: Arc<dyn Notifier>,
) -> Result<VerificationInfrastructure, InfrastructureError> {
    config.verification.validate().map_err(InfrastructureError::Config)?;

    let pool = DatabasePool::new(config.database.clone()).await?;
    let codes = MySqlVerificationCodeRepository::new(pool.get_pool().clone());
    codes.ensure_schema().await?;

    let (fallback, rate_limiter, redis) = match config.cache.backend {
        CacheBackend::Redis => {
            let client = Arc::new(RedisClient::new(config.cache.clone()).await?);
            (
                AnyFallbackStore::Redis(RedisFallbackStore::new(client.clone())),
                AnyRateLimiter::Redis(RedisRateLimiter::from_config(client.clone(), &config.verification)),
                Some(client),
            )
        }
        CacheBackend::Memory => (
            AnyFallbackStore::Memory(InMemoryFallbackStore::new()),
            AnyRateLimiter::Memory(InMemoryRateLimiter::from_config(&config.verification)),
            None,
        ),
    };

    info!(
        environment = %config.environment,
        cache_backend = ?config.cache.backend,
        delivery_mode = ?config.verification.delivery_mode,
        "Verification infrastructure ready"
    );

    let service = VerificationService::new(
        Arc::new(codes),
        Arc::new(fallback),
        Arc::new(rate_limiter),
        Arc::new(RetryingNotifier::new(notifier)),
        config.verification.clone(),
    );

    Ok(VerificationInfrastructure {
        service: Arc::new(service),
        pool,
        redis,
        cleanup_interval: Duration::from_secs(config.verification.cleanup_interval_seconds),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use dt_shared::VerificationConfig;

    #[tokio::test]
    async fn test_memory_fallback_store_delegates() {
        let store = AnyFallbackStore::Memory(InMemoryFallbackStore::new());
        let now = Utc::now();
        let entry = FallbackEntry::new(
            "user@example.com",
            "123456",
            CodePurpose::EmailVerification,
            now + ChronoDuration::minutes(15),
        );

        store.store(entry, now).await.unwrap();

        assert!(store.peek("user@example.com", "123456", CodePurpose::EmailVerification, now).await.unwrap());
        assert!(store
            .lookup_and_consume("user@example.com", "123456", CodePurpose::EmailVerification, now)
            .await
            .unwrap());
        assert!(!store.discard("user@example.com", CodePurpose::EmailVerification).await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_rate_limiter_delegates() {
        let config = VerificationConfig::default().with_rate_limit(1, 60);
        let limiter = AnyRateLimiter::Memory(InMemoryRateLimiter::from_config(&config));
        let now = Utc::now();

        assert!(limiter.allow("user@example.com", now).await.unwrap().is_allowed());
        assert!(!limiter.allow("user@example.com", now).await.unwrap().is_allowed());

        limiter.reset("user@example.com").await.unwrap();
        assert!(limiter.allow("user@example.com", now).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_invalid_verification_config_is_rejected_before_connecting() {
        let mut config = AppConfig::development();
        config.verification.code_length = 0;

        let result = build_verification_infrastructure(&config, Arc::new(crate::notify::LogNotifier::new())).await;

        assert!(matches!(result, Err(InfrastructureError::Config(_))));
    }
}
