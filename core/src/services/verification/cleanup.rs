//! Periodic housekeeping for expired verification state
//!
//! Correctness never depends on this task: expiry is checked at lookup time.
//! The sweep only bounds storage growth.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::repositories::{FallbackStore, VerificationCodeRepository};
use crate::services::rate_limit::RateLimiter;

use super::service::VerificationService;
use super::traits::Notifier;

/// Result of a cleanup cycle
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    /// Expired records removed from the code store
    pub codes_purged: usize,
    /// Expired entries removed from the fallback store
    pub fallback_purged: usize,
    /// Finished rate limit windows dropped
    pub rate_windows_purged: usize,
    /// Errors from individual stores; other stores are still swept
    pub errors: Vec<String>,
}

impl CleanupReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total_cleaned(&self) -> usize {
        self.codes_purged + self.fallback_purged + self.rate_windows_purged
    }
}

/// Shortest interval between sweeps
pub const MIN_CLEANUP_INTERVAL: Duration = Duration::from_secs(1);

/// Runs `cleanup_expired` on a fixed interval
pub struct VerificationCleanupTask<C, F, R, N>
where
    C: VerificationCodeRepository + 'static,
    F: FallbackStore + 'static,
    R: RateLimiter + 'static,
    N: Notifier + 'static,
{
    service: Arc<VerificationService<C, F, R, N>>,
    interval: Duration,
}

impl<C, F, R, N> VerificationCleanupTask<C, F, R, N>
where
    C: VerificationCodeRepository + 'static,
    F: FallbackStore + 'static,
    R: RateLimiter + 'static,
    N: Notifier + 'static,
{
    /// Intervals shorter than [`MIN_CLEANUP_INTERVAL`] are raised to it
    pub fn new(service: Arc<VerificationService<C, F, R, N>>, interval: Duration) -> Self {
        Self {
            service,
            interval: interval.max(MIN_CLEANUP_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Use the interval from the service configuration
    pub fn from_service(service: Arc<VerificationService<C, F, R, N>>) -> Self {
        let interval = Duration::from_secs(service.config().cleanup_interval_seconds);
        Self::new(service, interval)
    }

    /// Run one sweep
    pub async fn run_once(&self) -> CleanupReport {
        self.service.cleanup_expired().await
    }

    /// Spawn the sweep loop; abort the returned handle to stop it
    pub fn start_background_task(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "Verification cleanup task started - will run every {} seconds",
                self.interval.as_secs()
            );

            let mut interval_timer = tokio::time::interval(self.interval);

            loop {
                interval_timer.tick().await;

                let report = self.run_once().await;
                if !report.is_success() {
                    warn!("Verification cleanup completed with errors: {:?}", report.errors);
                }
            }
        })
    }
}
