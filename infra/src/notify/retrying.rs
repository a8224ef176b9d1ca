//! Retry decorator for notifiers
//!
//! Retries a failing notifier with exponential backoff. The verification
//! service bounds the whole attempt with its notifier timeout, so retries
//! never extend the caller's wait past that limit.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use dt_core::Notifier;
use dt_shared::identity::mask_identity;

/// Default number of delivery attempts
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);

/// Upper bound on the delay between attempts
const MAX_DELAY: Duration = Duration::from_secs(5);

pub struct RetryingNotifier<N> {
    inner: N,
    max_attempts: u32,
    base_delay: Duration,
}

impl<N: Notifier> RetryingNotifier<N> {
    pub fn new(inner: N) -> Self {
        Self {
            inner,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn inner(&self) -> &N {
        &self.inner
    }
}

#[async_trait]
impl<N: Notifier> Notifier for RetryingNotifier<N> {
    async fn send(&self, identity: &str, subject: &str, content: &str) -> Result<bool, String> {
        let mut attempts = 0;
        let mut delay = self.base_delay;

        loop {
            attempts += 1;

            let outcome = self.inner.send(identity, subject, content).await;
            match &outcome {
                Ok(true) => {
                    debug!(attempts, "Notification sent");
                    return outcome;
                }
                Ok(false) => warn!(
                    identity = %mask_identity(identity),
                    "Notifier reported failure (attempt {}/{})",
                    attempts, self.max_attempts
                ),
                Err(e) => warn!(
                    identity = %mask_identity(identity),
                    "Notifier error (attempt {}/{}): {}",
                    attempts, self.max_attempts, e
                ),
            }

            if attempts >= self.max_attempts {
                return outcome;
            }

            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(MAX_DELAY);
        }
    }
}
