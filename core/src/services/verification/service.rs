//! Verification code lifecycle orchestration

use std::sync::Arc;
use std::time::Duration as StdDuration;

use dt_shared::identity::{is_valid_email, mask_identity, normalize_identity};
use dt_shared::{DeliveryMode, VerificationConfig};

use crate::domain::entities::{FallbackEntry, VerificationCode};
use crate::domain::value_objects::{CodePurpose, IssueResult};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::{FallbackStore, VerificationCodeRepository};
use crate::services::rate_limit::{RateLimitDecision, RateLimiter};

use super::cleanup::CleanupReport;
use super::clock::{Clock, SystemClock};
use super::generator::{is_well_formed, CodeGenerator, OsRngCodeGenerator};
use super::templates::{MessageTemplates, RenderedMessage};
use super::traits::Notifier;

/// Issues, delivers and consumes one-time codes
///
/// Each (identity, purpose) pair moves through
/// `NONE -> ISSUED -> {VERIFIED | EXPIRED | SUPERSEDED}`. Expiry is lazy:
/// it is only observed at lookup time.
pub struct VerificationService<C, F, R, N>
where
    C: VerificationCodeRepository + 'static,
    F: FallbackStore + 'static,
    R: RateLimiter + 'static,
    N: Notifier + 'static,
{
    codes: Arc<C>,
    fallback: Arc<F>,
    rate_limiter: Arc<R>,
    notifier: Arc<N>,
    generator: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
    templates: MessageTemplates,
    config: VerificationConfig,
}

impl<C, F, R, N> VerificationService<C, F, R, N>
where
    C: VerificationCodeRepository + 'static,
    F: FallbackStore + 'static,
    R: RateLimiter + 'static,
    N: Notifier + 'static,
{
    /// Create a new verification service
    ///
    /// Uses the system clock and an OS-backed code generator of
    /// `config.code_length` digits.
    ///
    /// # Arguments
    ///
    /// * `codes` - Authoritative code store
    /// * `fallback` - Store for codes whose delivery failed
    /// * `rate_limiter` - Per-identity issuance limiter
    /// * `notifier` - Delivery channel
    /// * `config` - Lifecycle tunables
    pub fn new(
        codes: Arc<C>,
        fallback: Arc<F>,
        rate_limiter: Arc<R>,
        notifier: Arc<N>,
        config: VerificationConfig,
    ) -> Self {
        Self {
            codes,
            fallback,
            rate_limiter,
            notifier,
            generator: Arc::new(OsRngCodeGenerator::new(config.code_length)),
            clock: Arc::new(SystemClock),
            templates: MessageTemplates::new(config.app_name.clone()),
            config,
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the random source
    pub fn with_code_generator(mut self, generator: Arc<dyn CodeGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    /// Issue an email verification code using the built-in template
    pub async fn issue_verification_code(&self, identity: &str) -> DomainResult<IssueResult> {
        self.issue_with_template(identity, CodePurpose::EmailVerification)
            .await
    }

    /// Issue a password reset code using the built-in template
    pub async fn issue_password_reset_code(&self, identity: &str) -> DomainResult<IssueResult> {
        self.issue_with_template(identity, CodePurpose::PasswordReset)
            .await
    }

    async fn issue_with_template(&self, identity: &str, purpose: CodePurpose) -> DomainResult<IssueResult> {
        let templates = self.templates.clone();
        let ttl_minutes = purpose.ttl_minutes(&self.config);
        self.issue(identity, purpose, move |code| {
            templates.render(purpose, code, ttl_minutes)
        })
        .await
    }

    /// Issue a new code for (identity, purpose) and hand it to the notifier
    ///
    /// This method:
    /// 1. Checks the identity's rate limit
    /// 2. Retires every outstanding code for (identity, purpose)
    /// 3. Generates and stores the new code
    /// 4. Delivers the rendered message, moving the code to fallback storage
    ///    if delivery fails or times out
    ///
    /// # Returns
    ///
    /// * `Ok(IssueResult)` - The code was stored; delivery state is described
    ///   by the result, never by an error
    /// * `Err(DomainError::RateLimited)` - Too many codes were issued recently
    /// * `Err(DomainError::Validation)` - The identity is not an email address
    /// * `Err(DomainError::Storage)` - A store failed
    /// * `Err(DomainError::DeliveryFailed)` - Delivery failed and the fallback
    ///   store could not take the code either
    pub async fn issue<T>(&self, identity: &str, purpose: CodePurpose, render: T) -> DomainResult<IssueResult>
    where
        T: FnOnce(&str) -> RenderedMessage + Send,
    {
        let identity = normalize_identity(identity);
        if !is_valid_email(&identity) {
            return Err(DomainError::validation("Identity must be a valid email address"));
        }
        let masked = mask_identity(&identity);
        let now = self.clock.now();
        let ttl = purpose
            .ttl(&self.config)
            .filter(|ttl| VerificationCode::expiry_for(now, *ttl).is_some())
            .ok_or_else(|| DomainError::validation(format!("TTL for {} is out of range", purpose)))?;

        if let RateLimitDecision::Denied { retry_after_seconds } =
            self.rate_limiter.allow(&identity, now).await?
        {
            tracing::warn!(
                identity = %masked,
                purpose = %purpose,
                retry_after_seconds = retry_after_seconds,
                event = "rate_limit_exceeded",
                "Code issuance rate limit exceeded"
            );
            return Err(DomainError::RateLimited { retry_after_seconds });
        }

        // Prior codes must be retired before the new one is saved
        let superseded = self.codes.invalidate_prior(&identity, purpose).await?;
        self.fallback.discard(&identity, purpose).await?;

        let code = self.generator.generate();
        let record = VerificationCode::issue(identity.clone(), purpose, code, now, ttl);
        let record = self.codes.save(record).await?;

        tracing::info!(
            identity = %masked,
            purpose = %purpose,
            code_id = %record.id,
            superseded = superseded,
            expires_at = %record.expires_at,
            event = "code_issued",
            "Issued new verification code"
        );

        let message = render(&record.code);
        let delivery = Delivery {
            codes: Arc::clone(&self.codes),
            fallback: Arc::clone(&self.fallback),
            notifier: Arc::clone(&self.notifier),
            clock: Arc::clone(&self.clock),
            timeout: StdDuration::from_secs(self.config.notifier_timeout_seconds),
            expose_codes_on_failure: self.config.expose_codes_on_failure,
        };

        match self.config.delivery_mode {
            DeliveryMode::Inline => delivery.run(record, message).await,
            DeliveryMode::Background => {
                let expires_at = record.expires_at;
                tokio::spawn(async move {
                    if let Err(e) = delivery.run(record, message).await {
                        tracing::error!(
                            error = %e,
                            event = "background_delivery_failed",
                            "Background delivery could not store a fallback copy"
                        );
                    }
                });
                Ok(IssueResult::pending(expires_at))
            }
        }
    }

    /// Consume a code, granting the caller's effect at most once
    ///
    /// The primary store is checked first, then the fallback store. The
    /// result does not reveal why a code was rejected.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - This call consumed the code
    /// * `Ok(false)` - Wrong, expired, superseded or already used
    /// * `Err(DomainError::Storage)` - A store failed
    pub async fn verify_code(&self, identity: &str, code: &str, purpose: CodePurpose) -> DomainResult<bool> {
        let identity = normalize_identity(identity);
        let masked = mask_identity(&identity);

        if !is_valid_email(&identity) || !is_well_formed(code, self.config.code_length) {
            tracing::warn!(
                identity = %masked,
                purpose = %purpose,
                event = "invalid_code_format",
                "Rejected malformed verification request"
            );
            return Ok(false);
        }

        let now = self.clock.now();

        let mut source = "primary";
        let mut consumed = match self.codes.lookup_valid(&identity, code, purpose, now).await? {
            Some(record) => self.codes.consume(record.id, now).await?,
            None => false,
        };

        if !consumed {
            source = "fallback";
            consumed = self
                .fallback
                .lookup_and_consume(&identity, code, purpose, now)
                .await?;
        }

        if !consumed {
            tracing::warn!(
                identity = %masked,
                purpose = %purpose,
                event = "code_rejected",
                "Invalid or expired verification code"
            );
            return Ok(false);
        }

        tracing::info!(
            identity = %masked,
            purpose = %purpose,
            store = source,
            event = "code_verified",
            "Verification code consumed"
        );

        if let Err(e) = self.rate_limiter.reset(&identity).await {
            tracing::warn!(
                identity = %masked,
                error = %e,
                "Failed to reset rate limit after successful verification"
            );
        }

        Ok(true)
    }

    /// Report whether a code would currently verify, without consuming it
    pub async fn check_code(&self, identity: &str, code: &str, purpose: CodePurpose) -> DomainResult<bool> {
        let identity = normalize_identity(identity);
        if !is_valid_email(&identity) || !is_well_formed(code, self.config.code_length) {
            return Ok(false);
        }

        let now = self.clock.now();
        if self
            .codes
            .lookup_valid(&identity, code, purpose, now)
            .await?
            .is_some()
        {
            return Ok(true);
        }

        self.fallback.peek(&identity, code, purpose, now).await
    }

    /// Purge expired codes, fallback entries and rate limit windows
    ///
    /// Failures of individual stores are collected in the report.
    pub async fn cleanup_expired(&self) -> CleanupReport {
        let now = self.clock.now();
        let mut report = CleanupReport::default();

        match self.codes.purge_expired(now).await {
            Ok(count) => report.codes_purged = count,
            Err(e) => {
                tracing::error!("Failed to purge expired codes: {}", e);
                report.errors.push(format!("Code store cleanup error: {}", e));
            }
        }

        match self.fallback.purge_expired(now).await {
            Ok(count) => report.fallback_purged = count,
            Err(e) => {
                tracing::error!("Failed to purge expired fallback entries: {}", e);
                report.errors.push(format!("Fallback cleanup error: {}", e));
            }
        }

        match self.rate_limiter.purge_expired(now).await {
            Ok(count) => report.rate_windows_purged = count,
            Err(e) => {
                tracing::error!("Failed to purge rate limit windows: {}", e);
                report.errors.push(format!("Rate limiter cleanup error: {}", e));
            }
        }

        tracing::info!(
            codes = report.codes_purged,
            fallback = report.fallback_purged,
            rate_windows = report.rate_windows_purged,
            event = "cleanup_completed",
            "Expired verification state purged"
        );

        report
    }
}

/// State needed to deliver one code, detached from the service so it can be spawned
struct Delivery<C, F, N> {
    codes: Arc<C>,
    fallback: Arc<F>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    timeout: StdDuration,
    expose_codes_on_failure: bool,
}

impl<C, F, N> Delivery<C, F, N>
where
    C: VerificationCodeRepository,
    F: FallbackStore,
    N: Notifier,
{
    async fn run(self, record: VerificationCode, message: RenderedMessage) -> DomainResult<IssueResult> {
        let masked = mask_identity(&record.identity);

        let outcome = tokio::time::timeout(
            self.timeout,
            self.notifier
                .send(&record.identity, &message.subject, &message.body),
        )
        .await;

        let failure = match outcome {
            Ok(Ok(true)) => {
                tracing::info!(
                    identity = %masked,
                    purpose = %record.purpose,
                    event = "code_delivered",
                    "Verification code handed to notifier"
                );
                return Ok(IssueResult::delivered(record.expires_at));
            }
            Ok(Ok(false)) => "notifier reported failure".to_string(),
            Ok(Err(e)) => e,
            Err(_) => format!("notifier timed out after {}s", self.timeout.as_secs()),
        };

        tracing::warn!(
            identity = %masked,
            purpose = %record.purpose,
            reason = %failure,
            event = "delivery_failed",
            "Delivery failed, moving code to fallback storage"
        );

        self.move_to_fallback(record, failure).await
    }

    /// Retire the primary record, then hand the code to the fallback store
    async fn move_to_fallback(&self, record: VerificationCode, failure: String) -> DomainResult<IssueResult> {
        let now = self.clock.now();
        let retired = self.codes.consume(record.id, now).await?;
        if !retired {
            // Superseded by a newer issue, or expired, while delivery was in flight
            tracing::debug!(
                code_id = %record.id,
                "Primary record already retired, skipping fallback"
            );
            return Ok(IssueResult::undelivered(record.expires_at));
        }

        let entry = FallbackEntry::new(
            record.identity.clone(),
            record.code.clone(),
            record.purpose,
            record.expires_at,
        );

        self.fallback.store(entry, now).await.map_err(|e| {
            tracing::error!(
                code_id = %record.id,
                error = %e,
                event = "fallback_store_failed",
                "Fallback store rejected undelivered code"
            );
            DomainError::DeliveryFailed {
                message: format!("{}; fallback storage failed: {}", failure, e),
            }
        })?;

        let exposed = self.expose_codes_on_failure.then(|| record.code.clone());
        Ok(IssueResult::fallback(record.expires_at, exposed))
    }
}
