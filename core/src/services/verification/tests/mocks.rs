//! Test doubles for the verification service

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use dt_shared::VerificationConfig;

use crate::domain::entities::{FallbackEntry, VerificationCode};
use crate::domain::value_objects::CodePurpose;
use crate::errors::DomainError;
use crate::repositories::{
    FallbackStore, InMemoryFallbackStore, InMemoryVerificationCodeRepository,
    VerificationCodeRepository,
};
use crate::services::rate_limit::InMemoryRateLimiter;
use crate::services::verification::{Clock, CodeGenerator, Notifier, VerificationService};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// Hands out scripted codes, repeating the last one when exhausted
pub struct FixedCodeGenerator {
    codes: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl FixedCodeGenerator {
    pub fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
            last: Mutex::new(codes.last().map(|c| c.to_string()).unwrap_or_default()),
        }
    }
}

impl CodeGenerator for FixedCodeGenerator {
    fn generate(&self) -> String {
        match self.codes.lock().unwrap().pop_front() {
            Some(code) => code,
            None => self.last.lock().unwrap().clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub identity: String,
    pub subject: String,
    pub content: String,
}

// Notifier that accepts every message and remembers it
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<SentMessage>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<SentMessage> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, identity: &str, subject: &str, content: &str) -> Result<bool, String> {
        self.sent.lock().unwrap().push(SentMessage {
            identity: identity.to_string(),
            subject: subject.to_string(),
            content: content.to_string(),
        });
        Ok(true)
    }
}

// Notifier that never delivers
pub struct FailingNotifier {
    pub hard_error: bool,
    pub attempts: Mutex<u32>,
}

impl FailingNotifier {
    /// Reports failure through `Ok(false)`
    pub fn returning_false() -> Self {
        Self {
            hard_error: false,
            attempts: Mutex::new(0),
        }
    }

    /// Reports failure through `Err`
    pub fn erroring() -> Self {
        Self {
            hard_error: true,
            attempts: Mutex::new(0),
        }
    }

    pub fn attempts(&self) -> u32 {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _identity: &str, _subject: &str, _content: &str) -> Result<bool, String> {
        *self.attempts.lock().unwrap() += 1;
        if self.hard_error {
            Err("SMTP connection refused".to_string())
        } else {
            Ok(false)
        }
    }
}

// Notifier that takes longer than any reasonable timeout
pub struct SlowNotifier {
    pub delay: std::time::Duration,
}

#[async_trait]
impl Notifier for SlowNotifier {
    async fn send(&self, _identity: &str, _subject: &str, _content: &str) -> Result<bool, String> {
        tokio::time::sleep(self.delay).await;
        Ok(true)
    }
}

// Code store whose backend is down
pub struct FailingRepository;

#[async_trait]
impl VerificationCodeRepository for FailingRepository {
    async fn invalidate_prior(&self, _identity: &str, _purpose: CodePurpose) -> Result<usize, DomainError> {
        Err(DomainError::storage("database unavailable"))
    }

    async fn save(&self, _code: VerificationCode) -> Result<VerificationCode, DomainError> {
        Err(DomainError::storage("database unavailable"))
    }

    async fn lookup_valid(
        &self,
        _identity: &str,
        _code: &str,
        _purpose: CodePurpose,
        _now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>, DomainError> {
        Err(DomainError::storage("database unavailable"))
    }

    async fn consume(&self, _id: Uuid, _now: DateTime<Utc>) -> Result<bool, DomainError> {
        Err(DomainError::storage("database unavailable"))
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<usize, DomainError> {
        Err(DomainError::storage("database unavailable"))
    }
}

// Fallback store that can discard but not accept new entries
#[derive(Default)]
pub struct RejectingFallbackStore {
    inner: InMemoryFallbackStore,
}

#[async_trait]
impl FallbackStore for RejectingFallbackStore {
    async fn store(&self, _entry: FallbackEntry, _now: DateTime<Utc>) -> Result<(), DomainError> {
        Err(DomainError::storage("cache unavailable"))
    }

    async fn lookup_and_consume(
        &self,
        identity: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.inner.lookup_and_consume(identity, code, purpose, now).await
    }

    async fn peek(
        &self,
        identity: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.inner.peek(identity, code, purpose, now).await
    }

    async fn discard(&self, identity: &str, purpose: CodePurpose) -> Result<bool, DomainError> {
        self.inner.discard(identity, purpose).await
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        self.inner.purge_expired(now).await
    }
}

pub type InMemoryService<N> =
    VerificationService<InMemoryVerificationCodeRepository, InMemoryFallbackStore, InMemoryRateLimiter, N>;

/// Service wired to in-memory stores, plus handles to inspect them
pub struct Harness<N: Notifier + 'static> {
    pub service: Arc<InMemoryService<N>>,
    pub codes: Arc<InMemoryVerificationCodeRepository>,
    pub fallback: Arc<InMemoryFallbackStore>,
    pub limiter: Arc<InMemoryRateLimiter>,
    pub notifier: Arc<N>,
    pub clock: Arc<ManualClock>,
}

impl<N: Notifier + 'static> Harness<N> {
    pub fn new(notifier: N, config: VerificationConfig, codes: &[&str]) -> Self {
        let repo = Arc::new(InMemoryVerificationCodeRepository::new());
        let fallback = Arc::new(InMemoryFallbackStore::new());
        let limiter = Arc::new(InMemoryRateLimiter::from_config(&config));
        let notifier = Arc::new(notifier);
        let clock = Arc::new(ManualClock::new(t0()));

        let service = VerificationService::new(
            Arc::clone(&repo),
            Arc::clone(&fallback),
            Arc::clone(&limiter),
            Arc::clone(&notifier),
            config,
        )
        .with_clock(clock.clone() as Arc<dyn Clock>)
        .with_code_generator(Arc::new(FixedCodeGenerator::new(codes)));

        Self {
            service: Arc::new(service),
            codes: repo,
            fallback,
            limiter,
            notifier,
            clock,
        }
    }
}
