//! # Debt Tracker Core
//!
//! Core domain layer for the verification code lifecycle: issuance, delivery
//! with fallback, consumption and expiry of one-time codes used for email
//! verification and password reset.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{CodePurpose, FallbackEntry, IssueResult, VerificationCode, CODE_LENGTH};
pub use errors::{DomainError, DomainResult};
pub use repositories::{
    FallbackStore, InMemoryFallbackStore, InMemoryVerificationCodeRepository, VerificationCodeRepository,
};
pub use services::{
    CleanupReport, Clock, CodeGenerator, InMemoryRateLimiter, MessageTemplates, Notifier,
    OsRngCodeGenerator, RateLimitDecision, RateLimitWindow, RateLimiter, RenderedMessage, SystemClock,
    VerificationCleanupTask, VerificationService,
};
