//! Verification code lifecycle
//!
//! This module provides the complete one-time code workflow:
//! - Code generation from a secure random source
//! - Issuance with rate limiting and supersession of prior codes
//! - Delivery through a `Notifier`, with fallback storage on failure
//! - Single-use consumption across the primary and fallback stores
//! - Periodic cleanup of expired state

mod cleanup;
mod clock;
mod generator;
mod service;
mod templates;
mod traits;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupReport, VerificationCleanupTask, MIN_CLEANUP_INTERVAL};
pub use clock::{Clock, SystemClock};
pub use generator::{is_well_formed, CodeGenerator, OsRngCodeGenerator};
pub use service::VerificationService;
pub use templates::{MessageTemplates, RenderedMessage};
pub use traits::Notifier;
