//! Business services containing domain logic and use cases.

pub mod rate_limit;
pub mod verification;

// Re-export commonly used types
pub use rate_limit::{InMemoryRateLimiter, RateLimitDecision, RateLimitWindow, RateLimiter};
pub use verification::{
    CleanupReport, Clock, CodeGenerator, MessageTemplates, Notifier, OsRngCodeGenerator,
    RenderedMessage, SystemClock, VerificationCleanupTask, VerificationService,
};
