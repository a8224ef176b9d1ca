//! Storage abstractions for issued codes and their fallback copies.

pub mod fallback;
pub mod verification_code;

pub use fallback::{FallbackStore, InMemoryFallbackStore};
pub use verification_code::{InMemoryVerificationCodeRepository, VerificationCodeRepository};
