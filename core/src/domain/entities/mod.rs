//! Domain entities representing core business objects.

pub mod fallback_entry;
pub mod verification_code;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use fallback_entry::FallbackEntry;
pub use verification_code::{VerificationCode, CODE_LENGTH};
