//! Per-identity issuance rate limiting

mod memory;
mod traits;


pub use memory::{InMemoryRateLimiter, RateLimitWindow};
pub use traits::{RateLimitDecision, RateLimiter};
