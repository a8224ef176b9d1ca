//! Common utility functions

pub mod identity;

// Re-export commonly used utilities
pub use identity::*;
