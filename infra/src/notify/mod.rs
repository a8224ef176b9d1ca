//! Notifier implementations and decorators
//!
//! Transports are out of scope here; these wrap whatever transport the host
//! application provides.

pub mod log_notifier;
pub mod retrying;

pub use log_notifier::LogNotifier;
pub use retrying::RetryingNotifier;
