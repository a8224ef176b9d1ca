//! Development notifier that writes deliveries to the log

use async_trait::async_trait;
use tracing::info;

use dt_core::Notifier;
use dt_shared::identity::mask_identity;

/// Logs each delivery and reports success
///
/// The message body carries the code and is never logged.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, identity: &str, subject: &str, content: &str) -> Result<bool, String> {
        info!(
            event = "notification_logged",
            identity = %mask_identity(identity),
            subject = %subject,
            body_length = content.len(),
            "Delivered notification to log"
        );
        Ok(true)
    }
}
