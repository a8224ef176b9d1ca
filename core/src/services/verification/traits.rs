//! Collaborator traits for code delivery

use async_trait::async_trait;

/// Delivers a rendered message to an identity
///
/// `Ok(true)` means the transport attempt completed, not that the message
/// was received. `Ok(false)` and `Err` are both treated as delivery failure.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, identity: &str, subject: &str, content: &str) -> Result<bool, String>;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    async fn send(&self, identity: &str, subject: &str, content: &str) -> Result<bool, String> {
        (**self).send(identity, subject, content).await
    }
}
