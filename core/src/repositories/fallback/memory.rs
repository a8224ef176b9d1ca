//! In-memory fallback store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::FallbackEntry;
use crate::domain::value_objects::CodePurpose;
use crate::errors::DomainError;

use super::r#trait::FallbackStore;

type EntryKey = (String, CodePurpose);

/// Fallback store backed by a `HashMap` behind a tokio `RwLock`
#[derive(Clone)]
pub struct InMemoryFallbackStore {
    entries: Arc<RwLock<HashMap<EntryKey, FallbackEntry>>>,
}

impl InMemoryFallbackStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Raw entry for (identity, purpose), expired or not
    pub async fn get(&self, identity: &str, purpose: CodePurpose) -> Option<FallbackEntry> {
        self.entries
            .read()
            .await
            .get(&(identity.to_string(), purpose))
            .cloned()
    }
}

impl Default for InMemoryFallbackStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FallbackStore for InMemoryFallbackStore {
    async fn store(&self, entry: FallbackEntry, _now: DateTime<Utc>) -> Result<(), DomainError> {
        let mut entries = self.entries.write().await;
        entries.insert(entry.key(), entry);
        Ok(())
    }

    async fn lookup_and_consume(
        &self,
        identity: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut entries = self.entries.write().await;
        let key = (identity.to_string(), purpose);

        let matched = entries
            .get(&key)
            .map(|entry| entry.accepts(code, now))
            .unwrap_or(false);

        if matched {
            entries.remove(&key);
        }

        Ok(matched)
    }

    async fn peek(
        &self,
        identity: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&(identity.to_string(), purpose))
            .map(|entry| entry.accepts(code, now))
            .unwrap_or(false))
    }

    async fn discard(&self, identity: &str, purpose: CodePurpose) -> Result<bool, DomainError> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(&(identity.to_string(), purpose)).is_some())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        Ok(before - entries.len())
    }
}
