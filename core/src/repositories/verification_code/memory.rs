//! In-memory verification code repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::VerificationCode;
use crate::domain::value_objects::CodePurpose;
use crate::errors::DomainError;

use super::r#trait::VerificationCodeRepository;

/// Verification code store backed by a `HashMap` behind a tokio `RwLock`
///
/// Suitable for single-process deployments and tests. All mutations take the
/// write lock, so `consume` is atomic with respect to other callers.
#[derive(Clone)]
pub struct InMemoryVerificationCodeRepository {
    codes: Arc<RwLock<HashMap<Uuid, VerificationCode>>>,
}

impl InMemoryVerificationCodeRepository {
    pub fn new() -> Self {
        Self {
            codes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored records, used or not
    pub async fn len(&self) -> usize {
        self.codes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.codes.read().await.is_empty()
    }

    /// Snapshot of every record for (identity, purpose), oldest first
    pub async fn records_for(&self, identity: &str, purpose: CodePurpose) -> Vec<VerificationCode> {
        let codes = self.codes.read().await;
        let mut records: Vec<VerificationCode> = codes
            .values()
            .filter(|c| c.identity == identity && c.purpose == purpose)
            .cloned()
            .collect();
        records.sort_by_key(|c| c.issued_at);
        records
    }
}

impl Default for InMemoryVerificationCodeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VerificationCodeRepository for InMemoryVerificationCodeRepository {
    async fn invalidate_prior(&self, identity: &str, purpose: CodePurpose) -> Result<usize, DomainError> {
        let mut codes = self.codes.write().await;
        let mut count = 0;

        for code in codes.values_mut() {
            if code.identity == identity && code.purpose == purpose && !code.used {
                code.mark_as_used();
                count += 1;
            }
        }

        Ok(count)
    }

    async fn save(&self, code: VerificationCode) -> Result<VerificationCode, DomainError> {
        let mut codes = self.codes.write().await;

        if codes.contains_key(&code.id) {
            return Err(DomainError::storage(format!(
                "Verification code {} already exists",
                code.id
            )));
        }

        codes.insert(code.id, code.clone());
        Ok(code)
    }

    async fn lookup_valid(
        &self,
        identity: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>, DomainError> {
        let codes = self.codes.read().await;
        Ok(codes
            .values()
            .filter(|c| c.accepts(identity, code, purpose, now))
            .max_by_key(|c| c.issued_at)
            .cloned())
    }

    async fn consume(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut codes = self.codes.write().await;

        match codes.get_mut(&id) {
            Some(code) if code.is_valid_at(now) => {
                code.mark_as_used();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut codes = self.codes.write().await;
        let before = codes.len();
        codes.retain(|_, code| !code.is_expired_at(now));
        Ok(before - codes.len())
    }
}
