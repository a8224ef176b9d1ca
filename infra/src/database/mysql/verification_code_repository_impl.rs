//! MySQL implementation of the VerificationCodeRepository trait.
//!
//! Codes are retired by flipping `used` with a conditional UPDATE; the
//! affected row count tells the caller whether it won the race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use dt_core::errors::DomainError;
use dt_core::repositories::VerificationCodeRepository;
use dt_core::{CodePurpose, VerificationCode};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS verification_codes (
        id CHAR(36) NOT NULL PRIMARY KEY,
        identity VARCHAR(254) NOT NULL,
        code VARCHAR(12) NOT NULL,
        purpose VARCHAR(32) NOT NULL,
        issued_at DATETIME(6) NOT NULL,
        expires_at DATETIME(6) NOT NULL,
        used BOOLEAN NOT NULL DEFAULT FALSE,
        INDEX idx_verification_codes_lookup (identity, purpose, used),
        INDEX idx_verification_codes_expires (expires_at)
    )
"#;

/// MySQL implementation of VerificationCodeRepository
pub struct MySqlVerificationCodeRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlVerificationCodeRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Create the `verification_codes` table if it does not exist
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create verification_codes table: {}", e)))?;
        Ok(())
    }

    /// Convert database row to VerificationCode entity
    fn row_to_code(row: &sqlx::mysql::MySqlRow) -> Result<VerificationCode, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| DomainError::storage(format!("Failed to get id: {}", e)))?;

        let purpose: String = row
            .try_get("purpose")
            .map_err(|e| DomainError::storage(format!("Failed to get purpose: {}", e)))?;

        Ok(VerificationCode {
            id: Uuid::parse_str(&id)
                .map_err(|e| DomainError::storage(format!("Invalid code UUID: {}", e)))?,
            identity: row
                .try_get("identity")
                .map_err(|e| DomainError::storage(format!("Failed to get identity: {}", e)))?,
            code: row
                .try_get("code")
                .map_err(|e| DomainError::storage(format!("Failed to get code: {}", e)))?,
            purpose: purpose.parse::<CodePurpose>().map_err(DomainError::storage)?,
            issued_at: row
                .try_get::<DateTime<Utc>, _>("issued_at")
                .map_err(|e| DomainError::storage(format!("Failed to get issued_at: {}", e)))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| DomainError::storage(format!("Failed to get expires_at: {}", e)))?,
            used: row
                .try_get("used")
                .map_err(|e| DomainError::storage(format!("Failed to get used: {}", e)))?,
        })
    }
}

#[async_trait]
impl VerificationCodeRepository for MySqlVerificationCodeRepository {
    async fn invalidate_prior(&self, identity: &str, purpose: CodePurpose) -> Result<usize, DomainError> {
        let query = r#"
            UPDATE verification_codes
            SET used = TRUE
            WHERE identity = ? AND purpose = ? AND used = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(identity)
            .bind(purpose.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to invalidate prior codes: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }

    async fn save(&self, code: VerificationCode) -> Result<VerificationCode, DomainError> {
        let query = r#"
            INSERT INTO verification_codes (
                id, identity, code, purpose, issued_at, expires_at, used
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(code.id.to_string())
            .bind(&code.identity)
            .bind(&code.code)
            .bind(code.purpose.as_str())
            .bind(code.issued_at)
            .bind(code.expires_at)
            .bind(code.used)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to save verification code: {}", e)))?;

        Ok(code)
    }

    async fn lookup_valid(
        &self,
        identity: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>, DomainError> {
        // The code value is compared in constant time after the fetch
        let query = r#"
            SELECT id, identity, code, purpose, issued_at, expires_at, used
            FROM verification_codes
            WHERE identity = ? AND purpose = ? AND used = FALSE AND expires_at > ?
            ORDER BY issued_at DESC
        "#;

        let rows = sqlx::query(query)
            .bind(identity)
            .bind(purpose.as_str())
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to look up verification code: {}", e)))?;

        for row in &rows {
            let candidate = Self::row_to_code(row)?;
            if candidate.accepts(identity, code, purpose, now) {
                return Ok(Some(candidate));
            }
        }

        Ok(None)
    }

    async fn consume(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE verification_codes
            SET used = TRUE
            WHERE id = ? AND used = FALSE AND expires_at > ?
        "#;

        let result = sqlx::query(query)
            .bind(id.to_string())
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to consume verification code: {}", e)))?;

        Ok(result.rows_affected() == 1)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM verification_codes WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to purge expired codes: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }
}
