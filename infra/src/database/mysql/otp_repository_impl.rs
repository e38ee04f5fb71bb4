//! MySQL implementation of the OtpRepository trait.
//!
//! One row per (email, purpose), enforced by a unique key. Replacement is
//! a single upsert on that key; attempt and consume updates are
//! conditional on the row id, and the affected-row count decides which
//! caller won.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlRow, MySqlPool, Row};
use uuid::Uuid;

use dl_core::{AttemptRecord, ConsumeRecord, DomainError, OneTimeCode, OtpPurpose, OtpRepository};

/// MySQL implementation of OtpRepository
pub struct MySqlOtpRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlOtpRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to OneTimeCode entity
    fn row_to_code(row: &MySqlRow) -> Result<OneTimeCode, DomainError> {
        let id: String = row.try_get("id").map_err(Self::db_error)?;
        let purpose: String = row.try_get("purpose").map_err(Self::db_error)?;

        Ok(OneTimeCode {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Storage {
                message: format!("Invalid UUID: {}", e),
            })?,
            email: row.try_get("email").map_err(Self::db_error)?,
            code: row.try_get("code").map_err(Self::db_error)?,
            purpose: purpose
                .parse()
                .map_err(|message| DomainError::Storage { message })?,
            consumed: row.try_get("consumed").map_err(Self::db_error)?,
            attempt_count: row.try_get("attempt_count").map_err(Self::db_error)?,
            max_attempts: row.try_get("max_attempts").map_err(Self::db_error)?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(Self::db_error)?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(Self::db_error)?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(Self::db_error)?,
        })
    }

    fn db_error(e: sqlx::Error) -> DomainError {
        tracing::error!(error = %e, "One-time code query failed");
        DomainError::Storage {
            message: format!("Database query failed: {}", e),
        }
    }

    async fn row_exists(&self, id: Uuid) -> Result<bool, DomainError> {
        let row = sqlx::query("SELECT 1 FROM one_time_codes WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::db_error)?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl OtpRepository for MySqlOtpRepository {
    async fn replace(&self, code: &OneTimeCode) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO one_time_codes (
                id, email, purpose, code, consumed, attempt_count,
                max_attempts, expires_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                id = VALUES(id),
                code = VALUES(code),
                consumed = VALUES(consumed),
                attempt_count = VALUES(attempt_count),
                max_attempts = VALUES(max_attempts),
                expires_at = VALUES(expires_at),
                created_at = VALUES(created_at),
                updated_at = VALUES(updated_at)
        "#;

        sqlx::query(query)
            .bind(code.id.to_string())
            .bind(&code.email)
            .bind(code.purpose.as_str())
            .bind(&code.code)
            .bind(code.consumed)
            .bind(code.attempt_count)
            .bind(code.max_attempts)
            .bind(code.expires_at)
            .bind(code.created_at)
            .bind(code.updated_at)
            .execute(&self.pool)
            .await
            .map_err(Self::db_error)?;

        Ok(())
    }

    async fn find(
        &self,
        email: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OneTimeCode>, DomainError> {
        let query = r#"
            SELECT id, email, purpose, code, consumed, attempt_count,
                   max_attempts, expires_at, created_at, updated_at
            FROM one_time_codes
            WHERE email = ? AND purpose = ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(email)
            .bind(purpose.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::db_error)?;

        row.as_ref().map(Self::row_to_code).transpose()
    }

    async fn increment_attempts(
        &self,
        _email: &str,
        _purpose: OtpPurpose,
        id: Uuid,
    ) -> Result<AttemptRecord, DomainError> {
        let mut tx = self.pool.begin().await.map_err(Self::db_error)?;

        let updated = sqlx::query(
            r#"
            UPDATE one_time_codes
            SET attempt_count = attempt_count + 1, updated_at = ?
            WHERE id = ? AND attempt_count < max_attempts
            "#,
        )
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(Self::db_error)?;

        let row = sqlx::query("SELECT attempt_count FROM one_time_codes WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(Self::db_error)?;

        tx.commit().await.map_err(Self::db_error)?;

        Ok(match (updated.rows_affected(), row) {
            (1, Some(row)) => AttemptRecord::Recorded {
                attempt_count: row.try_get("attempt_count").map_err(Self::db_error)?,
            },
            (_, Some(_)) => AttemptRecord::LimitReached,
            (_, None) => AttemptRecord::Missing,
        })
    }

    async fn mark_consumed(
        &self,
        _email: &str,
        _purpose: OtpPurpose,
        id: Uuid,
    ) -> Result<ConsumeRecord, DomainError> {
        let updated = sqlx::query(
            r#"
            UPDATE one_time_codes
            SET consumed = TRUE, updated_at = ?
            WHERE id = ? AND consumed = FALSE
            "#,
        )
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(Self::db_error)?;

        if updated.rows_affected() == 1 {
            return Ok(ConsumeRecord::Consumed);
        }

        Ok(if self.row_exists(id).await? {
            ConsumeRecord::AlreadyConsumed
        } else {
            ConsumeRecord::Missing
        })
    }

    async fn delete(&self, email: &str, purpose: OtpPurpose) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM one_time_codes WHERE email = ? AND purpose = ?")
            .bind(email)
            .bind(purpose.as_str())
            .execute(&self.pool)
            .await
            .map_err(Self::db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM one_time_codes WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(Self::db_error)?;

        Ok(result.rows_affected())
    }
}
