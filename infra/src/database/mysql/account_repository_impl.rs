//! MySQL implementation of the AccountRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlRow, MySqlPool, Row};
use uuid::Uuid;

use dl_core::{Account, AccountRepository, DomainError};

/// MySQL implementation of AccountRepository
pub struct MySqlAccountRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlAccountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to Account entity
    fn row_to_account(row: &MySqlRow) -> Result<Account, DomainError> {
        let id: String = row.try_get("id").map_err(Self::db_error)?;

        Ok(Account {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Storage {
                message: format!("Invalid UUID: {}", e),
            })?,
            email: row.try_get("email").map_err(Self::db_error)?,
            display_name: row.try_get("display_name").map_err(Self::db_error)?,
            password_hash: row.try_get("password_hash").map_err(Self::db_error)?,
            email_verified: row.try_get("email_verified").map_err(Self::db_error)?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(Self::db_error)?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(Self::db_error)?,
        })
    }

    fn db_error(e: sqlx::Error) -> DomainError {
        tracing::error!(error = %e, "Account query failed");
        DomainError::Storage {
            message: format!("Database query failed: {}", e),
        }
    }
}

#[async_trait]
impl AccountRepository for MySqlAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let query = r#"
            SELECT id, email, display_name, password_hash, email_verified,
                   created_at, updated_at
            FROM accounts
            WHERE email = ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::db_error)?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn create(&self, account: Account) -> Result<Account, DomainError> {
        let query = r#"
            INSERT INTO accounts (
                id, email, display_name, password_hash, email_verified,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(account.id.to_string())
            .bind(&account.email)
            .bind(&account.display_name)
            .bind(&account.password_hash)
            .bind(account.email_verified)
            .bind(account.created_at)
            .bind(account.updated_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(account),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(DomainError::Validation {
                    message: "Email address already registered".to_string(),
                })
            }
            Err(e) => Err(Self::db_error(e)),
        }
    }

    async fn update_password_hash(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, DomainError> {
        let result =
            sqlx::query("UPDATE accounts SET password_hash = ?, updated_at = ? WHERE email = ?")
                .bind(password_hash)
                .bind(Utc::now())
                .bind(email)
                .execute(&self.pool)
                .await
                .map_err(Self::db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_email_verified(&self, email: &str) -> Result<bool, DomainError> {
        let result =
            sqlx::query("UPDATE accounts SET email_verified = TRUE, updated_at = ? WHERE email = ?")
                .bind(Utc::now())
                .bind(email)
                .execute(&self.pool)
                .await
                .map_err(Self::db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
