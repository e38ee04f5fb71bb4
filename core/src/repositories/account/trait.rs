//! Account repository trait defining the interface for account persistence.
//!
//! Only the lookups and updates the recovery and verification flows need
//! are part of the contract. Emails passed in are already normalized.

use async_trait::async_trait;

use crate::domain::entities::Account;
use crate::errors::DomainError;

/// Repository trait for Account entity persistence operations
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by its normalized email address
    ///
    /// # Returns
    /// * `Ok(Some(Account))` - Account found
    /// * `Ok(None)` - No account registered with that address
    /// * `Err(DomainError)` - Storage error occurred
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    /// Create a new account
    ///
    /// Fails with `DomainError::Validation` if the email is already taken.
    async fn create(&self, account: Account) -> Result<Account, DomainError>;

    /// Replace the stored password hash
    ///
    /// # Returns
    /// * `Ok(true)` - Password updated
    /// * `Ok(false)` - No account with that email
    async fn update_password_hash(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, DomainError>;

    /// Mark the account's email address as verified
    ///
    /// # Returns
    /// * `Ok(true)` - Account updated (also when it was already verified)
    /// * `Ok(false)` - No account with that email
    async fn mark_email_verified(&self, email: &str) -> Result<bool, DomainError>;
}
