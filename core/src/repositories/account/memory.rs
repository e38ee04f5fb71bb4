//! In-process account store for development and tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::Account;
use crate::errors::DomainError;

use super::trait_::AccountRepository;

/// Account store keyed by normalized email
#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with `accounts`
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|account| (account.email.clone(), account))
            .collect();
        Self {
            accounts: Arc::new(RwLock::new(accounts)),
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(email).cloned())
    }

    async fn create(&self, account: Account) -> Result<Account, DomainError> {
        let mut accounts = self.accounts.write().await;

        if accounts.contains_key(&account.email) {
            return Err(DomainError::Validation {
                message: "Email address already registered".to_string(),
            });
        }

        accounts.insert(account.email.clone(), account.clone());
        Ok(account)
    }

    async fn update_password_hash(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, DomainError> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(email) {
            Some(account) => {
                account.set_password_hash(password_hash.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_email_verified(&self, email: &str) -> Result<bool, DomainError> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(email) {
            Some(account) => {
                account.verify_email();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
