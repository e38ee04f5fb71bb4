//! Unit tests for the in-memory account store

use crate::domain::entities::Account;
use crate::errors::DomainError;
use crate::repositories::account::{AccountRepository, InMemoryAccountRepository};

fn ada() -> Account {
    Account::new(
        "ada@devlink.io".to_string(),
        "Ada".to_string(),
        "$2b$04$old".to_string(),
    )
}

#[tokio::test]
async fn test_create_and_find() {
    let repo = InMemoryAccountRepository::new();
    let account = ada();

    let created = repo.create(account.clone()).await.unwrap();
    assert_eq!(created.id, account.id);

    let found = repo.find_by_email("ada@devlink.io").await.unwrap();
    assert_eq!(found.map(|a| a.id), Some(account.id));
    assert!(repo.find_by_email("bob@devlink.io").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let repo = InMemoryAccountRepository::new();
    repo.create(ada()).await.unwrap();

    let result = repo.create(ada()).await;
    assert!(matches!(result, Err(DomainError::Validation { .. })));
}

#[tokio::test]
async fn test_update_password_hash() {
    let repo = InMemoryAccountRepository::with_accounts([ada()]);

    assert!(repo
        .update_password_hash("ada@devlink.io", "$2b$04$new")
        .await
        .unwrap());
    assert!(!repo
        .update_password_hash("bob@devlink.io", "$2b$04$new")
        .await
        .unwrap());

    let stored = repo.find_by_email("ada@devlink.io").await.unwrap().unwrap();
    assert_eq!(stored.password_hash, "$2b$04$new");
}

#[tokio::test]
async fn test_mark_email_verified() {
    let repo = InMemoryAccountRepository::with_accounts([ada()]);

    assert!(repo.mark_email_verified("ada@devlink.io").await.unwrap());
    assert!(repo.mark_email_verified("ada@devlink.io").await.unwrap());
    assert!(!repo.mark_email_verified("bob@devlink.io").await.unwrap());

    let stored = repo.find_by_email("ada@devlink.io").await.unwrap().unwrap();
    assert!(stored.email_verified);
}
