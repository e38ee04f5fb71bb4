//! In-process code store for development and tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{OneTimeCode, OtpPurpose};
use crate::errors::DomainError;

use super::trait_::{AttemptRecord, ConsumeRecord, OtpRepository};

type Key = (String, OtpPurpose);

/// Code store backed by a `HashMap` behind one `RwLock`
///
/// Each operation runs inside a single write section, which makes it
/// atomic with respect to every other operation on the store.
#[derive(Clone, Default)]
pub struct InMemoryOtpRepository {
    codes: Arc<RwLock<HashMap<Key, OneTimeCode>>>,
}

impl InMemoryOtpRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held
    pub async fn len(&self) -> usize {
        self.codes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.codes.read().await.is_empty()
    }

    fn key(email: &str, purpose: OtpPurpose) -> Key {
        (email.to_string(), purpose)
    }
}

#[async_trait]
impl OtpRepository for InMemoryOtpRepository {
    async fn replace(&self, code: &OneTimeCode) -> Result<(), DomainError> {
        let mut codes = self.codes.write().await;
        codes.insert(Self::key(&code.email, code.purpose), code.clone());
        Ok(())
    }

    async fn find(
        &self,
        email: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OneTimeCode>, DomainError> {
        let codes = self.codes.read().await;
        Ok(codes.get(&Self::key(email, purpose)).cloned())
    }

    async fn increment_attempts(
        &self,
        email: &str,
        purpose: OtpPurpose,
        id: Uuid,
    ) -> Result<AttemptRecord, DomainError> {
        let mut codes = self.codes.write().await;
        let record = match codes.get_mut(&Self::key(email, purpose)) {
            Some(record) if record.id == id => record,
            _ => return Ok(AttemptRecord::Missing),
        };

        Ok(match record.record_failed_attempt(Utc::now()) {
            Some(attempt_count) => AttemptRecord::Recorded { attempt_count },
            None => AttemptRecord::LimitReached,
        })
    }

    async fn mark_consumed(
        &self,
        email: &str,
        purpose: OtpPurpose,
        id: Uuid,
    ) -> Result<ConsumeRecord, DomainError> {
        let mut codes = self.codes.write().await;
        let record = match codes.get_mut(&Self::key(email, purpose)) {
            Some(record) if record.id == id => record,
            _ => return Ok(ConsumeRecord::Missing),
        };

        Ok(if record.consume(Utc::now()) {
            ConsumeRecord::Consumed
        } else {
            ConsumeRecord::AlreadyConsumed
        })
    }

    async fn delete(&self, email: &str, purpose: OtpPurpose) -> Result<bool, DomainError> {
        let mut codes = self.codes.write().await;
        Ok(codes.remove(&Self::key(email, purpose)).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut codes = self.codes.write().await;
        let before = codes.len();
        codes.retain(|_, code| !code.is_expired_at(now));
        Ok((before - codes.len()) as u64)
    }
}
