//! Persistence contract for one-time codes.
//!
//! A store holds at most one record per (email, purpose) pair. Every
//! mutating operation is atomic at the store level: callers never
//! read-modify-write a record themselves. Mutations after issuance are
//! guarded by the record id, so an operation that raced with a reissue
//! can never touch the newer code.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{OneTimeCode, OtpPurpose};
use crate::errors::DomainError;

/// Result of recording a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptRecord {
    /// The attempt was counted; carries the new count
    Recorded { attempt_count: u32 },
    /// The record had already reached its limit; nothing changed
    LimitReached,
    /// No record with that id exists for the pair any more
    Missing,
}

/// Result of consuming a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeRecord {
    /// This caller flipped the flag
    Consumed,
    /// Someone else consumed it first
    AlreadyConsumed,
    /// No record with that id exists for the pair any more
    Missing,
}

/// Repository trait for one-time code persistence
#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Stores `code`, replacing whatever record exists for its
    /// (email, purpose) pair in one atomic step
    async fn replace(&self, code: &OneTimeCode) -> Result<(), DomainError>;

    /// Find the record for a pair
    ///
    /// Records past their expiry may still be returned; callers compare
    /// `expires_at` themselves.
    async fn find(
        &self,
        email: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OneTimeCode>, DomainError>;

    /// Adds one failed attempt to record `id`, never past its `max_attempts`
    async fn increment_attempts(
        &self,
        email: &str,
        purpose: OtpPurpose,
        id: Uuid,
    ) -> Result<AttemptRecord, DomainError>;

    /// Flips `consumed` on record `id`; exactly one caller ever sees `Consumed`
    async fn mark_consumed(
        &self,
        email: &str,
        purpose: OtpPurpose,
        id: Uuid,
    ) -> Result<ConsumeRecord, DomainError>;

    /// Removes the record for a pair
    ///
    /// Returns true if a record was removed.
    async fn delete(&self, email: &str, purpose: OtpPurpose) -> Result<bool, DomainError>;

    /// Removes every record whose `expires_at` is at or before `now`
    ///
    /// Returns the number of records removed. Stores with native key
    /// expiry may return 0.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}
