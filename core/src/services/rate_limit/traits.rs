//! Rate limiting trait

use async_trait::async_trait;

use crate::errors::DomainResult;

use super::types::{RateLimitAction, RateLimitStatus};

/// Sliding-window limiter keyed by an identity string
#[async_trait]
pub trait RateLimiterTrait: Send + Sync {
    /// Count one request for `key` if its window still has room
    ///
    /// The check and the count happen as one step. Rejected requests are
    /// not counted.
    async fn check_and_record(
        &self,
        action: RateLimitAction,
        key: &str,
    ) -> DomainResult<RateLimitStatus>;

    /// Forget every request counted for `key`
    async fn reset(&self, action: RateLimitAction, key: &str) -> DomainResult<()>;
}
