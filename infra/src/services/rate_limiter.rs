//! Redis-based sliding-window rate limiter
//!
//! Each (action, key) is a sorted set of admission timestamps. Trimming,
//! counting and recording run in one Lua script so concurrent requests on
//! different instances cannot both take the last slot.

use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, Script};
use std::sync::Arc;
use uuid::Uuid;

use dl_core::{DomainError, DomainResult, RateLimitAction, RateLimitStatus, RateLimiterTrait};
use dl_shared::RateLimitConfig;

use crate::cache::redis_client::RedisClient;

/// Redis key prefix for rate limit windows
const RATE_LIMIT_KEY_PREFIX: &str = "rate_limit";

/// ARGV: now (ms), window (ms), limit, member.
/// Returns {1, count_after} when admitted, {0, oldest_score} when full.
const SLIDING_WINDOW_SCRIPT: &str = r#"
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local limit = tonumber(ARGV[3])
redis.call('ZREMRANGEBYSCORE', KEYS[1], '-inf', now - window)
local count = redis.call('ZCARD', KEYS[1])
if count >= limit then
    local oldest = redis.call('ZRANGE', KEYS[1], 0, 0, 'WITHSCORES')
    return {0, tonumber(oldest[2]) or now}
end
redis.call('ZADD', KEYS[1], now, ARGV[4])
redis.call('PEXPIRE', KEYS[1], window)
return {1, count + 1}
"#;

/// Redis-based implementation of the rate limiter trait
pub struct RedisRateLimiter {
    redis_client: Arc<RedisClient>,
    config: RateLimitConfig,
    script: Script,
}

impl RedisRateLimiter {
    /// Create a new Redis-based rate limiter
    pub fn new(redis_client: Arc<RedisClient>, config: RateLimitConfig) -> Self {
        Self {
            redis_client,
            config,
            script: Script::new(SLIDING_WINDOW_SCRIPT),
        }
    }

    fn format_key(&self, action: RateLimitAction, key: &str) -> String {
        self.redis_client
            .key(&format!("{}:{}:{}", RATE_LIMIT_KEY_PREFIX, action.as_str(), key))
    }
}

#[async_trait]
impl RateLimiterTrait for RedisRateLimiter {
    async fn check_and_record(
        &self,
        action: RateLimitAction,
        key: &str,
    ) -> DomainResult<RateLimitStatus> {
        let limit = action.limit(&self.config);
        let window_ms = limit.bounded_window_seconds() as i64 * 1000;
        let now = Utc::now().timestamp_millis();
        let member = format!("{}-{}", now, Uuid::new_v4());
        let mut conn = self.redis_client.get_connection();

        let (admitted, value): (i64, i64) = self
            .script
            .key(self.format_key(action, key))
            .arg(now)
            .arg(window_ms)
            .arg(limit.max_requests)
            .arg(member)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                tracing::error!(
                    action = %action,
                    error = %e,
                    event = "rate_limit_backend_failed",
                    "Rate limiter backend failed"
                );
                DomainError::Storage {
                    message: format!("Failed to evaluate rate limit: {}", e),
                }
            })?;

        if admitted == 1 {
            return Ok(RateLimitStatus::Allowed {
                remaining: limit.max_requests.saturating_sub(value as u32),
                limit: limit.max_requests,
                window_seconds: limit.window_seconds,
            });
        }

        let retry_after_seconds = retry_after_seconds(value, window_ms, now);
        tracing::warn!(
            action = %action,
            retry_after_seconds = retry_after_seconds,
            event = "rate_limit_exceeded",
            "Rate limit exceeded"
        );

        Ok(RateLimitStatus::Exceeded {
            retry_after_seconds,
            limit: limit.max_requests,
            window_seconds: limit.window_seconds,
        })
    }

    async fn reset(&self, action: RateLimitAction, key: &str) -> DomainResult<()> {
        let key = self.format_key(action, key);

        self.redis_client
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.del::<_, ()>(key).await })
            })
            .await
            .map_err(|e| DomainError::Storage {
                message: format!("Failed to reset rate limit: {}", e),
            })
    }
}

/// Seconds until the oldest admission leaves the window, at least 1
fn retry_after_seconds(oldest_ms: i64, window_ms: i64, now_ms: i64) -> u64 {
    let remaining_ms = (oldest_ms + window_ms - now_ms).max(0);
    ((remaining_ms + 999) / 1000).max(1) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(retry_after_seconds(0, 60_000, 40_000), 20);
        assert_eq!(retry_after_seconds(0, 60_000, 40_001), 20);
        assert_eq!(retry_after_seconds(0, 60_000, 59_999), 1);
    }

    #[test]
    fn test_retry_after_never_zero() {
        assert_eq!(retry_after_seconds(0, 60_000, 60_000), 1);
        assert_eq!(retry_after_seconds(0, 60_000, 90_000), 1);
    }
}
