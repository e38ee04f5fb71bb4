//! Integration tests for the Redis code store and rate limiter
//!
//! Require a running Redis; set `REDIS_URL` to point elsewhere than
//! localhost. Run with `cargo test -p dl_infra -- --ignored`.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use dl_core::{
    AttemptRecord, ConsumeRecord, OneTimeCode, OtpPurpose, OtpRepository, RateLimitAction,
    RateLimiterTrait,
};
use dl_infra::cache::{CacheConfig, RedisClient, RedisOtpRepository};
use dl_infra::services::RedisRateLimiter;
use dl_shared::config::{RateLimitConfig, WindowLimit};

async fn redis_client() -> Arc<RedisClient> {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let config = CacheConfig {
        key_prefix: Some(format!("dl-test-{}", Uuid::new_v4())),
        ..CacheConfig::new(url)
    };
    Arc::new(
        RedisClient::new(config)
            .await
            .expect("Failed to connect to Redis"),
    )
}

fn unique_email() -> String {
    format!("{}@example.com", Uuid::new_v4().simple())
}

fn code_for(email: &str, purpose: OtpPurpose) -> OneTimeCode {
    OneTimeCode::issue_at(email.to_string(), purpose, Utc::now(), Duration::minutes(10), 3)
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_replace_and_find() {
    let repo = RedisOtpRepository::new(redis_client().await);
    let email = unique_email();
    let code = code_for(&email, OtpPurpose::PasswordReset);

    repo.replace(&code).await.unwrap();

    let found = repo
        .find(&email, OtpPurpose::PasswordReset)
        .await
        .unwrap()
        .expect("record should exist");
    assert_eq!(found.id, code.id);
    assert_eq!(found.code, code.code);
    assert_eq!(found.attempt_count, 0);
    assert!(!found.consumed);
    assert_eq!(
        found.expires_at.timestamp_millis(),
        code.expires_at.timestamp_millis()
    );

    assert!(repo
        .find(&email, OtpPurpose::EmailVerification)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_replace_supersedes_previous_record() {
    let repo = RedisOtpRepository::new(redis_client().await);
    let email = unique_email();
    let first = code_for(&email, OtpPurpose::PasswordReset);
    let second = code_for(&email, OtpPurpose::PasswordReset);

    repo.replace(&first).await.unwrap();
    repo.replace(&second).await.unwrap();

    let found = repo
        .find(&email, OtpPurpose::PasswordReset)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, second.id);

    // A stale id must not touch the new record
    let stale = repo
        .increment_attempts(&email, OtpPurpose::PasswordReset, first.id)
        .await
        .unwrap();
    assert_eq!(stale, AttemptRecord::Missing);
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_increment_stops_at_max_attempts() {
    let repo = RedisOtpRepository::new(redis_client().await);
    let email = unique_email();
    let code = code_for(&email, OtpPurpose::EmailVerification);
    repo.replace(&code).await.unwrap();

    for expected in 1..=3 {
        let record = repo
            .increment_attempts(&email, OtpPurpose::EmailVerification, code.id)
            .await
            .unwrap();
        assert_eq!(record, AttemptRecord::Recorded { attempt_count: expected });
    }

    let record = repo
        .increment_attempts(&email, OtpPurpose::EmailVerification, code.id)
        .await
        .unwrap();
    assert_eq!(record, AttemptRecord::LimitReached);

    let found = repo
        .find(&email, OtpPurpose::EmailVerification)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.attempt_count, 3);
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_mark_consumed_once() {
    let repo = RedisOtpRepository::new(redis_client().await);
    let email = unique_email();
    let code = code_for(&email, OtpPurpose::PasswordReset);
    repo.replace(&code).await.unwrap();

    let first = repo
        .mark_consumed(&email, OtpPurpose::PasswordReset, code.id)
        .await
        .unwrap();
    let second = repo
        .mark_consumed(&email, OtpPurpose::PasswordReset, code.id)
        .await
        .unwrap();

    assert_eq!(first, ConsumeRecord::Consumed);
    assert_eq!(second, ConsumeRecord::AlreadyConsumed);
    assert!(repo.delete(&email, OtpPurpose::PasswordReset).await.unwrap());
    assert!(!repo.delete(&email, OtpPurpose::PasswordReset).await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_rate_limiter_window() {
    let config = RateLimitConfig {
        issue: WindowLimit::new(2, 60),
        ..RateLimitConfig::default()
    };
    let limiter = RedisRateLimiter::new(redis_client().await, config);
    let key = unique_email();

    assert!(limiter
        .check_and_record(RateLimitAction::IssueCode, &key)
        .await
        .unwrap()
        .is_allowed());
    assert!(limiter
        .check_and_record(RateLimitAction::IssueCode, &key)
        .await
        .unwrap()
        .is_allowed());

    let rejected = limiter
        .check_and_record(RateLimitAction::IssueCode, &key)
        .await
        .unwrap();
    assert!(!rejected.is_allowed());
    let retry_after = rejected.retry_after_seconds().unwrap();
    assert!((1..=60).contains(&retry_after));

    // Verification has its own window
    assert!(limiter
        .check_and_record(RateLimitAction::VerifyCode, &key)
        .await
        .unwrap()
        .is_allowed());

    limiter.reset(RateLimitAction::IssueCode, &key).await.unwrap();
    assert!(limiter
        .check_and_record(RateLimitAction::IssueCode, &key)
        .await
        .unwrap()
        .is_allowed());
}
