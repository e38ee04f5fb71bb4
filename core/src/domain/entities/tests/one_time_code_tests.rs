//! Unit tests for the one-time code entity

use chrono::{Duration, Utc};
use std::collections::HashSet;

use crate::domain::entities::one_time_code::{
    CodeState, OneTimeCode, OtpPurpose, CODE_LENGTH, DEFAULT_EXPIRATION_MINUTES,
    DEFAULT_MAX_ATTEMPTS,
};
use crate::domain::value_objects::VerificationFailure;

fn issue(ttl_minutes: i64, max_attempts: u32) -> OneTimeCode {
    OneTimeCode::issue_at(
        "dev@devlink.io".to_string(),
        OtpPurpose::PasswordReset,
        Utc::now(),
        Duration::minutes(ttl_minutes),
        max_attempts,
    )
}

#[test]
fn test_new_code_defaults() {
    let code = OneTimeCode::new("dev@devlink.io".to_string(), OtpPurpose::EmailVerification);

    assert_eq!(code.email, "dev@devlink.io");
    assert_eq!(code.purpose, OtpPurpose::EmailVerification);
    assert_eq!(code.code.len(), CODE_LENGTH);
    assert_eq!(code.attempt_count, 0);
    assert_eq!(code.max_attempts, DEFAULT_MAX_ATTEMPTS);
    assert!(!code.consumed);
    assert_eq!(
        code.expires_at - code.created_at,
        Duration::minutes(DEFAULT_EXPIRATION_MINUTES)
    );
    assert_eq!(code.state_at(Utc::now()), CodeState::Active);
}

#[test]
fn test_generated_codes_stay_in_range() {
    for _ in 0..1000 {
        let code = OneTimeCode::generate_code();
        assert_eq!(code.len(), CODE_LENGTH);

        let value: u32 = code.parse().expect("code should be numeric");
        assert!((100_000..=999_999).contains(&value));
    }
}

#[test]
fn test_generated_codes_vary() {
    let codes: HashSet<String> = (0..100).map(|_| OneTimeCode::generate_code()).collect();
    assert!(codes.len() > 1);
}

#[test]
fn test_each_issuance_gets_a_fresh_id() {
    let first = issue(10, 3);
    let second = issue(10, 3);
    assert_ne!(first.id, second.id);
}

#[test]
fn test_well_formed_check() {
    assert!(OneTimeCode::is_well_formed("123456"));
    assert!(!OneTimeCode::is_well_formed("12345"));
    assert!(!OneTimeCode::is_well_formed("1234567"));
    assert!(!OneTimeCode::is_well_formed("12a456"));
    assert!(!OneTimeCode::is_well_formed(" 23456"));
    assert!(!OneTimeCode::is_well_formed(""));
}

#[test]
fn test_matches_is_exact() {
    let mut code = issue(10, 3);
    code.code = "482913".to_string();

    assert!(code.matches("482913"));
    assert!(!code.matches("482914"));
    assert!(!code.matches("48291"));
    assert!(!code.matches(""));
}

#[test]
fn test_expiry_boundary() {
    let code = issue(10, 3);

    assert!(!code.is_expired_at(code.expires_at - Duration::seconds(1)));
    assert!(code.is_expired_at(code.expires_at));
    assert!(code.is_expired_at(code.expires_at + Duration::seconds(1)));
}

#[test]
fn test_failed_attempts_stop_at_limit() {
    let mut code = issue(10, 3);
    let now = Utc::now();

    assert_eq!(code.record_failed_attempt(now), Some(1));
    assert_eq!(code.remaining_attempts(), 2);
    assert_eq!(code.record_failed_attempt(now), Some(2));
    assert_eq!(code.record_failed_attempt(now), Some(3));
    assert_eq!(code.record_failed_attempt(now), None);

    assert_eq!(code.attempt_count, 3);
    assert_eq!(code.remaining_attempts(), 0);
    assert!(code.attempts_exhausted());
}

#[test]
fn test_consume_only_once() {
    let mut code = issue(10, 3);
    let now = Utc::now();

    assert!(code.consume(now));
    assert!(!code.consume(now));
    assert!(code.consumed);
}

#[test]
fn test_state_precedence() {
    let mut code = issue(10, 3);
    let now = code.created_at;
    let later = code.expires_at + Duration::minutes(1);

    assert_eq!(code.state_at(now), CodeState::Active);
    assert_eq!(code.state_at(later), CodeState::Expired);

    code.attempt_count = code.max_attempts;
    assert_eq!(code.state_at(later), CodeState::AttemptsExhausted);

    code.consumed = true;
    assert_eq!(code.state_at(later), CodeState::Consumed);
}

#[test]
fn test_state_failures() {
    assert_eq!(CodeState::Active.failure(), None);
    assert_eq!(
        CodeState::Consumed.failure(),
        Some(VerificationFailure::AlreadyConsumed)
    );
    assert_eq!(
        CodeState::AttemptsExhausted.failure(),
        Some(VerificationFailure::AttemptsExhausted)
    );
    assert_eq!(CodeState::Expired.failure(), Some(VerificationFailure::Expired));
}

#[test]
fn test_purpose_round_trips_through_str() {
    for purpose in [OtpPurpose::PasswordReset, OtpPurpose::EmailVerification] {
        assert_eq!(purpose.as_str().parse::<OtpPurpose>(), Ok(purpose));
    }
    assert!("login".parse::<OtpPurpose>().is_err());
}

#[test]
fn test_purpose_serializes_snake_case() {
    let json = serde_json::to_string(&OtpPurpose::EmailVerification).unwrap();
    assert_eq!(json, "\"email_verification\"");

    let parsed: OtpPurpose = serde_json::from_str("\"password_reset\"").unwrap();
    assert_eq!(parsed, OtpPurpose::PasswordReset);
}
