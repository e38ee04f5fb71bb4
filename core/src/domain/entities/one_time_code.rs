//! One-time code entity for email-based account recovery and verification.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::VerificationFailure;

/// Default number of verification attempts allowed per code
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Length of the code
pub const CODE_LENGTH: usize = 6;

/// Default expiration time for codes (10 minutes)
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 10;

/// Smallest and largest code; codes never start with a zero
const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;

/// What a code proves control of the address for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    /// Recovering an account through a new password
    PasswordReset,
    /// Confirming ownership of the address at registration
    EmailVerification,
}

impl OtpPurpose {
    /// Stable identifier used in storage keys and columns
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::PasswordReset => "password_reset",
            OtpPurpose::EmailVerification => "email_verification",
        }
    }
}

impl std::fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OtpPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password_reset" => Ok(OtpPurpose::PasswordReset),
            "email_verification" => Ok(OtpPurpose::EmailVerification),
            _ => Err(format!("Invalid code purpose: {}", s)),
        }
    }
}

/// Where a code sits in its lifecycle
///
/// `Consumed`, `AttemptsExhausted` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeState {
    Active,
    Consumed,
    AttemptsExhausted,
    Expired,
}

impl CodeState {
    /// The verification failure a terminal state produces
    pub fn failure(&self) -> Option<VerificationFailure> {
        match self {
            CodeState::Active => None,
            CodeState::Consumed => Some(VerificationFailure::AlreadyConsumed),
            CodeState::AttemptsExhausted => Some(VerificationFailure::AttemptsExhausted),
            CodeState::Expired => Some(VerificationFailure::Expired),
        }
    }
}

/// A one-time code issued to an email address for one purpose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneTimeCode {
    /// Identifies this issuance; a reissued code gets a new id
    pub id: Uuid,

    /// Normalized (trimmed, lowercase) address the code was sent to
    pub email: String,

    /// The 6-digit code
    pub code: String,

    /// What the code is for
    pub purpose: OtpPurpose,

    /// Set once, on the first successful verification
    pub consumed: bool,

    /// Failed verification attempts so far
    pub attempt_count: u32,

    /// Failed attempts after which the code is locked
    pub max_attempts: u32,

    /// Fixed at issuance, never extended
    pub expires_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl OneTimeCode {
    /// Issues a code with the default lifetime and attempt limit
    pub fn new(email: String, purpose: OtpPurpose) -> Self {
        Self::issue_at(
            email,
            purpose,
            Utc::now(),
            Duration::minutes(DEFAULT_EXPIRATION_MINUTES),
            DEFAULT_MAX_ATTEMPTS,
        )
    }

    /// Issues a code at `now` that lives for `ttl`
    pub fn issue_at(
        email: String,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
        ttl: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            code: Self::generate_code(),
            purpose,
            consumed: false,
            attempt_count: 0,
            max_attempts,
            expires_at: now + ttl,
            created_at: now,
            updated_at: now,
        }
    }

    /// Generates a uniformly random code in 100000..=999999 from the OS CSPRNG
    pub fn generate_code() -> String {
        OsRng.gen_range(CODE_MIN..=CODE_MAX).to_string()
    }

    /// Whether `input` has the shape of a code (six ASCII digits)
    pub fn is_well_formed(input: &str) -> bool {
        input.len() == CODE_LENGTH && input.chars().all(|c| c.is_ascii_digit())
    }

    /// Whether the code has expired at `now`; a code is dead at its expiry instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the attempt limit has been reached
    pub fn attempts_exhausted(&self) -> bool {
        self.attempt_count >= self.max_attempts
    }

    /// Lifecycle state at `now`.
    ///
    /// Checked in the same order verification uses: consumed, then
    /// attempts, then expiry.
    pub fn state_at(&self, now: DateTime<Utc>) -> CodeState {
        if self.consumed {
            CodeState::Consumed
        } else if self.attempts_exhausted() {
            CodeState::AttemptsExhausted
        } else if self.is_expired_at(now) {
            CodeState::Expired
        } else {
            CodeState::Active
        }
    }

    /// Compares `input` with the stored code in constant time
    pub fn matches(&self, input: &str) -> bool {
        constant_time_eq(self.code.as_bytes(), input.as_bytes())
    }

    /// Gets the number of remaining verification attempts
    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempt_count)
    }

    /// Records one failed attempt unless the limit is already reached.
    ///
    /// Returns the new attempt count.
    pub fn record_failed_attempt(&mut self, now: DateTime<Utc>) -> Option<u32> {
        if self.attempts_exhausted() {
            return None;
        }
        self.attempt_count += 1;
        self.updated_at = now;
        Some(self.attempt_count)
    }

    /// Marks the code consumed; returns false if it already was
    pub fn consume(&mut self, now: DateTime<Utc>) -> bool {
        if self.consumed {
            return false;
        }
        self.consumed = true;
        self.updated_at = now;
        true
    }
}
