//! Outcome of checking a submitted one-time code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dl_shared::error_codes;

/// Why a submitted code was rejected
///
/// The `Display` text is the reason string reported to clients.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationFailure {
    #[error("not found")]
    NotFound,

    #[error("already used")]
    AlreadyConsumed,

    #[error("max attempts exceeded")]
    AttemptsExhausted,

    #[error("expired")]
    Expired,

    #[error("invalid code")]
    Mismatch,
}

impl VerificationFailure {
    /// Machine-readable code carried in error payloads
    pub fn error_code(&self) -> &'static str {
        match self {
            VerificationFailure::NotFound => error_codes::CODE_NOT_FOUND,
            VerificationFailure::AlreadyConsumed => error_codes::CODE_ALREADY_USED,
            VerificationFailure::AttemptsExhausted => error_codes::CODE_ATTEMPTS_EXCEEDED,
            VerificationFailure::Expired => error_codes::CODE_EXPIRED,
            VerificationFailure::Mismatch => error_codes::CODE_INVALID,
        }
    }

    /// Sentence shown to the member
    pub fn user_message(&self) -> &'static str {
        match self {
            VerificationFailure::NotFound => {
                "No code was requested for this address. Please request a new code"
            }
            VerificationFailure::AlreadyConsumed => {
                "This code has already been used. Please request a new code"
            }
            VerificationFailure::AttemptsExhausted => {
                "Too many incorrect attempts. Please request a new code"
            }
            VerificationFailure::Expired => "This code has expired. Please request a new code",
            VerificationFailure::Mismatch => "The code you entered is incorrect",
        }
    }
}

/// Result of a verification call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub valid: bool,

    /// Set exactly when `valid` is false
    pub reason: Option<VerificationFailure>,

    /// Attempts left on the record, when one was found
    pub remaining_attempts: Option<u32>,
}

impl VerificationOutcome {
    /// The code matched and was consumed
    pub fn verified() -> Self {
        Self {
            valid: true,
            reason: None,
            remaining_attempts: None,
        }
    }

    /// The code was rejected
    pub fn rejected(reason: VerificationFailure, remaining_attempts: Option<u32>) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
            remaining_attempts,
        }
    }
}
