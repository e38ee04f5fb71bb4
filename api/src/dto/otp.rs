use serde::{Deserialize, Serialize};
use validator::Validate;

use dl_core::{OtpPurpose, VerificationOutcome};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendCodeRequest {
    #[validate(email, length(max = 254))]
    pub email: String,

    /// `password_reset` or `email_verification`
    pub purpose: OtpPurpose,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyCodeRequest {
    #[validate(email, length(max = 254))]
    pub email: String,

    /// 6-digit code from the mail; the format itself is checked by the
    /// service so a malformed code is reported like a wrong one
    #[validate(length(min = 1, max = 32))]
    pub code: String,

    pub purpose: OtpPurpose,

    /// Required when `purpose` is `password_reset`
    #[serde(default)]
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email, length(max = 254))]
    pub email: String,

    #[validate(length(min = 1, max = 32))]
    pub code: String,

    #[validate(length(min = 8, max = 72))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    #[validate(email, length(max = 254))]
    pub email: String,

    #[validate(length(min = 1, max = 32))]
    pub code: String,
}

/// Body of a rejected verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationData {
    /// `not found`, `already used`, `max attempts exceeded`, `expired` or
    /// `invalid code`
    pub reason: String,
    /// Machine-readable form of `reason`
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,
}

impl VerificationData {
    /// `None` for a successful outcome
    pub fn from_outcome(outcome: &VerificationOutcome) -> Option<Self> {
        outcome.reason.map(|reason| Self {
            reason: reason.to_string(),
            error: reason.error_code().to_string(),
            remaining_attempts: outcome.remaining_attempts,
        })
    }
}
