//! Main one-time code service implementation

use chrono::{Duration, Utc};
use std::sync::Arc;

use dl_shared::email::{is_valid_email, mask_email, normalize_email};

use crate::domain::entities::{OneTimeCode, OtpPurpose};
use crate::domain::value_objects::{VerificationFailure, VerificationOutcome};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::otp::{AttemptRecord, ConsumeRecord, OtpRepository};

use super::config::OtpServiceConfig;
use super::traits::EmailDispatcher;
use super::types::IssuedCode;

/// Issues and verifies one-time codes
///
/// Holds no locks of its own. Every state change is a single atomic call
/// on the repository, so concurrent requests for the same address are
/// serialized by the store.
pub struct OtpService<R, E>
where
    R: OtpRepository + ?Sized,
    E: EmailDispatcher + ?Sized,
{
    repository: Arc<R>,
    dispatcher: Arc<E>,
    config: OtpServiceConfig,
}

impl<R, E> OtpService<R, E>
where
    R: OtpRepository + ?Sized,
    E: EmailDispatcher + ?Sized,
{
    pub fn new(repository: Arc<R>, dispatcher: Arc<E>, config: OtpServiceConfig) -> Self {
        Self {
            repository,
            dispatcher,
            config,
        }
    }

    pub fn config(&self) -> &OtpServiceConfig {
        &self.config
    }

    /// Issue a new code for `(email, purpose)`
    ///
    /// Any earlier code for the same pair stops verifying once this
    /// returns. Codes for the same address with another purpose are left
    /// alone.
    ///
    /// # Returns
    ///
    /// * `Ok(OneTimeCode)` - The stored record, code included
    /// * `Err(DomainError::Validation)` - The email is malformed
    /// * `Err(DomainError::Storage)` - The store failed
    pub async fn issue(&self, email: &str, purpose: OtpPurpose) -> DomainResult<OneTimeCode> {
        let email = Self::checked_email(email)?;

        let code = OneTimeCode::issue_at(
            email,
            purpose,
            Utc::now(),
            Duration::minutes(self.config.code_ttl_minutes),
            self.config.max_attempts,
        );

        self.repository.replace(&code).await.map_err(|e| {
            tracing::error!(
                email = %mask_email(&code.email),
                purpose = %purpose,
                error = %e,
                event = "otp_storage_failed",
                "Failed to store one-time code"
            );
            e
        })?;

        tracing::info!(
            email = %mask_email(&code.email),
            purpose = %purpose,
            code_id = %code.id,
            expires_at = %code.expires_at,
            event = "otp_issued",
            "Issued one-time code"
        );

        Ok(code)
    }

    /// Issue a code and mail it to the member
    ///
    /// A delivery failure is reported as `DomainError::Dispatch`; the stored
    /// code is kept, so a later successful resend simply replaces it.
    pub async fn issue_and_send(
        &self,
        email: &str,
        purpose: OtpPurpose,
        display_name: &str,
    ) -> DomainResult<IssuedCode> {
        let code = self.issue(email, purpose).await?;

        let message_id = self
            .dispatcher
            .send_code(&code.email, &code.code, display_name, purpose)
            .await
            .map_err(|e| {
                tracing::error!(
                    email = %mask_email(&code.email),
                    purpose = %purpose,
                    code_id = %code.id,
                    error = %e,
                    event = "otp_dispatch_failed",
                    "Failed to deliver one-time code"
                );
                DomainError::Dispatch { message: e }
            })?;

        tracing::info!(
            email = %mask_email(&code.email),
            purpose = %purpose,
            message_id = %message_id,
            event = "otp_sent",
            "Delivered one-time code"
        );

        Ok(IssuedCode { code, message_id })
    }

    /// Check a submitted code and consume it on success
    ///
    /// Rejections come back as `Ok` outcomes carrying the reason. Only
    /// validation and store failures are errors.
    pub async fn verify(
        &self,
        email: &str,
        submitted: &str,
        purpose: OtpPurpose,
    ) -> DomainResult<VerificationOutcome> {
        let email = Self::checked_email(email)?;
        let masked = mask_email(&email);

        let Some(record) = self.repository.find(&email, purpose).await? else {
            tracing::warn!(
                email = %masked,
                purpose = %purpose,
                event = "otp_not_found",
                "No one-time code on record"
            );
            return Ok(VerificationOutcome::rejected(VerificationFailure::NotFound, None));
        };

        if let Some(reason) = record.state_at(Utc::now()).failure() {
            tracing::warn!(
                email = %masked,
                purpose = %purpose,
                code_id = %record.id,
                reason = %reason,
                event = "otp_rejected",
                "One-time code is no longer usable"
            );
            return Ok(VerificationOutcome::rejected(
                reason,
                Some(record.remaining_attempts()),
            ));
        }

        // A malformed code is just another wrong guess and costs an attempt
        if !record.matches(submitted) {
            if !OneTimeCode::is_well_formed(submitted) {
                tracing::debug!(
                    email = %masked,
                    purpose = %purpose,
                    code_length = submitted.len(),
                    event = "otp_invalid_format",
                    "Malformed one-time code submitted"
                );
            }
            return self.record_mismatch(&record, &masked).await;
        }

        match self
            .repository
            .mark_consumed(&email, purpose, record.id)
            .await?
        {
            ConsumeRecord::Consumed => {
                tracing::info!(
                    email = %masked,
                    purpose = %purpose,
                    code_id = %record.id,
                    event = "otp_verified",
                    "One-time code verified"
                );
                Ok(VerificationOutcome::verified())
            }
            ConsumeRecord::AlreadyConsumed => {
                tracing::warn!(
                    email = %masked,
                    purpose = %purpose,
                    code_id = %record.id,
                    event = "otp_consume_race_lost",
                    "One-time code consumed by a concurrent request"
                );
                Ok(VerificationOutcome::rejected(
                    VerificationFailure::AlreadyConsumed,
                    None,
                ))
            }
            // Replaced by a newer issuance between the read and the consume
            ConsumeRecord::Missing => Ok(VerificationOutcome::rejected(
                VerificationFailure::NotFound,
                None,
            )),
        }
    }

    async fn record_mismatch(
        &self,
        record: &OneTimeCode,
        masked: &str,
    ) -> DomainResult<VerificationOutcome> {
        let update = self
            .repository
            .increment_attempts(&record.email, record.purpose, record.id)
            .await?;

        let outcome = match update {
            AttemptRecord::Recorded { attempt_count } => {
                let remaining = record.max_attempts.saturating_sub(attempt_count);
                if remaining == 0 {
                    VerificationOutcome::rejected(VerificationFailure::AttemptsExhausted, Some(0))
                } else {
                    VerificationOutcome::rejected(VerificationFailure::Mismatch, Some(remaining))
                }
            }
            AttemptRecord::LimitReached => {
                VerificationOutcome::rejected(VerificationFailure::AttemptsExhausted, Some(0))
            }
            AttemptRecord::Missing => {
                VerificationOutcome::rejected(VerificationFailure::NotFound, None)
            }
        };

        tracing::warn!(
            email = %masked,
            purpose = %record.purpose,
            code_id = %record.id,
            remaining_attempts = ?outcome.remaining_attempts,
            reason = ?outcome.reason,
            event = "otp_mismatch",
            "Incorrect one-time code submitted"
        );

        if outcome.reason == Some(VerificationFailure::AttemptsExhausted) {
            tracing::warn!(
                email = %masked,
                purpose = %record.purpose,
                code_id = %record.id,
                event = "otp_attempts_exhausted",
                "Maximum verification attempts reached"
            );
        }

        Ok(outcome)
    }

    /// Drop the code for `(email, purpose)`, if any
    pub async fn invalidate(&self, email: &str, purpose: OtpPurpose) -> DomainResult<bool> {
        let email = normalize_email(email);
        let removed = self.repository.delete(&email, purpose).await?;

        if removed {
            tracing::info!(
                email = %mask_email(&email),
                purpose = %purpose,
                event = "otp_invalidated",
                "Invalidated one-time code"
            );
        }

        Ok(removed)
    }

    /// Send the password-changed confirmation through the same dispatcher
    pub async fn send_confirmation(&self, email: &str, display_name: &str) -> DomainResult<String> {
        self.dispatcher
            .send_confirmation(email, display_name)
            .await
            .map_err(|e| {
                tracing::error!(
                    email = %mask_email(email),
                    error = %e,
                    event = "confirmation_dispatch_failed",
                    "Failed to deliver confirmation mail"
                );
                DomainError::Dispatch { message: e }
            })
    }

    fn checked_email(email: &str) -> DomainResult<String> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(DomainError::Validation {
                message: "Invalid email address".to_string(),
            });
        }
        Ok(email)
    }
}
