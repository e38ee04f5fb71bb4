//! Account recovery and verification flows

use std::sync::Arc;

use dl_shared::email::{fallback_display_name, is_valid_email, mask_email, normalize_email};

use crate::domain::entities::OtpPurpose;
use crate::domain::value_objects::VerificationOutcome;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::{AccountRepository, OtpRepository};
use crate::services::otp::{EmailDispatcher, IssuedCode, OtpService};

/// Shortest password accepted on reset
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Longest password accepted on reset; bcrypt ignores bytes past 72
const MAX_PASSWORD_LENGTH: usize = 72;

/// Configuration for the account service
#[derive(Debug, Clone)]
pub struct AccountServiceConfig {
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
}

impl Default for AccountServiceConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Runs the code flows that end in an account change
pub struct AccountService<R, E, A>
where
    R: OtpRepository + ?Sized,
    E: EmailDispatcher + ?Sized,
    A: AccountRepository + ?Sized,
{
    otp_service: Arc<OtpService<R, E>>,
    accounts: Arc<A>,
    config: AccountServiceConfig,
}

impl<R, E, A> AccountService<R, E, A>
where
    R: OtpRepository + ?Sized,
    E: EmailDispatcher + ?Sized,
    A: AccountRepository + ?Sized,
{
    pub fn new(
        otp_service: Arc<OtpService<R, E>>,
        accounts: Arc<A>,
        config: AccountServiceConfig,
    ) -> Self {
        Self {
            otp_service,
            accounts,
            config,
        }
    }

    /// Issue and mail a code for `purpose`
    ///
    /// A password reset needs a registered account. Email verification
    /// does not, since it runs while the member is still signing up.
    pub async fn request_code(&self, email: &str, purpose: OtpPurpose) -> DomainResult<IssuedCode> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(DomainError::Validation {
                message: "Invalid email address".to_string(),
            });
        }

        let account = self.accounts.find_by_email(&email).await?;

        let display_name = match (&account, purpose) {
            (Some(account), _) => account.display_name.clone(),
            (None, OtpPurpose::PasswordReset) => {
                tracing::warn!(
                    email = %mask_email(&email),
                    event = "password_reset_unknown_account",
                    "Password reset requested for unknown account"
                );
                return Err(DomainError::NotFound {
                    resource: "account".to_string(),
                });
            }
            (None, OtpPurpose::EmailVerification) => fallback_display_name(&email),
        };

        self.otp_service
            .issue_and_send(&email, purpose, &display_name)
            .await
    }

    /// Verify a code and run the follow-up for its purpose
    ///
    /// `new_password` is required for `PasswordReset` and ignored for
    /// `EmailVerification`. It is validated before the code is looked at,
    /// so a bad password never burns an attempt.
    pub async fn verify_code(
        &self,
        email: &str,
        code: &str,
        purpose: OtpPurpose,
        new_password: Option<&str>,
    ) -> DomainResult<VerificationOutcome> {
        match purpose {
            OtpPurpose::PasswordReset => {
                let new_password = new_password.ok_or_else(|| DomainError::Validation {
                    message: "new_password is required for a password reset".to_string(),
                })?;
                self.reset_password(email, code, new_password).await
            }
            OtpPurpose::EmailVerification => self.verify_email(email, code).await,
        }
    }

    /// Verify a `password_reset` code and store the new password
    ///
    /// The account is resolved and the new hash computed before the code
    /// is checked, so neither a missing account nor a hashing failure can
    /// spend the code. A wrong code leaves the password untouched. The
    /// confirmation mail is best effort once the password has changed.
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> DomainResult<VerificationOutcome> {
        Self::validate_password(new_password)?;

        let email = normalize_email(email);
        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                resource: "account".to_string(),
            })?;
        let password_hash = self.hash_password(new_password).await?;

        let outcome = self
            .otp_service
            .verify(&email, code, OtpPurpose::PasswordReset)
            .await?;
        if !outcome.valid {
            return Ok(outcome);
        }

        if !self
            .accounts
            .update_password_hash(&email, &password_hash)
            .await?
        {
            return Err(DomainError::NotFound {
                resource: "account".to_string(),
            });
        }

        tracing::info!(
            email = %mask_email(&email),
            account_id = %account.id,
            event = "password_reset",
            "Password reset completed"
        );

        if let Err(e) = self
            .otp_service
            .send_confirmation(&email, &account.display_name)
            .await
        {
            tracing::warn!(
                email = %mask_email(&email),
                error = %e,
                event = "password_reset_confirmation_failed",
                "Password changed but confirmation mail was not sent"
            );
        }

        Ok(outcome)
    }

    /// Verify an `email_verification` code and flag the account
    ///
    /// Succeeds even when no account exists yet; registration picks up
    /// the verified state on its own.
    pub async fn verify_email(&self, email: &str, code: &str) -> DomainResult<VerificationOutcome> {
        let email = normalize_email(email);
        let outcome = self
            .otp_service
            .verify(&email, code, OtpPurpose::EmailVerification)
            .await?;
        if !outcome.valid {
            return Ok(outcome);
        }

        let updated = self.accounts.mark_email_verified(&email).await?;

        tracing::info!(
            email = %mask_email(&email),
            account_updated = updated,
            event = "email_verified",
            "Email address verified"
        );

        Ok(outcome)
    }

    fn validate_password(password: &str) -> DomainResult<()> {
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::Validation {
                message: format!(
                    "Password must be at least {} characters",
                    MIN_PASSWORD_LENGTH
                ),
            });
        }
        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(DomainError::Validation {
                message: format!(
                    "Password must be at most {} bytes",
                    MAX_PASSWORD_LENGTH
                ),
            });
        }
        Ok(())
    }

    async fn hash_password(&self, password: &str) -> DomainResult<String> {
        let password = password.to_string();
        let cost = self.config.bcrypt_cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Password hashing task failed: {}", e),
            })?
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to hash password: {}", e),
            })
    }
}
