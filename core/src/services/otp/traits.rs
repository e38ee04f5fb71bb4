//! Trait for the email delivery boundary

use async_trait::async_trait;

use crate::domain::entities::OtpPurpose;

/// Sends the mails of the code lifecycle
///
/// Implementations return a provider message id on success and an error
/// description on failure. Neither method is retried by the caller.
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    /// Deliver a freshly issued code
    async fn send_code(
        &self,
        email: &str,
        code: &str,
        display_name: &str,
        purpose: OtpPurpose,
    ) -> Result<String, String>;

    /// Tell the member their password was changed
    async fn send_confirmation(&self, email: &str, display_name: &str) -> Result<String, String>;
}
