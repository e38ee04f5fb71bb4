//! Transactional email over an HTTP JSON API
//!
//! Posts `{from, to, subject, text}` with a bearer key. Rate limiting and
//! server errors are retried with exponential backoff, other client errors
//! fail immediately.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use dl_core::{EmailDispatcher, OtpPurpose};
use dl_shared::config::EmailConfig;
use dl_shared::email::mask_email;

use super::templates::{EmailMessage, EmailTemplates};
use crate::InfrastructureError;

#[derive(Debug, Serialize)]
struct Mailbox<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: Mailbox<'a>,
    to: Vec<Mailbox<'a>>,
    subject: &'a str,
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SendResponse {
    #[serde(default, alias = "message_id", alias = "messageId")]
    id: Option<String>,
}

/// Outcome of one delivery attempt
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum AttemptError {
    /// Worth another attempt after backing off
    Retryable(String),
    /// The provider rejected the request itself
    Rejected(String),
}

/// Classify a non-success status from the provider
pub(crate) fn classify_status(status: StatusCode, body: &str) -> AttemptError {
    let detail = format!("provider returned {}: {}", status, body);
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        AttemptError::Retryable(detail)
    } else {
        AttemptError::Rejected(detail)
    }
}

/// HTTP email dispatcher
pub struct HttpEmailDispatcher {
    client: Client,
    config: EmailConfig,
    templates: EmailTemplates,
}

impl HttpEmailDispatcher {
    pub fn new(config: EmailConfig, templates: EmailTemplates) -> Result<Self, InfrastructureError> {
        if config.api_url.trim().is_empty() {
            return Err(InfrastructureError::Config(
                "email.api_url must be set for the http provider".to_string(),
            ));
        }
        if config.api_key.as_deref().map_or(true, |key| key.trim().is_empty()) {
            return Err(InfrastructureError::Config(
                "email.api_key must be set for the http provider".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            api_url = %config.api_url,
            from = %mask_email(&config.from_address),
            "HTTP email dispatcher initialized"
        );

        Ok(Self {
            client,
            config,
            templates,
        })
    }

    async fn attempt(
        &self,
        to: &str,
        display_name: &str,
        message: &EmailMessage,
    ) -> Result<String, AttemptError> {
        let request = SendRequest {
            from: Mailbox {
                email: &self.config.from_address,
                name: &self.config.from_name,
            },
            to: vec![Mailbox {
                email: to,
                name: display_name,
            }],
            subject: &message.subject,
            text: &message.text,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(self.config.api_key.as_deref().unwrap_or_default())
            .json(&request)
            .send()
            .await
            .map_err(|e| AttemptError::Retryable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        // Providers that answer 202 with an empty body still delivered the mail
        let parsed = response.json::<SendResponse>().await.unwrap_or_default();
        Ok(parsed
            .id
            .unwrap_or_else(|| format!("local-{}", Uuid::new_v4())))
    }

    async fn send_with_retry(
        &self,
        to: &str,
        display_name: &str,
        message: &EmailMessage,
    ) -> Result<String, InfrastructureError> {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            attempts += 1;
            debug!(
                to = %mask_email(to),
                attempt = attempts,
                max_attempts,
                "Sending email"
            );

            match self.attempt(to, display_name, message).await {
                Ok(message_id) => {
                    info!(to = %mask_email(to), message_id = %message_id, "Email sent");
                    return Ok(message_id);
                }
                Err(AttemptError::Rejected(detail)) => {
                    error!(to = %mask_email(to), detail = %detail, "Email rejected by provider");
                    return Err(InfrastructureError::Email(detail));
                }
                Err(AttemptError::Retryable(detail)) => {
                    if attempts >= max_attempts {
                        error!(
                            to = %mask_email(to),
                            attempts,
                            detail = %detail,
                            "Email delivery failed"
                        );
                        return Err(InfrastructureError::Email(format!(
                            "delivery failed after {} attempts: {}",
                            attempts, detail
                        )));
                    }
                    warn!(
                        to = %mask_email(to),
                        attempt = attempts,
                        detail = %detail,
                        "Email attempt failed, retrying after {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
}

#[async_trait]
impl EmailDispatcher for HttpEmailDispatcher {
    async fn send_code(
        &self,
        email: &str,
        code: &str,
        display_name: &str,
        purpose: OtpPurpose,
    ) -> Result<String, String> {
        let message = self.templates.code(code, display_name, purpose);
        self.send_with_retry(email, display_name, &message)
            .await
            .map_err(|e| e.to_string())
    }

    async fn send_confirmation(&self, email: &str, display_name: &str) -> Result<String, String> {
        let message = self.templates.confirmation(display_name);
        self.send_with_retry(email, display_name, &message)
            .await
            .map_err(|e| e.to_string())
    }
}
