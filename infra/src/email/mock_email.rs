//! Email dispatcher that logs instead of sending
//!
//! Used in development. The code is written to the log so it can be read
//! from the console; never enable this provider in production.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

use dl_core::{EmailDispatcher, OtpPurpose};
use dl_shared::email::mask_email;

use super::templates::{EmailMessage, EmailTemplates};

/// A mail captured by the mock dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub message: EmailMessage,
    pub message_id: String,
}

/// Mock email dispatcher
#[derive(Clone)]
pub struct MockEmailDispatcher {
    templates: EmailTemplates,
    sent: Arc<Mutex<Vec<SentEmail>>>,
}

impl MockEmailDispatcher {
    pub fn new(templates: EmailTemplates) -> Self {
        Self {
            templates,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Mails captured so far, oldest first
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    fn record(&self, to: &str, message: EmailMessage) -> String {
        let message_id = format!("mock-{}", Uuid::new_v4());
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentEmail {
                to: to.to_string(),
                message,
                message_id: message_id.clone(),
            });
        }
        message_id
    }
}

#[async_trait]
impl EmailDispatcher for MockEmailDispatcher {
    async fn send_code(
        &self,
        email: &str,
        code: &str,
        display_name: &str,
        purpose: OtpPurpose,
    ) -> Result<String, String> {
        let message = self.templates.code(code, display_name, purpose);

        info!(
            email = %mask_email(email),
            purpose = %purpose,
            code = code,
            subject = %message.subject,
            "[MOCK EMAIL] One-time code"
        );

        Ok(self.record(email, message))
    }

    async fn send_confirmation(&self, email: &str, display_name: &str) -> Result<String, String> {
        let message = self.templates.confirmation(display_name);

        info!(
            email = %mask_email(email),
            subject = %message.subject,
            "[MOCK EMAIL] Password changed confirmation"
        );

        Ok(self.record(email, message))
    }
}
