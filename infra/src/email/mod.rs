//! Email delivery for the code lifecycle
//!
//! - `mock_email` logs messages and keeps them in memory (development)
//! - `http_email` posts messages to a transactional email HTTP API
//! - `templates` renders subjects and bodies

pub mod http_email;
pub mod mock_email;
pub mod templates;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use dl_core::EmailDispatcher;
use dl_shared::config::{EmailConfig, EmailProvider};

pub use http_email::HttpEmailDispatcher;
pub use mock_email::{MockEmailDispatcher, SentEmail};
pub use templates::{EmailMessage, EmailTemplates};

use crate::InfrastructureError;

/// Build the dispatcher selected by `config.provider`
///
/// `code_ttl_minutes` is quoted in the code mails.
pub fn create_dispatcher(
    config: &EmailConfig,
    code_ttl_minutes: i64,
) -> Result<Arc<dyn EmailDispatcher>, InfrastructureError> {
    let templates = EmailTemplates::new(config.app_name.clone(), code_ttl_minutes);
    match config.provider {
        EmailProvider::Mock => {
            tracing::warn!("Using mock email dispatcher, codes are written to the log");
            Ok(Arc::new(MockEmailDispatcher::new(templates)))
        }
        EmailProvider::Http => {
            tracing::info!("Using HTTP email dispatcher");
            Ok(Arc::new(HttpEmailDispatcher::new(config.clone(), templates)?))
        }
    }
}
