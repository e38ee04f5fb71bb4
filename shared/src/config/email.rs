//! Email delivery configuration module

use serde::{Deserialize, Serialize};

/// Email provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    /// Log messages instead of sending them
    Mock,
    /// Transactional email HTTP API
    Http,
}

/// Email delivery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    /// Provider used to deliver messages
    pub provider: EmailProvider,

    /// Endpoint of the provider's send API
    #[serde(default)]
    pub api_url: String,

    /// Bearer token for the provider API
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sender address
    pub from_address: String,

    /// Sender display name
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Product name used in subjects and bodies
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Timeout for API requests in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Attempts per message before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial delay between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: EmailProvider::Mock,
            api_url: String::new(),
            api_key: None,
            from_address: String::from("no-reply@devlink.dev"),
            from_name: default_from_name(),
            app_name: default_app_name(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_from_name() -> String {
    String::from("DevLink")
}

fn default_app_name() -> String {
    String::from("DevLink")
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}
