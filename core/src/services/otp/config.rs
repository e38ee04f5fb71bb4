//! Configuration for the one-time code service

use dl_shared::OtpConfig;

use crate::domain::entities::{DEFAULT_EXPIRATION_MINUTES, DEFAULT_MAX_ATTEMPTS};

/// Policy applied to every code the service issues
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Minutes before an issued code expires
    pub code_ttl_minutes: i64,
    /// Failed attempts allowed per code
    pub max_attempts: u32,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            code_ttl_minutes: DEFAULT_EXPIRATION_MINUTES,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl From<&OtpConfig> for OtpServiceConfig {
    fn from(config: &OtpConfig) -> Self {
        Self {
            code_ttl_minutes: config.code_ttl_minutes,
            max_attempts: config.max_attempts,
        }
    }
}
