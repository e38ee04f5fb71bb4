//! One-time code configuration module

use serde::{Deserialize, Serialize};

/// Issuance and verification policy for one-time codes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Minutes a code stays valid after issuance
    #[serde(default = "default_code_ttl_minutes")]
    pub code_ttl_minutes: i64,

    /// Verification attempts allowed per code
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Run the background sweep that deletes expired codes
    #[serde(default = "default_sweep_enabled")]
    pub sweep_enabled: bool,

    /// Seconds between two sweeps
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_ttl_minutes: default_code_ttl_minutes(),
            max_attempts: default_max_attempts(),
            sweep_enabled: default_sweep_enabled(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
        }
    }
}

fn default_code_ttl_minutes() -> i64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_sweep_enabled() -> bool {
    true
}

fn default_sweep_interval_seconds() -> u64 {
    300
}
