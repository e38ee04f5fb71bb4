//! Types shared by rate limiter implementations

use dl_shared::config::{RateLimitConfig, WindowLimit};

/// The throttled operations; each has its own window per key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitAction {
    IssueCode,
    VerifyCode,
}

impl RateLimitAction {
    /// Stable identifier used in storage keys
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitAction::IssueCode => "otp_issue",
            RateLimitAction::VerifyCode => "otp_verify",
        }
    }

    /// The window configured for this action
    pub fn limit(&self, config: &RateLimitConfig) -> WindowLimit {
        match self {
            RateLimitAction::IssueCode => config.issue,
            RateLimitAction::VerifyCode => config.verify,
        }
    }
}

impl std::fmt::Display for RateLimitAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitStatus {
    /// The request was admitted and counted
    Allowed {
        remaining: u32,
        limit: u32,
        window_seconds: u64,
    },
    /// The window is full; the request was not counted
    Exceeded {
        retry_after_seconds: u64,
        limit: u32,
        window_seconds: u64,
    },
}

impl RateLimitStatus {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitStatus::Allowed { .. })
    }

    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            RateLimitStatus::Exceeded {
                retry_after_seconds,
                ..
            } => Some(*retry_after_seconds),
            RateLimitStatus::Allowed { .. } => None,
        }
    }
}
