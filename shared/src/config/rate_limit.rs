//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

use super::environment::Environment;

/// Longest window a limit may use (30 days)
pub const MAX_WINDOW_SECONDS: u64 = 30 * 24 * 60 * 60;

/// Rate limiting configuration for the one-time-code endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Enforce limits outside production as well
    #[serde(default)]
    pub enforce_in_development: bool,

    /// Code issuance window
    #[serde(default = "default_issue_window")]
    pub issue: WindowLimit,

    /// Code verification window
    #[serde(default = "default_verify_window")]
    pub verify: WindowLimit,
}

/// A fixed number of requests per sliding window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WindowLimit {
    /// Requests admitted per key within the window
    pub max_requests: u32,

    /// Window length in seconds
    pub window_seconds: u64,
}

impl WindowLimit {
    pub fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            max_requests,
            window_seconds,
        }
    }

    /// Window length, capped at `MAX_WINDOW_SECONDS`
    pub fn bounded_window_seconds(&self) -> u64 {
        self.window_seconds.min(MAX_WINDOW_SECONDS)
    }

    fn validate(&self, name: &str) -> Result<(), String> {
        if self.max_requests == 0 {
            return Err(format!("rate_limit.{}.max_requests must be at least 1", name));
        }
        if self.window_seconds == 0 || self.window_seconds > MAX_WINDOW_SECONDS {
            return Err(format!(
                "rate_limit.{}.window_seconds must be between 1 and {}",
                name, MAX_WINDOW_SECONDS
            ));
        }
        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            enforce_in_development: false,
            issue: default_issue_window(),
            verify: default_verify_window(),
        }
    }
}

impl RateLimitConfig {
    /// Whether requests must pass the limiter in the given environment.
    ///
    /// Non-production environments are exempt unless
    /// `enforce_in_development` is set.
    pub fn is_enforced(&self, environment: Environment) -> bool {
        self.enabled && (environment.is_production() || self.enforce_in_development)
    }

    /// Reject windows the limiters cannot represent
    pub fn validate(&self) -> Result<(), String> {
        self.issue.validate("issue")?;
        self.verify.validate("verify")
    }

    /// Create a development configuration
    pub fn development() -> Self {
        Self::default()
    }

    /// Create a production configuration
    pub fn production() -> Self {
        Self::default()
    }
}

fn default_enabled() -> bool {
    true
}

fn default_issue_window() -> WindowLimit {
    WindowLimit::new(5, 15 * 60)
}

fn default_verify_window() -> WindowLimit {
    WindowLimit::new(10, 10 * 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_windows() {
        let config = RateLimitConfig::default();
        assert_eq!(config.issue.window_seconds, 900);
        assert_eq!(config.verify.window_seconds, 600);
        assert_eq!(config.issue.max_requests, 5);
        assert_eq!(config.verify.max_requests, 10);
    }

    #[test]
    fn test_bypass_outside_production() {
        let config = RateLimitConfig::default();
        assert!(config.is_enforced(Environment::Production));
        assert!(!config.is_enforced(Environment::Development));
        assert!(!config.is_enforced(Environment::Staging));
    }

    #[test]
    fn test_forced_enforcement_and_disable() {
        let forced = RateLimitConfig {
            enforce_in_development: true,
            ..Default::default()
        };
        assert!(forced.is_enforced(Environment::Development));

        let disabled = RateLimitConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(!disabled.is_enforced(Environment::Production));
    }

    #[test]
    fn test_validate_window_bounds() {
        assert!(RateLimitConfig::default().validate().is_ok());

        let huge = RateLimitConfig {
            verify: WindowLimit::new(10, u64::MAX),
            ..Default::default()
        };
        let err = huge.validate().unwrap_err();
        assert!(err.contains("rate_limit.verify.window_seconds"));
        assert_eq!(huge.verify.bounded_window_seconds(), MAX_WINDOW_SECONDS);

        let empty = RateLimitConfig {
            issue: WindowLimit::new(0, 60),
            ..Default::default()
        };
        assert!(empty.validate().is_err());
    }
}
