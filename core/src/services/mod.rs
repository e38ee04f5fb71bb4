//! Business services containing domain logic and use cases.

pub mod account;
pub mod cleanup;
pub mod otp;
pub mod rate_limit;

// Re-export commonly used types
pub use account::{AccountService, AccountServiceConfig};
pub use cleanup::{ExpiredCodeSweeper, SweepConfig, SweepResult};
pub use otp::{EmailDispatcher, IssuedCode, OtpService, OtpServiceConfig};
pub use rate_limit::{InMemoryRateLimiter, RateLimitAction, RateLimitStatus, RateLimiterTrait};
