//! Shared utilities and common types for the DevLink server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Email address utilities
//! - API response wrappers

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, CorsConfig, DatabaseConfig, EmailConfig, Environment,
    LoggingConfig, OtpConfig, RateLimitConfig, ServerConfig,
};
pub use errors::{error_codes, ApiResult, ErrorResponse};
pub use types::{ApiResponse, HealthResponse, HealthStatus};
pub use utils::email;
