//! Configuration module with business-specific sub-modules
//!
//! - `cache` - Redis connection configuration
//! - `database` - MySQL connection and pool configuration
//! - `email` - Email provider configuration
//! - `environment` - Environment detection and logging configuration
//! - `otp` - One-time code policy
//! - `rate_limit` - Request throttling for the code endpoints
//! - `server` - HTTP server and CORS configuration
//! - `storage` - Backend selection per store

pub mod cache;
pub mod database;
pub mod email;
pub mod environment;
pub mod otp;
pub mod rate_limit;
pub mod server;
pub mod storage;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use email::{EmailConfig, EmailProvider};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::OtpConfig;
pub use rate_limit::{RateLimitConfig, WindowLimit};
pub use server::{CorsConfig, ServerConfig};
pub use storage::{StorageConfig, StoreBackend};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Redis configuration
    pub cache: CacheConfig,

    /// Backend selection
    #[serde(default)]
    pub storage: StorageConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// One-time code policy
    #[serde(default)]
    pub otp: OtpConfig,

    /// Email delivery configuration
    #[serde(default)]
    pub email: EmailConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::default(),
            cors: CorsConfig::development(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            storage: StorageConfig::development(),
            rate_limit: RateLimitConfig::development(),
            otp: OtpConfig::default(),
            email: EmailConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig::new("0.0.0.0", 8080),
            cors: CorsConfig::default(),
            database: DatabaseConfig::new("mysql://devlink-db:3306/devlink")
                .with_max_connections(50),
            cache: CacheConfig::new("redis://devlink-cache:6379"),
            storage: StorageConfig::production(),
            rate_limit: RateLimitConfig::production(),
            otp: OtpConfig::default(),
            email: EmailConfig {
                provider: EmailProvider::Http,
                ..Default::default()
            },
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Defaults for the given environment
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::production();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        }
    }

    /// Defaults for the environment named by `ENVIRONMENT`
    pub fn from_env() -> Self {
        Self::for_environment(Environment::from_env())
    }
}
