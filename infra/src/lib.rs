//! # Infrastructure Layer
//!
//! Concrete backends for the DevLink one-time code subsystem.
//!
//! ## Architecture
//!
//! - **Cache**: Redis client, Redis code store
//! - **Services**: Redis sliding-window rate limiter
//! - **Database**: MySQL code and account repositories using SQLx
//! - **Email**: mock and HTTP email dispatchers
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis support (default)

use dl_core::DomainError;

/// Cache module - Redis client and code store
pub mod cache;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Email module - delivery of codes and confirmations
pub mod email;

/// Services module - Infrastructure service implementations
pub mod services;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Email provider rejected or failed a message
    #[error("Email service error: {0}")]
    Email(String),

    /// Stored data could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Http(e) => DomainError::Dispatch {
                message: e.to_string(),
            },
            InfrastructureError::Email(message) => DomainError::Dispatch { message },
            InfrastructureError::Config(message) => DomainError::Internal { message },
            other => DomainError::Storage {
                message: other.to_string(),
            },
        }
    }
}
