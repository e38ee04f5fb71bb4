//! Domain-specific error types and error handling.

use thiserror::Error;

use dl_shared::error_codes;


/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Too many requests, retry after {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Email dispatch failed: {message}")]
    Dispatch { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        DomainError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        DomainError::Storage {
            message: message.into(),
        }
    }

    pub fn dispatch(message: impl Into<String>) -> Self {
        DomainError::Dispatch {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }

    /// Machine-readable code carried in error payloads
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => error_codes::VALIDATION_ERROR,
            DomainError::NotFound { resource } if resource == "account" => {
                error_codes::ACCOUNT_NOT_FOUND
            }
            DomainError::NotFound { .. } => error_codes::NOT_FOUND,
            DomainError::RateLimited { .. } => error_codes::RATE_LIMIT_EXCEEDED,
            DomainError::Dispatch { .. } => error_codes::EMAIL_DELIVERY_FAILED,
            DomainError::Storage { .. } => error_codes::STORAGE_ERROR,
            DomainError::Internal { .. } => error_codes::INTERNAL_ERROR,
        }
    }

    /// Whether the detail must stay server-side
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            DomainError::Dispatch { .. } | DomainError::Storage { .. } | DomainError::Internal { .. }
        )
    }
}
