//! # DevLink Core
//!
//! Core business logic and domain layer for the DevLink backend.
//! This crate contains the one-time code entity, the verification state
//! machine, repository and dispatcher interfaces, in-memory backends and the
//! services that issue and verify codes.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{Account, CodeState, OneTimeCode, OtpPurpose};
pub use domain::value_objects::{VerificationFailure, VerificationOutcome};
pub use errors::{DomainError, DomainResult};
pub use repositories::{
    AccountRepository, AttemptRecord, ConsumeRecord, InMemoryAccountRepository,
    InMemoryOtpRepository, OtpRepository,
};
pub use services::{
    AccountService, AccountServiceConfig, EmailDispatcher, ExpiredCodeSweeper, InMemoryRateLimiter,
    IssuedCode, OtpService, OtpServiceConfig, RateLimitAction, RateLimitStatus, RateLimiterTrait,
    SweepConfig, SweepResult,
};
