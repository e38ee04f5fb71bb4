//! One-time code lifecycle: issuance, delivery, verification and invalidation.
//!
//! The service is generic over its store and its email dispatcher so the
//! same logic runs against the in-memory store in tests and Redis or MySQL
//! in production.

mod config;
mod service;
mod traits;
mod types;


pub use config::OtpServiceConfig;
pub use service::OtpService;
pub use traits::EmailDispatcher;
pub use types::IssuedCode;
