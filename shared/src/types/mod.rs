//! API response wrappers and health checks

pub mod response;

pub use response::{ApiResponse, HealthResponse, HealthStatus};
