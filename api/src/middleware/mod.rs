//! Request-level concerns shared by the routes
//!
//! - `cors` builds the CORS policy from configuration
//! - `rate_limit` gates the code endpoints per identity

pub mod cors;
pub mod rate_limit;

pub use cors::create_cors;
pub use rate_limit::{enforce_rate_limit, extract_client_ip, rate_limit_key};
