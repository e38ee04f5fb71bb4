//! Per-identity request throttling for the one-time code endpoints.

mod memory;
mod traits;
mod types;


pub use memory::InMemoryRateLimiter;
pub use traits::RateLimiterTrait;
pub use types::{RateLimitAction, RateLimitStatus};
