//! Cache module for Redis-backed stores
//!
//! Provides the shared Redis client and the one-time code store built on it.

pub mod otp_store;
pub mod redis_client;


pub use otp_store::RedisOtpRepository;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use dl_shared::config::CacheConfig;
