//! Storage backend selection

use serde::{Deserialize, Serialize};

/// Backend holding a given kind of record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local maps, lost on restart
    Memory,
    /// Redis keys with native expiry
    Redis,
    /// MySQL tables
    Mysql,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Redis => write!(f, "redis"),
            StoreBackend::Mysql => write!(f, "mysql"),
        }
    }
}

/// Which backend serves each store
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// One-time code records
    pub otp: StoreBackend,

    /// Rate limiter windows
    pub rate_limit: StoreBackend,

    /// Account records
    pub accounts: StoreBackend,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl StorageConfig {
    /// Everything in memory
    pub fn development() -> Self {
        Self {
            otp: StoreBackend::Memory,
            rate_limit: StoreBackend::Memory,
            accounts: StoreBackend::Memory,
        }
    }

    /// Codes and windows in Redis, accounts in MySQL
    pub fn production() -> Self {
        Self {
            otp: StoreBackend::Redis,
            rate_limit: StoreBackend::Redis,
            accounts: StoreBackend::Mysql,
        }
    }

    /// Whether any store needs a Redis connection
    pub fn needs_redis(&self) -> bool {
        [self.otp, self.rate_limit, self.accounts].contains(&StoreBackend::Redis)
    }

    /// Whether any store needs a MySQL pool
    pub fn needs_mysql(&self) -> bool {
        [self.otp, self.rate_limit, self.accounts].contains(&StoreBackend::Mysql)
    }
}
