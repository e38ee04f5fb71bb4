//! Periodic removal of expired one-time codes
//!
//! Stores without native key expiry keep expired records until something
//! deletes them. Verification already rejects them by timestamp; the sweep
//! only reclaims space.

use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use dl_shared::OtpConfig;

use crate::errors::DomainError;
use crate::repositories::OtpRepository;

/// Configuration for the expired-code sweeper
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How often to sweep (in seconds)
    pub interval_seconds: u64,
    /// Whether to run the background task at all
    pub enabled: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 300,
            enabled: true,
        }
    }
}

impl From<&OtpConfig> for SweepConfig {
    fn from(config: &OtpConfig) -> Self {
        Self {
            interval_seconds: config.sweep_interval_seconds,
            enabled: config.sweep_enabled,
        }
    }
}

/// Outcome of one sweep
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepResult {
    pub deleted: u64,
}

/// Deletes expired codes on a fixed interval
pub struct ExpiredCodeSweeper<R: OtpRepository + ?Sized + 'static> {
    repository: Arc<R>,
    config: SweepConfig,
}

impl<R: OtpRepository + ?Sized + 'static> ExpiredCodeSweeper<R> {
    pub fn new(repository: Arc<R>, config: SweepConfig) -> Self {
        Self { repository, config }
    }

    /// Run a single sweep
    pub async fn run_sweep(&self) -> Result<SweepResult, DomainError> {
        let deleted = self.repository.delete_expired(Utc::now()).await?;

        if deleted > 0 {
            info!(deleted = deleted, event = "otp_sweep", "Deleted expired one-time codes");
        }

        Ok(SweepResult { deleted })
    }

    /// Spawn the sweep loop on the current runtime
    ///
    /// Returns `None` when sweeping is disabled. The loop ends when the
    /// runtime shuts down or the handle is aborted.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Expired code sweeper is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval_seconds,
                "Expired code sweeper started"
            );

            let mut timer = tokio::time::interval(interval);

            loop {
                timer.tick().await;

                if let Err(e) = self.run_sweep().await {
                    error!(error = %e, event = "otp_sweep_failed", "Expired code sweep failed");
                }
            }
        }))
    }
}
