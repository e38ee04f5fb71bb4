//! In-process sliding-window limiter

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

use dl_shared::config::RateLimitConfig;

use crate::errors::DomainResult;

use super::traits::RateLimiterTrait;
use super::types::{RateLimitAction, RateLimitStatus};

/// How often idle keys are swept out of the map
const SWEEP_INTERVAL_SECONDS: i64 = 60;

type WindowKey = (RateLimitAction, String);

#[derive(Default)]
struct Windows {
    hits: HashMap<WindowKey, VecDeque<DateTime<Utc>>>,
    last_sweep: Option<DateTime<Utc>>,
}

/// Keeps the admission timestamps of each (action, key) in memory
///
/// Suitable for a single instance. Counts are lost on restart. Keys whose
/// window has fully passed are dropped on a periodic sweep.
#[derive(Clone)]
pub struct InMemoryRateLimiter {
    config: RateLimitConfig,
    windows: Arc<Mutex<Windows>>,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(Windows::default())),
        }
    }

    fn window(&self, action: RateLimitAction) -> Duration {
        Duration::seconds(action.limit(&self.config).bounded_window_seconds() as i64)
    }

    /// Same as `check_and_record`, evaluated at `now`
    pub async fn check_and_record_at(
        &self,
        action: RateLimitAction,
        key: &str,
        now: DateTime<Utc>,
    ) -> RateLimitStatus {
        let limit = action.limit(&self.config);
        let window = self.window(action);

        let mut windows = self.windows.lock().await;
        let sweep_due = windows
            .last_sweep
            .map_or(true, |last| now - last >= Duration::seconds(SWEEP_INTERVAL_SECONDS));
        if sweep_due {
            self.sweep(&mut *windows, now);
        }

        let hits = windows.hits.entry((action, key.to_string())).or_default();

        while hits.front().is_some_and(|hit| *hit <= now - window) {
            hits.pop_front();
        }

        if hits.len() >= limit.max_requests as usize {
            let retry_after_seconds = hits
                .front()
                .map(|oldest| (*oldest + window - now).num_seconds().max(1) as u64)
                .unwrap_or(limit.window_seconds);

            tracing::warn!(
                action = %action,
                retry_after_seconds = retry_after_seconds,
                event = "rate_limit_exceeded",
                "Rate limit exceeded"
            );

            return RateLimitStatus::Exceeded {
                retry_after_seconds,
                limit: limit.max_requests,
                window_seconds: limit.window_seconds,
            };
        }

        hits.push_back(now);
        RateLimitStatus::Allowed {
            remaining: limit.max_requests - hits.len() as u32,
            limit: limit.max_requests,
            window_seconds: limit.window_seconds,
        }
    }

    fn sweep(&self, windows: &mut Windows, now: DateTime<Utc>) {
        let issue_cutoff = now - self.window(RateLimitAction::IssueCode);
        let verify_cutoff = now - self.window(RateLimitAction::VerifyCode);
        let before = windows.hits.len();

        windows.hits.retain(|(action, _), hits| {
            let cutoff = match action {
                RateLimitAction::IssueCode => issue_cutoff,
                RateLimitAction::VerifyCode => verify_cutoff,
            };
            while hits.front().is_some_and(|hit| *hit <= cutoff) {
                hits.pop_front();
            }
            !hits.is_empty()
        });
        windows.last_sweep = Some(now);

        let removed = before - windows.hits.len();
        if removed > 0 {
            tracing::debug!(
                removed = removed,
                tracked = windows.hits.len(),
                event = "rate_limit_swept",
                "Dropped idle rate limit windows"
            );
        }
    }

    #[cfg(test)]
    pub(crate) async fn tracked_keys(&self) -> usize {
        self.windows.lock().await.hits.len()
    }
}

#[async_trait]
impl RateLimiterTrait for InMemoryRateLimiter {
    async fn check_and_record(
        &self,
        action: RateLimitAction,
        key: &str,
    ) -> DomainResult<RateLimitStatus> {
        Ok(self.check_and_record_at(action, key, Utc::now()).await)
    }

    async fn reset(&self, action: RateLimitAction, key: &str) -> DomainResult<()> {
        self.windows
            .lock()
            .await
            .hits
            .remove(&(action, key.to_string()));
        Ok(())
    }
}
