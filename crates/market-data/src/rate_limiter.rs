//! Sliding-window rate limiter shared by the acquisition tiers.
//!
//! Each endpoint tag gets its own window of admitted-request timestamps
//! in the store's sorted-set primitive. On every check the window is
//! purged of expired entries, counted, and either rejected or extended
//! with the current instant.
//!
//! The limiter fails OPEN: if the backing store is unreachable, the
//! request is admitted. Pipeline availability wins over strict limit
//! accounting during a storage outage.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, warn};
use orbwatch_store::{keys, DataStore};

/// Per-endpoint sliding-window request admission control.
pub struct RateLimiter {
    store: Arc<dyn DataStore>,
    max_requests: u64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn DataStore>, max_requests: u64, window: Duration) -> Self {
        Self {
            store,
            max_requests,
            window,
        }
    }

    /// Admit or reject a request against the endpoint's window.
    pub async fn admit(&self, endpoint: &str) -> bool {
        self.admit_at(endpoint, Utc::now().timestamp_millis()).await
    }

    /// Seconds until the oldest window entry expires and a slot frees up.
    /// 0 when the window is empty.
    pub async fn retry_after(&self, endpoint: &str) -> u64 {
        self.retry_after_at(endpoint, Utc::now().timestamp_millis())
            .await
    }

    async fn admit_at(&self, endpoint: &str, now_ms: i64) -> bool {
        let key = keys::rate_window(endpoint);
        let cutoff = now_ms - self.window.as_millis() as i64;

        if let Err(e) = self.store.window_purge(&key, cutoff).await {
            warn!("Rate limiter purge failed for {endpoint}, admitting: {e}");
            return true;
        }

        match self.store.window_count(&key).await {
            Ok(count) if count >= self.max_requests => {
                warn!("Rate limit exceeded for {endpoint} ({count} in window)");
                false
            }
            Ok(_) => {
                if let Err(e) = self.store.window_record(&key, now_ms, self.window).await {
                    warn!("Rate limiter record failed for {endpoint}: {e}");
                }
                debug!("Rate limiter admitted request for {endpoint}");
                true
            }
            Err(e) => {
                warn!("Rate limiter count failed for {endpoint}, admitting: {e}");
                true
            }
        }
    }

    async fn retry_after_at(&self, endpoint: &str, now_ms: i64) -> u64 {
        let key = keys::rate_window(endpoint);
        match self.store.window_oldest(&key).await {
            Ok(Some(oldest_ms)) => {
                let reset_ms = oldest_ms + self.window.as_millis() as i64;
                let remaining_ms = (reset_ms - now_ms).max(0) as u64;
                remaining_ms.div_ceil(1000)
            }
            Ok(None) => 0,
            Err(e) => {
                warn!("Rate limiter retry-after lookup failed for {endpoint}: {e}");
                self.window.as_secs()
            }
        }
    }
}
