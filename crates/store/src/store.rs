//! The [`DataStore`] trait and the fail-open JSON cache helpers.

use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// One entry of a per-(market, instrument) price stream.
///
/// Timestamps are epoch milliseconds, wall-clock ordered at insertion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Insertion timestamp in epoch milliseconds.
    pub timestamp_ms: i64,
    /// Chaos-equivalent price at that time.
    pub price: f64,
    /// Listing-count liquidity proxy, when known.
    pub volume: Option<u64>,
}

/// Storage backend contract shared by the cache, the price-history streams
/// and the rate limiter's sliding windows.
///
/// All keys are logical; backends may apply their own key prefix.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Fetch a raw cache value. `None` on missing or expired keys.
    async fn get_raw(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store a raw cache value, optionally with a TTL.
    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()>;

    /// Delete a cache key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Append one point to a price stream, then trim the stream so that at
    /// most `max_len` newest entries remain. The stream may therefore shrink
    /// even though only one point was added.
    async fn append_point(
        &self,
        stream_key: &str,
        point: &PricePoint,
        max_len: usize,
    ) -> StoreResult<()>;

    /// Up to `count` most recent points of a stream, newest first.
    /// An absent stream yields an empty vector.
    async fn recent_points(&self, stream_key: &str, count: usize) -> StoreResult<Vec<PricePoint>>;

    /// Drop window entries with a timestamp at or before `cutoff_ms`.
    async fn window_purge(&self, key: &str, cutoff_ms: i64) -> StoreResult<()>;

    /// Number of entries currently in the window.
    async fn window_count(&self, key: &str) -> StoreResult<u64>;

    /// Record an admitted request at `at_ms`; the key itself expires after
    /// `ttl` so idle windows do not accumulate.
    async fn window_record(&self, key: &str, at_ms: i64, ttl: Duration) -> StoreResult<()>;

    /// Timestamp of the oldest entry in the window, if any.
    async fn window_oldest(&self, key: &str) -> StoreResult<Option<i64>>;
}

/// Read a JSON cache entry, treating every failure as a miss.
///
/// Storage errors and unparseable payloads are logged and reported as
/// `None`; callers proceed exactly as they would on a cold cache.
pub async fn get_json<T: DeserializeOwned>(store: &dyn DataStore, key: &str) -> Option<T> {
    match store.get_raw(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding unparseable cache entry {key}: {e}");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("Cache read failed for {key}, treating as miss: {e}");
            None
        }
    }
}

/// Write a JSON cache entry, logging and dropping any failure.
pub async fn set_json<T: Serialize>(
    store: &dyn DataStore,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Failed to serialize cache entry {key}: {e}");
            return;
        }
    };
    if let Err(e) = store.set_raw(key, &raw, ttl).await {
        warn!("Cache write failed for {key}: {e}");
    }
}
