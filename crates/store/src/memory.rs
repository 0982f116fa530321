//! In-memory [`DataStore`] implementation.
//!
//! Used by the test suites and when no Redis URL is configured.
//! Semantics match the Redis backend: TTL'd cache entries, capped
//! newest-first streams, millisecond-scored windows.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::store::{DataStore, PricePoint};

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// In-process data store backed by mutex'd maps.
#[derive(Default)]
pub struct MemoryStore {
    cache: Mutex<HashMap<String, CacheEntry>>,
    streams: Mutex<HashMap<String, VecDeque<PricePoint>>>,
    windows: Mutex<HashMap<String, Vec<i64>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Lock with poison recovery: stale data beats a panic cascade here.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn get_raw(&self, key: &str) -> StoreResult<Option<String>> {
        let mut cache = lock(&self.cache);
        match cache.get(key) {
            Some(entry) if entry.is_expired() => {
                cache.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()> {
        lock(&self.cache).insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        lock(&self.cache).remove(key);
        Ok(())
    }

    async fn append_point(
        &self,
        stream_key: &str,
        point: &PricePoint,
        max_len: usize,
    ) -> StoreResult<()> {
        let mut streams = lock(&self.streams);
        let stream = streams.entry(stream_key.to_string()).or_default();
        stream.push_back(*point);
        while stream.len() > max_len {
            stream.pop_front();
        }
        Ok(())
    }

    async fn recent_points(&self, stream_key: &str, count: usize) -> StoreResult<Vec<PricePoint>> {
        let streams = lock(&self.streams);
        Ok(streams
            .get(stream_key)
            .map(|stream| stream.iter().rev().take(count).copied().collect())
            .unwrap_or_default())
    }

    async fn window_purge(&self, key: &str, cutoff_ms: i64) -> StoreResult<()> {
        if let Some(window) = lock(&self.windows).get_mut(key) {
            window.retain(|&at| at > cutoff_ms);
        }
        Ok(())
    }

    async fn window_count(&self, key: &str) -> StoreResult<u64> {
        Ok(lock(&self.windows)
            .get(key)
            .map(|window| window.len() as u64)
            .unwrap_or(0))
    }

    async fn window_record(&self, key: &str, at_ms: i64, _ttl: Duration) -> StoreResult<()> {
        lock(&self.windows)
            .entry(key.to_string())
            .or_default()
            .push(at_ms);
        Ok(())
    }

    async fn window_oldest(&self, key: &str) -> StoreResult<Option<i64>> {
        Ok(lock(&self.windows)
            .get(key)
            .and_then(|window| window.iter().min().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;

    fn point(timestamp_ms: i64, price: f64) -> PricePoint {
        PricePoint {
            timestamp_ms,
            price,
            volume: None,
        }
    }

    #[tokio::test]
    async fn test_cache_roundtrip_and_delete() {
        let store = MemoryStore::new();
        store.set_raw("k", "v", None).await.unwrap();
        assert_eq!(store.get_raw("k").await.unwrap().as_deref(), Some("v"));

        store.delete("k").await.unwrap();
        assert_eq!(store.get_raw("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cache_ttl_expiry() {
        let store = MemoryStore::new();
        store
            .set_raw("k", "v", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        assert!(store.get_raw("k").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(store.get_raw("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stream_cap_keeps_newest() {
        let store = MemoryStore::new();
        let key = keys::price_stream("Dawn", "Chaos Orb");

        for i in 0..1500 {
            store
                .append_point(&key, &point(i, 1.0 + i as f64), 1000)
                .await
                .unwrap();
        }

        let points = store.recent_points(&key, 2000).await.unwrap();
        assert_eq!(points.len(), 1000);
        // Newest first; the oldest survivor is the 501st insertion (index 500).
        assert_eq!(points[0].timestamp_ms, 1499);
        assert_eq!(points.last().unwrap().timestamp_ms, 500);
    }

    #[tokio::test]
    async fn test_recent_points_newest_first_and_bounded() {
        let store = MemoryStore::new();
        let key = keys::price_stream("Dawn", "Divine Orb");
        for i in 0..10 {
            store.append_point(&key, &point(i, i as f64), 1000).await.unwrap();
        }

        let points = store.recent_points(&key, 3).await.unwrap();
        assert_eq!(
            points.iter().map(|p| p.timestamp_ms).collect::<Vec<_>>(),
            vec![9, 8, 7]
        );
    }

    #[tokio::test]
    async fn test_empty_stream_reads_empty() {
        let store = MemoryStore::new();
        let points = store
            .recent_points(&keys::price_stream("Dawn", "Mirror of Kalandra"), 100)
            .await
            .unwrap();
        assert!(points.is_empty());
    }

    #[tokio::test]
    async fn test_window_purge_count_oldest() {
        let store = MemoryStore::new();
        let key = keys::rate_window("poeninja:api");
        let ttl = Duration::from_secs(300);

        for at in [1000, 2000, 3000] {
            store.window_record(&key, at, ttl).await.unwrap();
        }
        assert_eq!(store.window_count(&key).await.unwrap(), 3);
        assert_eq!(store.window_oldest(&key).await.unwrap(), Some(1000));

        store.window_purge(&key, 2000).await.unwrap();
        assert_eq!(store.window_count(&key).await.unwrap(), 1);
        assert_eq!(store.window_oldest(&key).await.unwrap(), Some(3000));
    }
}
