//! Redis-backed [`DataStore`] implementation.
//!
//! Price history uses capped streams (`XADD` + `XTRIM MAXLEN`), the cache
//! uses TTL'd string keys, and the rate-limiter windows use sorted sets
//! scored by epoch milliseconds.

use std::time::Duration;

use async_trait::async_trait;
use log::info;
use redis::aio::ConnectionManager;
use redis::streams::{StreamMaxlen, StreamRangeReply};
use redis::AsyncCommands;

use crate::error::StoreResult;
use crate::store::{DataStore, PricePoint};

/// Redis data store. Cheap to clone; all methods multiplex over one
/// managed connection that reconnects on its own.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisStore {
    /// Connect to Redis at `url`. `key_prefix` is prepended to every key,
    /// so several deployments can share one instance.
    pub async fn new(url: &str, key_prefix: impl Into<String>) -> StoreResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        info!("Redis connection established");
        Ok(Self {
            conn,
            key_prefix: key_prefix.into(),
        })
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl DataStore for RedisStore {
    async fn get_raw(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.get(self.prefixed(key)).await?)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let key = self.prefixed(key);
        match ttl {
            Some(ttl) => {
                let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
            }
            None => {
                let _: () = conn.set(key, value).await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(self.prefixed(key)).await?;
        Ok(())
    }

    async fn append_point(
        &self,
        stream_key: &str,
        point: &PricePoint,
        max_len: usize,
    ) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let key = self.prefixed(stream_key);

        let mut fields: Vec<(&str, String)> = vec![
            ("timestamp", point.timestamp_ms.to_string()),
            ("price", point.price.to_string()),
        ];
        if let Some(volume) = point.volume {
            fields.push(("volume", volume.to_string()));
        }

        let _: () = conn.xadd(&key, "*", &fields).await?;
        let _: () = conn.xtrim(&key, StreamMaxlen::Equals(max_len)).await?;
        Ok(())
    }

    async fn recent_points(&self, stream_key: &str, count: usize) -> StoreResult<Vec<PricePoint>> {
        let mut conn = self.conn.clone();
        let reply: StreamRangeReply = conn
            .xrevrange_count(self.prefixed(stream_key), "+", "-", count)
            .await?;

        let mut points = Vec::with_capacity(reply.ids.len());
        for entry in reply.ids {
            // Entries without a price field are unreadable; skip them rather
            // than failing the whole query.
            let Some(price) = entry.get::<f64>("price") else {
                continue;
            };
            let timestamp_ms = entry
                .get::<i64>("timestamp")
                .unwrap_or_else(|| stream_entry_ms(&entry.id));
            points.push(PricePoint {
                timestamp_ms,
                price,
                volume: entry.get::<u64>("volume"),
            });
        }
        Ok(points)
    }

    async fn window_purge(&self, key: &str, cutoff_ms: i64) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .zrembyscore(self.prefixed(key), 0, cutoff_ms)
            .await?;
        Ok(())
    }

    async fn window_count(&self, key: &str) -> StoreResult<u64> {
        let mut conn = self.conn.clone();
        Ok(conn.zcard(self.prefixed(key)).await?)
    }

    async fn window_record(&self, key: &str, at_ms: i64, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let key = self.prefixed(key);
        let _: () = conn.zadd(&key, at_ms.to_string(), at_ms).await?;
        let _: () = conn.expire(&key, ttl.as_secs().max(1) as i64).await?;
        Ok(())
    }

    async fn window_oldest(&self, key: &str) -> StoreResult<Option<i64>> {
        let mut conn = self.conn.clone();
        let oldest: Vec<i64> = conn.zrange(self.prefixed(key), 0, 0).await?;
        Ok(oldest.into_iter().next())
    }
}

/// Millisecond part of a Redis stream entry id (`<ms>-<seq>`).
fn stream_entry_ms(id: &str) -> i64 {
    id.split('-')
        .next()
        .and_then(|ms| ms.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_entry_ms() {
        assert_eq!(stream_entry_ms("1700000000000-0"), 1_700_000_000_000);
        assert_eq!(stream_entry_ms("garbage"), 0);
    }
}
