//! Market data client: tiered acquisition with caching and history
//! recording.
//!
//! Tiers are tried in fixed order until one yields a non-empty batch.
//! Every successful fetch caches each snapshot under a short TTL and
//! appends one point to the instrument's price-history stream. History
//! writes are logged and dropped on failure; snapshot delivery never
//! depends on persistence.

use std::sync::Arc;

use log::{debug, info, warn};
use orbwatch_store::{get_json, keys, set_json, DataStore, PricePoint};

use crate::constants::{
    API_TIMEOUT, HISTORY_MAX_POINTS, NAME_LIST_TTL, RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW,
    SNAPSHOT_TTL, USER_AGENT,
};
use crate::errors::MarketDataError;
use crate::models::InstrumentSnapshot;
use crate::provider::{NinjaApiProvider, ScoutApiProvider, ScrapeProvider, SnapshotProvider};
use crate::rate_limiter::RateLimiter;

/// Tiered market-data acquisition front end.
pub struct MarketDataClient {
    store: Arc<dyn DataStore>,
    rate_limiter: RateLimiter,
    tiers: Vec<Box<dyn SnapshotProvider>>,
}

impl MarketDataClient {
    /// Build the client with the standard tier chain: primary API,
    /// secondary API, browser scrape.
    pub fn new(store: Arc<dyn DataStore>) -> Result<Self, MarketDataError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(API_TIMEOUT)
            .build()?;

        let tiers: Vec<Box<dyn SnapshotProvider>> = vec![
            Box::new(ScoutApiProvider::new(http.clone())),
            Box::new(NinjaApiProvider::new(http)),
            Box::new(ScrapeProvider::new()),
        ];
        Ok(Self::with_tiers(store, tiers))
    }

    /// Build the client with an explicit tier chain.
    pub fn with_tiers(store: Arc<dyn DataStore>, tiers: Vec<Box<dyn SnapshotProvider>>) -> Self {
        let rate_limiter = RateLimiter::new(
            Arc::clone(&store),
            RATE_LIMIT_MAX_REQUESTS,
            RATE_LIMIT_WINDOW,
        );
        Self {
            store,
            rate_limiter,
            tiers,
        }
    }

    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }

    /// All instruments of a market, from cache or by walking the tier
    /// chain.
    pub async fn get_all_instruments(
        &self,
        market: &str,
    ) -> Result<Vec<InstrumentSnapshot>, MarketDataError> {
        let list_key = keys::discord(&format!("market:{market}:all"));
        if let Some(cached) = get_json::<Vec<InstrumentSnapshot>>(self.store.as_ref(), &list_key)
            .await
        {
            debug!("Cache hit for market {market} ({} instruments)", cached.len());
            return Ok(cached);
        }

        let snapshots = self.fetch_market(market).await?;

        set_json(self.store.as_ref(), &list_key, &snapshots, Some(SNAPSHOT_TTL)).await;
        for snapshot in &snapshots {
            self.record_snapshot(market, snapshot).await;
        }
        Ok(snapshots)
    }

    /// One instrument by name. Cache is checked under the exact name;
    /// a miss falls through to the full market fetch and a
    /// case-insensitive search.
    pub async fn get_instrument(
        &self,
        market: &str,
        name: &str,
    ) -> Result<Option<InstrumentSnapshot>, MarketDataError> {
        let cache_key = keys::snapshot(market, name);
        if let Some(cached) = get_json::<InstrumentSnapshot>(self.store.as_ref(), &cache_key).await
        {
            return Ok(Some(cached));
        }

        let snapshots = self.get_all_instruments(market).await?;
        Ok(snapshots
            .into_iter()
            .find(|s| s.name.eq_ignore_ascii_case(name)))
    }

    /// Names of every instrument currently priced in a market.
    pub async fn get_instrument_names(
        &self,
        market: &str,
    ) -> Result<Vec<String>, MarketDataError> {
        let names_key = keys::discord(&format!("market:{market}:names"));
        if let Some(cached) = get_json::<Vec<String>>(self.store.as_ref(), &names_key).await {
            return Ok(cached);
        }

        let mut names: Vec<String> = self
            .get_all_instruments(market)
            .await?
            .into_iter()
            .map(|s| s.name)
            .collect();
        names.sort();
        set_json(self.store.as_ref(), &names_key, &names, Some(NAME_LIST_TTL)).await;
        Ok(names)
    }

    /// Walk the tier chain until one returns a non-empty batch.
    async fn fetch_market(
        &self,
        market: &str,
    ) -> Result<Vec<InstrumentSnapshot>, MarketDataError> {
        let mut last_error: Option<MarketDataError> = None;

        for tier in &self.tiers {
            if !tier.covers(market) {
                debug!("Tier {} does not cover {market}, skipping", tier.id());
                continue;
            }

            let endpoint = tier.endpoint_tag();
            if !self.rate_limiter.admit(endpoint).await {
                let retry_after_secs = self.rate_limiter.retry_after(endpoint).await;
                warn!("Tier {} rate limited for {retry_after_secs}s", tier.id());
                last_error = Some(MarketDataError::RateLimited {
                    endpoint: endpoint.to_string(),
                    retry_after_secs,
                });
                continue;
            }

            match tier.fetch_market(market).await {
                Ok(snapshots) if !snapshots.is_empty() => {
                    info!(
                        "Tier {} served {} instruments for {market}",
                        tier.id(),
                        snapshots.len()
                    );
                    return Ok(snapshots);
                }
                Ok(_) => {
                    debug!("Tier {} had nothing for {market}, trying next", tier.id());
                }
                Err(e) if e.falls_through() => {
                    warn!("Tier {} failed for {market}: {e}, trying next", tier.id());
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| MarketDataError::AllTiersFailed {
            market: market.to_string(),
        }))
    }

    /// Cache one snapshot and append its history point. Both writes are
    /// best-effort: a failed write must never abort the fetch that
    /// produced the snapshot.
    pub async fn record_snapshot(&self, market: &str, snapshot: &InstrumentSnapshot) {
        let cache_key = keys::snapshot(market, &snapshot.name);
        set_json(self.store.as_ref(), &cache_key, snapshot, Some(SNAPSHOT_TTL)).await;

        let stream_key = keys::price_stream(market, &snapshot.name);
        let point = PricePoint {
            timestamp_ms: snapshot.sampled_at.timestamp_millis(),
            price: snapshot.price,
            volume: (snapshot.listings > 0).then_some(snapshot.listings),
        };
        if let Err(e) = self
            .store
            .append_point(&stream_key, &point, HISTORY_MAX_POINTS)
            .await
        {
            warn!("History append failed for {stream_key}: {e}");
        }
    }
}
