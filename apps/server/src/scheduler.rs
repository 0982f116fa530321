//! Background scheduler for the periodic market refresh.
//!
//! Walks the active leagues on a fixed interval to keep the snapshot
//! cache and price history warm. Instruments are fetched sequentially
//! per market to stay inside the rate-limit budget.

use std::sync::Arc;

use orbwatch_market_data::constants::{ACTIVE_LEAGUES, SCHEDULED_FETCH_CURRENCIES};
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use crate::main_lib::AppState;

/// Initial delay before the first refresh (let the server fully start).
const INITIAL_DELAY_SECS: u64 = 60;

/// Outcome of one refresh cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RefreshStatus {
    pub markets_refreshed: usize,
    pub instruments_refreshed: usize,
    pub failures: usize,
}

/// Starts the background market refresh scheduler.
pub fn start_market_refresh_scheduler(state: Arc<AppState>) {
    let interval_secs = state.config.refresh_interval_secs;
    tokio::spawn(async move {
        info!("Market refresh scheduler started ({interval_secs}s interval)");

        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        let mut refresh_interval = interval(Duration::from_secs(interval_secs));
        loop {
            refresh_interval.tick().await;
            let status = run_scheduled_refresh(&state).await;
            info!(
                "Refresh cycle done: {} markets, {} instruments, {} failures",
                status.markets_refreshed, status.instruments_refreshed, status.failures
            );
            if let Ok(mut last) = state.last_refresh.write() {
                *last = Some(status);
            }
        }
    });
}

/// Runs a single refresh cycle over every active league.
pub async fn run_scheduled_refresh(state: &Arc<AppState>) -> RefreshStatus {
    let mut status = RefreshStatus::default();
    for market in ACTIVE_LEAGUES {
        match refresh_market(state, market).await {
            Ok(count) => {
                status.markets_refreshed += 1;
                status.instruments_refreshed += count;
            }
            Err(e) => {
                warn!("Refresh failed for {market}: {e}");
                status.failures += 1;
                continue;
            }
        }

        // Exercise the aggregate view so its cache stays warm too.
        match state.analyzer.generate_market_trends(market).await {
            Ok(trends) => info!(
                "{market}: {} instruments tracked, sentiment {:?}, avg change {:.2}%",
                trends.instruments_tracked, trends.sentiment, trends.average_change
            ),
            Err(e) => warn!("Trends refresh failed for {market}: {e}"),
        }
    }
    status
}

/// Refreshes one market, returning how many instruments were touched.
async fn refresh_market(state: &Arc<AppState>, market: &str) -> anyhow::Result<usize> {
    if state.config.fetch_all {
        let snapshots = state.client.get_all_instruments(market).await?;
        return Ok(snapshots.len());
    }

    // Popular subset only, fetched one by one. The first lookup warms
    // the market cache, so the rest resolve without new upstream calls.
    let mut refreshed = 0;
    for name in SCHEDULED_FETCH_CURRENCIES {
        match state.client.get_instrument(market, name).await {
            Ok(Some(_)) => refreshed += 1,
            Ok(None) => {}
            Err(e) => {
                warn!("Refresh of {name} in {market} failed: {e}");
            }
        }
    }
    Ok(refreshed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use orbwatch_market_data::{
        InstrumentSnapshot, MarketAnalyzer, MarketDataClient, MarketDataError, SnapshotProvider,
    };
    use orbwatch_store::{keys, DataStore, MemoryStore};

    use crate::config::Config;

    struct FixedTier;

    #[async_trait]
    impl SnapshotProvider for FixedTier {
        fn id(&self) -> &'static str {
            "FIXED"
        }

        fn endpoint_tag(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_market(
            &self,
            _market: &str,
        ) -> Result<Vec<InstrumentSnapshot>, MarketDataError> {
            Ok(vec![
                snapshot("Divine Orb", 180.0),
                snapshot("Chaos Orb", 1.0),
            ])
        }
    }

    fn snapshot(name: &str, price: f64) -> InstrumentSnapshot {
        InstrumentSnapshot {
            name: name.to_string(),
            price,
            change_series: vec![],
            change_percent: 0.0,
            listings: 10,
            sampled_at: Utc::now(),
            source: "FIXED".to_string(),
        }
    }

    fn state(fetch_all: bool) -> (Arc<AppState>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let client = Arc::new(MarketDataClient::with_tiers(
            store.clone() as Arc<dyn DataStore>,
            vec![Box::new(FixedTier)],
        ));
        let analyzer = Arc::new(MarketAnalyzer::new(client.clone()));
        let config = Config {
            redis_url: String::new(),
            key_prefix: String::new(),
            refresh_enabled: true,
            refresh_interval_secs: 3600,
            fetch_all,
        };
        (
            Arc::new(AppState {
                config,
                client,
                analyzer,
                last_refresh: std::sync::RwLock::new(None),
            }),
            store,
        )
    }

    #[tokio::test]
    async fn test_fetch_all_refresh_touches_every_instrument() {
        let (state, store) = state(true);

        let status = run_scheduled_refresh(&state).await;
        assert_eq!(status.markets_refreshed, ACTIVE_LEAGUES.len());
        assert_eq!(
            status.instruments_refreshed,
            2 * ACTIVE_LEAGUES.len()
        );
        assert_eq!(status.failures, 0);

        // History was recorded for each market's instruments.
        for market in ACTIVE_LEAGUES {
            let points = store
                .recent_points(&keys::price_stream(market, "Divine Orb"), 10)
                .await
                .unwrap();
            assert_eq!(points.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_popular_subset_refresh_counts_only_priced_names() {
        let (state, _) = state(false);

        let status = run_scheduled_refresh(&state).await;
        // Only two of the popular names are priced by the stub tier.
        assert_eq!(status.markets_refreshed, ACTIVE_LEAGUES.len());
        assert_eq!(status.instruments_refreshed, 2 * ACTIVE_LEAGUES.len());
    }
}
