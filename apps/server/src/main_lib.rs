use std::sync::{Arc, RwLock};

use orbwatch_market_data::{MarketAnalyzer, MarketDataClient};
use orbwatch_store::{DataStore, MemoryStore, RedisStore};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::scheduler::RefreshStatus;

pub struct AppState {
    pub config: Config,
    pub client: Arc<MarketDataClient>,
    pub analyzer: Arc<MarketAnalyzer>,
    /// Outcome of the most recent refresh cycle, for status reporting.
    pub last_refresh: RwLock<Option<RefreshStatus>>,
}

pub fn init_tracing() {
    let log_format = std::env::var("ORBWATCH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let store: Arc<dyn DataStore> = if config.redis_url.is_empty() {
        tracing::warn!("No Redis URL configured, falling back to the in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(RedisStore::new(&config.redis_url, &config.key_prefix).await?)
    };

    let client = Arc::new(MarketDataClient::new(store)?);
    let analyzer = Arc::new(MarketAnalyzer::new(client.clone()));

    Ok(Arc::new(AppState {
        config: config.clone(),
        client,
        analyzer,
        last_refresh: RwLock::new(None),
    }))
}
