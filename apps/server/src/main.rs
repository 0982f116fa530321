mod config;
mod main_lib;
mod scheduler;

use config::Config;
use main_lib::{build_state, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();
    init_tracing();

    let state = build_state(&config).await?;

    if config.refresh_enabled {
        scheduler::start_market_refresh_scheduler(state.clone());
    } else {
        tracing::info!("Market refresh scheduler disabled by configuration");
    }

    tracing::info!("orbwatch server running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    Ok(())
}
