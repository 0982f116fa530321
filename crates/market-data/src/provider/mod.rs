//! Acquisition tiers and the trait they share.

pub mod ninja;
pub mod scout;
pub mod scrape;

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::InstrumentSnapshot;

pub use ninja::NinjaApiProvider;
pub use scout::ScoutApiProvider;
pub use scrape::{KeywordRowInterpreter, PageSource, RowInterpreter, ScrapeProvider, ScrapedRow};

/// One acquisition strategy in the fallback chain.
///
/// Tiers are tried in fixed order by the client; each returns the full
/// normalized snapshot list for a market or an error that the client
/// logs and falls through.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Stable identifier, recorded as the snapshot source.
    fn id(&self) -> &'static str;

    /// Tag under which this tier's requests are rate limited.
    fn endpoint_tag(&self) -> &'static str;

    /// Whether this tier serves the given market at all. Tiers that
    /// need a coverage table answer `false` for unmapped markets so the
    /// client can skip them without burning a rate-limit slot.
    fn covers(&self, market: &str) -> bool {
        let _ = market;
        true
    }

    /// Fetch and normalize every instrument of a market.
    ///
    /// An empty vector means the tier answered but had nothing for this
    /// market; the client treats that the same as a failure and moves on.
    async fn fetch_market(&self, market: &str)
        -> Result<Vec<InstrumentSnapshot>, MarketDataError>;
}
