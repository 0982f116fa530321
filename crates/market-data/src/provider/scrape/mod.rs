//! Last-resort acquisition tier: render the public economy page in a
//! headless browser and read the listing table row by row.

mod page;
mod rows;

pub use page::{extract_table_rows, HeadlessPage, PageSource};
pub use rows::{KeywordRowInterpreter, RowInterpreter, RowReading, ScrapedRow};

use async_trait::async_trait;
use chrono::Utc;
use log::info;

use crate::constants::{league_url_slug, NINJA_WEB_URL};
use crate::errors::MarketDataError;
use crate::models::InstrumentSnapshot;
use crate::provider::SnapshotProvider;

const PROVIDER_ID: &str = "NINJA_SCRAPE";
const ENDPOINT_TAG: &str = "poeninja:scrape";

/// Scrape-tier provider.
///
/// Both collaborators are injected: the page source so tests never
/// launch a browser, the row interpreter so the fragile column
/// heuristics can be replaced when the upstream markup changes.
pub struct ScrapeProvider {
    source: Box<dyn PageSource>,
    interpreter: Box<dyn RowInterpreter>,
}

impl ScrapeProvider {
    pub fn new() -> Self {
        Self::with_parts(Box::new(HeadlessPage::new()), Box::new(KeywordRowInterpreter))
    }

    pub fn with_parts(source: Box<dyn PageSource>, interpreter: Box<dyn RowInterpreter>) -> Self {
        Self {
            source,
            interpreter,
        }
    }

    fn market_url(&self, market: &str) -> String {
        format!(
            "{NINJA_WEB_URL}/poe2/economy/{}/currency",
            league_url_slug(market)
        )
    }
}

impl Default for ScrapeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotProvider for ScrapeProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn endpoint_tag(&self) -> &'static str {
        ENDPOINT_TAG
    }

    async fn fetch_market(
        &self,
        market: &str,
    ) -> Result<Vec<InstrumentSnapshot>, MarketDataError> {
        let url = self.market_url(market);
        let html = self.source.page_html(&url).await?;

        let now = Utc::now();
        let snapshots: Vec<InstrumentSnapshot> = extract_table_rows(&html)
            .iter()
            .filter_map(|row| self.interpreter.interpret(row))
            .map(|reading| InstrumentSnapshot {
                name: reading.name,
                price: reading.price,
                change_series: Vec::new(),
                change_percent: reading.change_percent,
                listings: 0,
                sampled_at: now,
                source: PROVIDER_ID.to_string(),
            })
            .collect();

        info!(
            "{PROVIDER_ID}: scraped {} instruments for {market}",
            snapshots.len()
        );
        Ok(snapshots)
    }
}
