//! Browser-driven page retrieval for the scrape tier.
//!
//! The browser process is expensive, so one instance is launched lazily
//! and reused across calls; each call opens and closes its own tab. The
//! driver sits behind [`PageSource`] so the provider and its tests never
//! touch a real browser.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, info};
use scraper::{Html, Selector};

use crate::constants::{NAVIGATION_TIMEOUT, PAGE_SETTLE, USER_AGENT};
use crate::errors::MarketDataError;
use crate::provider::scrape::rows::ScrapedRow;

/// Retrieves the rendered HTML of a page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn page_html(&self, url: &str) -> Result<String, MarketDataError>;
}

/// [`PageSource`] backed by a shared headless browser.
pub struct HeadlessPage {
    browser: Arc<Mutex<Option<Browser>>>,
    navigation_timeout: Duration,
    settle: Duration,
}

impl HeadlessPage {
    pub fn new() -> Self {
        Self {
            browser: Arc::new(Mutex::new(None)),
            navigation_timeout: NAVIGATION_TIMEOUT,
            settle: PAGE_SETTLE,
        }
    }
}

impl Default for HeadlessPage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageSource for HeadlessPage {
    async fn page_html(&self, url: &str) -> Result<String, MarketDataError> {
        let browser = Arc::clone(&self.browser);
        let url = url.to_string();
        let navigation_timeout = self.navigation_timeout;
        let settle = self.settle;

        tokio::task::spawn_blocking(move || {
            fetch_blocking(&browser, &url, navigation_timeout, settle)
        })
        .await
        .map_err(|e| MarketDataError::Scrape(format!("scrape task failed: {e}")))?
    }
}

fn lock_browser(slot: &Mutex<Option<Browser>>) -> MutexGuard<'_, Option<Browser>> {
    match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn fetch_blocking(
    slot: &Mutex<Option<Browser>>,
    url: &str,
    navigation_timeout: Duration,
    settle: Duration,
) -> Result<String, MarketDataError> {
    let browser = {
        let mut guard = lock_browser(slot);
        if guard.is_none() {
            info!("Launching headless browser for scrape tier");
            let options = LaunchOptions::default_builder()
                .headless(true)
                .sandbox(false)
                .window_size(Some((1920, 1080)))
                .build()
                .map_err(|e| MarketDataError::Scrape(format!("browser options: {e}")))?;
            let launched = Browser::new(options)
                .map_err(|e| MarketDataError::Scrape(format!("browser launch: {e}")))?;
            *guard = Some(launched);
        }
        guard.clone()
    };
    let Some(browser) = browser else {
        return Err(MarketDataError::Scrape("browser unavailable".to_string()));
    };

    let tab = match browser.new_tab() {
        Ok(tab) => tab,
        Err(e) => {
            // The cached process may have died; relaunch on the next call.
            let _ = lock_browser(slot).take();
            return Err(MarketDataError::Scrape(format!("new tab: {e}")));
        }
    };
    tab.set_default_timeout(navigation_timeout);

    let result = (|| {
        tab.set_user_agent(USER_AGENT, None, None)
            .map_err(|e| MarketDataError::Scrape(format!("user agent: {e}")))?;
        debug!("Navigating to {url}");
        tab.navigate_to(url)
            .map_err(|e| MarketDataError::Scrape(format!("navigate: {e}")))?;
        tab.wait_until_navigated()
            .map_err(|e| MarketDataError::Scrape(format!("navigation wait: {e}")))?;
        // Let the client-side app finish rendering the table.
        std::thread::sleep(settle);
        tab.get_content()
            .map_err(|e| MarketDataError::Scrape(format!("page content: {e}")))
    })();

    let _ = tab.close(true);
    result
}

/// Pull the cell texts of every body row of every table in the page.
///
/// Cell text fragments are newline-joined so nested markup stays
/// separable from the leading name line.
pub fn extract_table_rows(html: &str) -> Vec<ScrapedRow> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("table tbody tr").expect("Invalid selector");
    let cell_selector = Selector::parse("td").expect("Invalid selector");

    document
        .select(&row_selector)
        .map(|row| ScrapedRow {
            cells: row
                .select(&cell_selector)
                .map(|cell| {
                    cell.text()
                        .map(str::trim)
                        .filter(|fragment| !fragment.is_empty())
                        .collect::<Vec<_>>()
                        .join("\n")
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_body_rows_with_cell_texts() {
        let html = r#"
            <table>
              <thead><tr><th>Name</th><th>Value</th></tr></thead>
              <tbody>
                <tr><td><span>Divine Orb</span></td><td>180.5</td><td>+6.2%</td></tr>
                <tr><td>Chaos Orb</td><td>1.0</td></tr>
              </tbody>
            </table>
        "#;
        let rows = extract_table_rows(html);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells, vec!["Divine Orb", "180.5", "+6.2%"]);
        assert_eq!(rows[1].cells, vec!["Chaos Orb", "1.0"]);
    }

    #[test]
    fn test_nested_markup_joins_on_newlines() {
        let html = r#"
            <table><tbody>
              <tr><td><div>Vaal Orb</div><div>(low confidence)</div></td><td>2.5</td></tr>
            </tbody></table>
        "#;
        let rows = extract_table_rows(html);
        assert_eq!(rows[0].cells[0], "Vaal Orb\n(low confidence)");
    }

    #[test]
    fn test_no_table_yields_no_rows() {
        assert!(extract_table_rows("<html><body><p>loading</p></body></html>").is_empty());
    }
}
