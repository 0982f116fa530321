//! Primary structured tier.
//!
//! Fast JSON API keyed by an internal league name. Quotes are relative:
//! each line carries "units of this instrument per 1 anchor", not a
//! chaos price. Normalization locates the anchor instrument in the
//! response and rebases every line (and its trailing series) into
//! chaos-equivalents. Markets missing from the coverage table are not
//! served by this tier.

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::constants::{league_api_name, ANCHOR_CURRENCY, APPROX_ANCHOR_QUOTE, SCOUT_API_URL};
use crate::errors::MarketDataError;
use crate::models::InstrumentSnapshot;
use crate::provider::SnapshotProvider;

const PROVIDER_ID: &str = "SCOUT_API";
const ENDPOINT_TAG: &str = "scout:api";

/// Primary-tier client.
pub struct ScoutApiProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CurrencyListResponse {
    lines: Vec<CurrencyListLine>,
}

#[derive(Debug, Deserialize)]
struct CurrencyListLine {
    name: String,
    /// Units of this instrument traded per 1 anchor.
    value: f64,
    /// Trailing quote series in the same per-anchor units.
    #[serde(default)]
    sparkline: Vec<f64>,
    #[serde(default)]
    listings: u64,
}

impl ScoutApiProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: SCOUT_API_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SnapshotProvider for ScoutApiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn endpoint_tag(&self) -> &'static str {
        ENDPOINT_TAG
    }

    fn covers(&self, market: &str) -> bool {
        league_api_name(market).is_some()
    }

    async fn fetch_market(
        &self,
        market: &str,
    ) -> Result<Vec<InstrumentSnapshot>, MarketDataError> {
        let Some(api_name) = league_api_name(market) else {
            return Err(MarketDataError::NotCovered {
                provider: PROVIDER_ID.to_string(),
            });
        };

        let url = format!("{}/currency", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("league", api_name)])
            .send()
            .await?;

        // Unknown leagues come back as 404; expected, the next tier takes over.
        if response.status() == StatusCode::NOT_FOUND {
            debug!("{PROVIDER_ID}: league {market} not found upstream");
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("unexpected status {}", response.status()),
            });
        }

        let body: CurrencyListResponse =
            response
                .json()
                .await
                .map_err(|e| MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("malformed response: {e}"),
                })?;

        Ok(normalize(body.lines))
    }
}

/// Rebase per-anchor quotes into chaos-equivalent snapshots.
///
/// The anchor's own quote `v` gives the conversion: an instrument quoted
/// at `q` units-per-anchor is worth `v / q` chaos. When the anchor is
/// absent from the response the approximate constant stands in.
fn normalize(lines: Vec<CurrencyListLine>) -> Vec<InstrumentSnapshot> {
    let anchor_quote = lines
        .iter()
        .find(|line| line.name.eq_ignore_ascii_case(ANCHOR_CURRENCY))
        .map(|line| line.value)
        .filter(|v| *v > 0.0)
        .unwrap_or_else(|| {
            warn!("{PROVIDER_ID}: anchor {ANCHOR_CURRENCY} missing, assuming {APPROX_ANCHOR_QUOTE}");
            APPROX_ANCHOR_QUOTE
        });

    let now = Utc::now();
    lines
        .into_iter()
        .filter_map(|line| {
            if line.value <= 0.0 {
                return None;
            }
            let price = anchor_quote / line.value;

            let change_series: Vec<f64> = line
                .sparkline
                .iter()
                .filter(|quote| **quote > 0.0)
                .map(|quote| anchor_quote / quote)
                .collect();
            let change_percent = match (change_series.first(), change_series.last()) {
                (Some(first), Some(last)) if change_series.len() >= 2 && *first > 0.0 => {
                    (last / first - 1.0) * 100.0
                }
                _ => 0.0,
            };

            Some(InstrumentSnapshot {
                name: line.name,
                price,
                change_series,
                change_percent,
                listings: line.listings,
                sampled_at: now,
                source: PROVIDER_ID.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, value: f64) -> CurrencyListLine {
        CurrencyListLine {
            name: name.to_string(),
            value,
            sparkline: Vec::new(),
            listings: 0,
        }
    }

    #[test]
    fn test_rebases_against_anchor() {
        // Divine quoted at 0.0333 divines-per-chaos, anchor at 1.0:
        // chaos-equivalent is 1 / 0.0333 ~= 30.03.
        let snapshots = normalize(vec![line("Chaos Orb", 1.0), line("Divine Orb", 0.0333)]);

        let divine = snapshots.iter().find(|s| s.name == "Divine Orb").unwrap();
        assert!((divine.price - 30.03).abs() < 0.01);

        // The anchor rebased against itself is exactly 1 chaos.
        let chaos = snapshots.iter().find(|s| s.name == "Chaos Orb").unwrap();
        assert!((chaos.price - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rebasing_is_internally_consistent() {
        // With the anchor quoted at v != 1, every price scales by v.
        let v = 4.0;
        let snapshots = normalize(vec![line("Chaos Orb", v), line("Divine Orb", 0.1)]);

        let chaos = snapshots.iter().find(|s| s.name == "Chaos Orb").unwrap();
        let divine = snapshots.iter().find(|s| s.name == "Divine Orb").unwrap();
        assert!((chaos.price - 1.0).abs() < f64::EPSILON);
        assert!((divine.price - v / 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_missing_anchor_falls_back_to_constant() {
        let snapshots = normalize(vec![line("Divine Orb", 0.05)]);
        let divine = &snapshots[0];
        assert!((divine.price - APPROX_ANCHOR_QUOTE / 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_quotes_are_filtered() {
        let snapshots = normalize(vec![
            line("Chaos Orb", 1.0),
            line("Broken Orb", 0.0),
            line("Negative Orb", -2.0),
        ]);
        assert_eq!(snapshots.len(), 1);
        assert!(snapshots.iter().all(|s| s.price > 0.0));
    }

    #[test]
    fn test_series_rebasing_flips_direction() {
        // A rising per-anchor quote means the instrument got cheaper.
        let mut rising = line("Divine Orb", 0.05);
        rising.sparkline = vec![0.04, 0.05];
        let snapshots = normalize(vec![line("Chaos Orb", 1.0), rising]);

        let divine = snapshots.iter().find(|s| s.name == "Divine Orb").unwrap();
        assert!(divine.change_percent < 0.0);
        // Rebased series is chaos-equivalents: 25.0 then 20.0.
        assert_eq!(divine.change_series, vec![25.0, 20.0]);
    }

    #[test]
    fn test_uncovered_market_is_declared() {
        let provider = ScoutApiProvider::with_base_url(Client::new(), "http://unused");
        assert!(provider.covers("Dawn"));
        assert!(!provider.covers("Hardcore Settlers"));
    }
}
