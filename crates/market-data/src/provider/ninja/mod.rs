//! Secondary structured tier.
//!
//! The currency-overview API already quotes chaos-equivalent prices, so
//! normalization is a straight field mapping. Serves the markets the
//! primary tier does not cover.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::constants::NINJA_API_URL;
use crate::errors::MarketDataError;
use crate::models::InstrumentSnapshot;
use crate::provider::SnapshotProvider;

const PROVIDER_ID: &str = "NINJA_API";
const ENDPOINT_TAG: &str = "poeninja:api";

/// Secondary-tier client.
pub struct NinjaApiProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CurrencyOverviewResponse {
    #[serde(default)]
    lines: Vec<CurrencyLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrencyLine {
    currency_type_name: String,
    #[serde(default)]
    chaos_equivalent: f64,
    #[serde(default)]
    pay_spark_line: SparkLine,
    pay: Option<CurrencyDetail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SparkLine {
    /// Trailing chaos prices; gaps in upstream data arrive as nulls.
    #[serde(default)]
    data: Vec<Option<f64>>,
    #[serde(default)]
    total_change: f64,
}

#[derive(Debug, Deserialize)]
struct CurrencyDetail {
    #[serde(default)]
    listing_count: u64,
    sample_time_utc: Option<DateTime<Utc>>,
}

impl NinjaApiProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: NINJA_API_URL.to_string(),
        }
    }
}

#[async_trait]
impl SnapshotProvider for NinjaApiProvider {
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
        let url = format!("{}/currencyoverview", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("league", market), ("type", "Currency")])
            .send()
            .await?;

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

        let body: CurrencyOverviewResponse =
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

fn normalize(lines: Vec<CurrencyLine>) -> Vec<InstrumentSnapshot> {
    let now = Utc::now();
    lines
        .into_iter()
        .filter(|line| line.chaos_equivalent > 0.0)
        .map(|line| {
            let (listings, sampled_at) = match &line.pay {
                Some(pay) => (pay.listing_count, pay.sample_time_utc.unwrap_or(now)),
                None => (0, now),
            };
            InstrumentSnapshot {
                name: line.currency_type_name,
                price: line.chaos_equivalent,
                change_series: line.pay_spark_line.data.into_iter().flatten().collect(),
                change_percent: line.pay_spark_line.total_change,
                listings,
                sampled_at,
                source: PROVIDER_ID.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "lines": [
            {
                "currencyTypeName": "Divine Orb",
                "chaosEquivalent": 180.5,
                "paySparkLine": { "data": [170.0, null, 175.2, 180.5], "totalChange": 6.2 },
                "receiveSparkLine": { "data": [], "totalChange": 0 },
                "pay": {
                    "count": 45,
                    "value": 0.0055,
                    "listing_count": 1200,
                    "sample_time_utc": "2025-08-01T12:00:00Z"
                }
            },
            {
                "currencyTypeName": "Scroll Fragment",
                "chaosEquivalent": 0.0,
                "paySparkLine": { "data": [], "totalChange": 0 }
            }
        ],
        "currencyDetails": []
    }"#;

    #[test]
    fn test_normalize_maps_fields() {
        let body: CurrencyOverviewResponse = serde_json::from_str(FIXTURE).unwrap();
        let snapshots = normalize(body.lines);

        assert_eq!(snapshots.len(), 1);
        let divine = &snapshots[0];
        assert_eq!(divine.name, "Divine Orb");
        assert_eq!(divine.price, 180.5);
        assert_eq!(divine.change_percent, 6.2);
        assert_eq!(divine.listings, 1200);
        // Sparkline nulls are dropped, order preserved.
        assert_eq!(divine.change_series, vec![170.0, 175.2, 180.5]);
        assert_eq!(divine.source, PROVIDER_ID);
    }

    #[test]
    fn test_non_positive_prices_are_filtered() {
        let body: CurrencyOverviewResponse = serde_json::from_str(FIXTURE).unwrap();
        let snapshots = normalize(body.lines);
        assert!(snapshots.iter().all(|s| s.price > 0.0));
    }

    #[test]
    fn test_missing_pay_detail_defaults() {
        let raw = r#"{"lines":[{"currencyTypeName":"Chaos Orb","chaosEquivalent":1.0,"paySparkLine":{"data":[],"totalChange":0}}]}"#;
        let body: CurrencyOverviewResponse = serde_json::from_str(raw).unwrap();
        let snapshots = normalize(body.lines);
        assert_eq!(snapshots[0].listings, 0);
    }
}
