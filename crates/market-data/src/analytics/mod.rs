//! Derived analytics over snapshots and price history: movers,
//! per-instrument indicators, market trends, multi-timeframe changes and
//! name search.
//!
//! Market-wide results are cached briefly keyed by their input
//! parameters. History reads fail open: a storage outage degrades the
//! derived views instead of failing them.

pub mod history;

use std::sync::Arc;

use chrono::Utc;
use log::{debug, warn};
use orbwatch_store::{get_json, keys, set_json, PricePoint};

use crate::client::MarketDataClient;
use crate::constants::{
    ANCHOR_CURRENCY, DIVINE_CURRENCY, EXALTED_CURRENCY, HISTORY_24H_POINTS,
    HISTORY_TIMEFRAME_POINTS, MOVERS_TTL, TRENDS_TTL, VOLATILITY_SAMPLE,
};
use crate::errors::MarketDataError;
use crate::models::{
    InstrumentAnalytics, InstrumentSnapshot, KeyCurrencies, MarketBreadth, MarketTrends,
    MostStable, MoverRecord, Movers, NamedChange, NamedPrice, NamedVolume, PriceTier, Sentiment,
    TimeframeChanges, TopMovers, VolatilityBand,
};

use history::{coefficient_of_variation, timeframe_changes};

/// Analytics engine over one [`MarketDataClient`].
pub struct MarketAnalyzer {
    client: Arc<MarketDataClient>,
}

impl MarketAnalyzer {
    pub fn new(client: Arc<MarketDataClient>) -> Self {
        Self { client }
    }

    /// Top gainers and losers by trailing percent change.
    ///
    /// Instruments with zero trailing change are excluded entirely. The
    /// tier filter keeps instruments priced at least `multiplier` times
    /// the market's exalted reference price; when that reference is not
    /// priced, the filter is skipped.
    pub async fn calculate_movers(
        &self,
        market: &str,
        limit: usize,
        tier: PriceTier,
    ) -> Result<Movers, MarketDataError> {
        let cache_key =
            keys::discord(&format!("movers:{market}:{limit}:{}", tier.label()));
        if let Some(cached) = get_json::<Movers>(self.store(), &cache_key).await {
            return Ok(cached);
        }

        let snapshots = self.client.get_all_instruments(market).await?;

        let min_price = tier.multiplier().and_then(|multiplier| {
            match find_price(&snapshots, EXALTED_CURRENCY) {
                Some(exalted) => Some(exalted * multiplier),
                None => {
                    debug!("No {EXALTED_CURRENCY} price in {market}, tier filter skipped");
                    None
                }
            }
        });

        let mut gainers = Vec::new();
        let mut losers = Vec::new();
        for snapshot in &snapshots {
            if !snapshot.has_change() {
                continue;
            }
            if let Some(min) = min_price {
                if snapshot.price < min {
                    continue;
                }
            }
            let denominator = 1.0 + snapshot.change_percent / 100.0;
            if denominator == 0.0 {
                continue;
            }
            let previous_price = snapshot.price / denominator;
            let record = MoverRecord {
                name: snapshot.name.clone(),
                current_price: snapshot.price,
                previous_price,
                change_percent: snapshot.change_percent,
                change_absolute: snapshot.price - previous_price,
                volume: snapshot.listings,
            };
            if snapshot.change_percent > 0.0 {
                gainers.push(record);
            } else {
                losers.push(record);
            }
        }

        gainers.sort_by(|a, b| b.change_percent.total_cmp(&a.change_percent));
        losers.sort_by(|a, b| a.change_percent.total_cmp(&b.change_percent));
        gainers.truncate(limit);
        losers.truncate(limit);

        let movers = Movers { gainers, losers };
        set_json(self.store(), &cache_key, &movers, Some(MOVERS_TTL)).await;
        Ok(movers)
    }

    /// Sentiment, volatility band and 24h price statistics for one
    /// instrument. `None` when the instrument is not priced.
    pub async fn analyze_instrument(
        &self,
        market: &str,
        name: &str,
    ) -> Result<Option<InstrumentAnalytics>, MarketDataError> {
        let Some(snapshot) = self.client.get_instrument(market, name).await? else {
            return Ok(None);
        };

        let points = self
            .history(market, &snapshot.name, HISTORY_24H_POINTS)
            .await;
        let prices: Vec<f64> = points.iter().map(|p| p.price).collect();

        let (average, high, low) = if prices.is_empty() {
            (snapshot.price, snapshot.price, snapshot.price)
        } else {
            let sum: f64 = prices.iter().sum();
            let high = prices.iter().copied().fold(f64::MIN, f64::max);
            let low = prices.iter().copied().fold(f64::MAX, f64::min);
            (sum / prices.len() as f64, high, low)
        };

        Ok(Some(InstrumentAnalytics {
            name: snapshot.name,
            market: market.to_string(),
            sentiment: Sentiment::from_change(snapshot.change_percent),
            volatility: VolatilityBand::from_cv(coefficient_of_variation(&prices)),
            change_percent: snapshot.change_percent,
            average_price_24h: average,
            high_24h: high,
            low_24h: low,
            last_updated: snapshot.sampled_at,
        }))
    }

    /// 12h/24h percent changes for one instrument against its recorded
    /// history. Timeframes without a nearby history point stay `None`.
    pub async fn multi_timeframe_changes(
        &self,
        market: &str,
        name: &str,
        current_price: f64,
    ) -> TimeframeChanges {
        let points = self.history(market, name, HISTORY_TIMEFRAME_POINTS).await;
        timeframe_changes(&points, Utc::now().timestamp_millis(), current_price)
    }

    /// Aggregate market summary.
    pub async fn generate_market_trends(
        &self,
        market: &str,
    ) -> Result<MarketTrends, MarketDataError> {
        let cache_key = keys::discord(&format!("trends:{market}"));
        if let Some(cached) = get_json::<MarketTrends>(self.store(), &cache_key).await {
            return Ok(cached);
        }

        let snapshots = self.client.get_all_instruments(market).await?;
        let Some(first) = snapshots.first() else {
            return Err(MarketDataError::AllTiersFailed {
                market: market.to_string(),
            });
        };

        let most_active = snapshots
            .iter()
            .max_by_key(|s| s.listings)
            .unwrap_or(first);
        let most_valuable = snapshots
            .iter()
            .max_by(|a, b| a.price.total_cmp(&b.price))
            .unwrap_or(first);

        let count = snapshots.len() as f64;
        let average_change =
            snapshots.iter().map(|s| s.change_percent).sum::<f64>() / count;

        let gainers = snapshots.iter().filter(|s| s.change_percent > 0.0).count();
        let losers = snapshots.iter().filter(|s| s.change_percent < 0.0).count();
        let unchanged = snapshots.len() - gainers - losers;
        let market_breadth = MarketBreadth {
            gainers_percent: gainers as f64 / count * 100.0,
            losers_percent: losers as f64 / count * 100.0,
            unchanged_percent: unchanged as f64 / count * 100.0,
        };

        let top_gainer = snapshots
            .iter()
            .max_by(|a, b| a.change_percent.total_cmp(&b.change_percent))
            .unwrap_or(first);
        let top_loser = snapshots
            .iter()
            .min_by(|a, b| a.change_percent.total_cmp(&b.change_percent))
            .unwrap_or(first);

        let divine = find_price(&snapshots, DIVINE_CURRENCY).unwrap_or(0.0);
        let exalted = find_price(&snapshots, EXALTED_CURRENCY).unwrap_or(0.0);
        // The anchor is 1.0 by definition when not explicitly priced.
        let chaos = find_price(&snapshots, ANCHOR_CURRENCY).unwrap_or(1.0);
        let key_currencies = KeyCurrencies {
            divine,
            exalted,
            chaos,
            divine_to_exalted_ratio: if exalted > 0.0 { divine / exalted } else { 0.0 },
        };

        let (volatility_index, most_stable) = self.sampled_volatility(market, &snapshots).await;

        let trends = MarketTrends {
            market: market.to_string(),
            most_active: NamedVolume {
                name: most_active.name.clone(),
                volume: most_active.listings,
            },
            most_valuable: NamedPrice {
                name: most_valuable.name.clone(),
                price: most_valuable.price,
            },
            sentiment: Sentiment::from_change(average_change),
            average_change,
            volatility_index,
            market_breadth,
            top_movers: TopMovers {
                gainer: NamedChange {
                    name: top_gainer.name.clone(),
                    change_percent: top_gainer.change_percent,
                },
                loser: NamedChange {
                    name: top_loser.name.clone(),
                    change_percent: top_loser.change_percent,
                },
            },
            key_currencies,
            total_liquidity: snapshots.iter().map(|s| s.listings).sum(),
            most_stable,
            instruments_tracked: snapshots.len(),
            last_updated: Utc::now(),
        };

        set_json(self.store(), &cache_key, &trends, Some(TRENDS_TTL)).await;
        Ok(trends)
    }

    /// Case-insensitive substring search over instrument names, ranked
    /// exact match, then prefix match, then lexicographic.
    pub async fn search_instruments(
        &self,
        market: &str,
        query: &str,
    ) -> Result<Vec<String>, MarketDataError> {
        let needle = query.to_lowercase();
        let mut matches: Vec<String> = self
            .client
            .get_instrument_names(market)
            .await?
            .into_iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .collect();

        matches.sort_by(|a, b| {
            search_rank(a, &needle)
                .cmp(&search_rank(b, &needle))
                .then_with(|| a.cmp(b))
        });
        Ok(matches)
    }

    fn store(&self) -> &dyn orbwatch_store::DataStore {
        self.client.store().as_ref()
    }

    /// History read that degrades to empty on storage failure.
    async fn history(&self, market: &str, name: &str, max: usize) -> Vec<PricePoint> {
        let stream_key = keys::price_stream(market, name);
        match self.client.store().recent_points(&stream_key, max).await {
            Ok(points) => points,
            Err(e) => {
                warn!("History read failed for {stream_key}: {e}");
                Vec::new()
            }
        }
    }

    /// Mean coefficient of variation over a sampled subset, and the
    /// most stable instrument in that subset. Instruments without
    /// enough history are skipped.
    async fn sampled_volatility(
        &self,
        market: &str,
        snapshots: &[InstrumentSnapshot],
    ) -> (f64, Option<MostStable>) {
        let mut readings: Vec<(String, f64)> = Vec::new();
        for snapshot in snapshots.iter().take(VOLATILITY_SAMPLE) {
            let points = self.history(market, &snapshot.name, HISTORY_24H_POINTS).await;
            if points.len() < 2 {
                continue;
            }
            let prices: Vec<f64> = points.iter().map(|p| p.price).collect();
            readings.push((snapshot.name.clone(), coefficient_of_variation(&prices)));
        }

        if readings.is_empty() {
            return (0.0, None);
        }
        let index = readings.iter().map(|(_, cv)| cv).sum::<f64>() / readings.len() as f64;
        let most_stable = readings
            .into_iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(name, volatility)| MostStable { name, volatility });
        (index, most_stable)
    }
}

fn find_price(snapshots: &[InstrumentSnapshot], name: &str) -> Option<f64> {
    snapshots
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
        .map(|s| s.price)
}

fn search_rank(name: &str, needle: &str) -> u8 {
    let lowered = name.to_lowercase();
    if lowered == *needle {
        0
    } else if lowered.starts_with(needle) {
        1
    } else {
        2
    }
}
