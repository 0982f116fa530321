use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::indicators::Sentiment;

/// An instrument paired with its liquidity proxy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedVolume {
    pub name: String,
    pub volume: u64,
}

/// An instrument paired with its price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedPrice {
    pub name: String,
    pub price: f64,
}

/// An instrument paired with its trailing percent change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedChange {
    pub name: String,
    pub change_percent: f64,
}

/// Share of instruments moving in each direction, in percent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketBreadth {
    pub gainers_percent: f64,
    pub losers_percent: f64,
    pub unchanged_percent: f64,
}

/// Largest positive and negative movers by trailing change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopMovers {
    pub gainer: NamedChange,
    pub loser: NamedChange,
}

/// Prices of the key reference instruments and their headline ratio.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyCurrencies {
    pub divine: f64,
    pub exalted: f64,
    pub chaos: f64,
    /// 0.0 when the exalted price is unknown.
    pub divine_to_exalted_ratio: f64,
}

/// Lowest-volatility instrument among the sampled subset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MostStable {
    pub name: String,
    pub volatility: f64,
}

/// Aggregate market summary for one league.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketTrends {
    pub market: String,
    pub most_active: NamedVolume,
    pub most_valuable: NamedPrice,
    pub sentiment: Sentiment,
    pub average_change: f64,
    /// Mean coefficient of variation over the sampled instruments.
    pub volatility_index: f64,
    pub market_breadth: MarketBreadth,
    pub top_movers: TopMovers,
    pub key_currencies: KeyCurrencies,
    pub total_liquidity: u64,
    pub most_stable: Option<MostStable>,
    pub instruments_tracked: usize,
    pub last_updated: DateTime<Utc>,
}
