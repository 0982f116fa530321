use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One fetch's normalized price record for an instrument.
///
/// Produced by an acquisition tier, immutable once produced; the next
/// fetch supersedes it rather than mutating it. Prices are always
/// chaos-equivalent and strictly positive (non-positive quotes are
/// filtered at the normalization boundary).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSnapshot {
    /// Instrument name, unique within a market.
    pub name: String,
    /// Chaos-equivalent price.
    pub price: f64,
    /// Trailing price series over the provider's lookback window, already
    /// rebased where the tier quotes in anchor units. May be empty.
    pub change_series: Vec<f64>,
    /// Aggregate percent change over the lookback window (e.g. 7 days).
    pub change_percent: f64,
    /// Listing count, used as the liquidity proxy.
    pub listings: u64,
    /// Upstream sample time.
    pub sampled_at: DateTime<Utc>,
    /// Tier that produced this snapshot ("SCOUT_API", "NINJA_API",
    /// "NINJA_SCRAPE").
    pub source: String,
}

impl InstrumentSnapshot {
    /// Whether the instrument moved at all over the lookback window.
    pub fn has_change(&self) -> bool {
        self.change_percent != 0.0
    }
}
