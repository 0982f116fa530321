use serde::{Deserialize, Serialize};

/// One instrument ranked by recent change magnitude.
///
/// The previous price is back-computed from the current price and the
/// trailing percent change: `previous = current / (1 + pct / 100)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoverRecord {
    pub name: String,
    pub current_price: f64,
    pub previous_price: f64,
    pub change_percent: f64,
    pub change_absolute: f64,
    /// Listing-count liquidity proxy.
    pub volume: u64,
}

/// Top gainers and losers for one market.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Movers {
    /// Positive movers, largest percent gain first.
    pub gainers: Vec<MoverRecord>,
    /// Negative movers, most negative percent first.
    pub losers: Vec<MoverRecord>,
}

/// Price-tier filter for the movers view, expressed as a multiple of the
/// exalted reference price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    All,
    Budget,
    Mid,
    Premium,
    Elite,
}

impl PriceTier {
    /// Minimum price as a multiple of the exalted price; `None` disables
    /// the filter.
    pub fn multiplier(self) -> Option<f64> {
        match self {
            Self::All => None,
            Self::Budget => Some(0.1),
            Self::Mid => Some(1.0),
            Self::Premium => Some(10.0),
            Self::Elite => Some(100.0),
        }
    }

    /// Stable label used in cache keys.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Budget => "budget",
            Self::Mid => "mid",
            Self::Premium => "premium",
            Self::Elite => "elite",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_multipliers() {
        assert_eq!(PriceTier::All.multiplier(), None);
        assert_eq!(PriceTier::Budget.multiplier(), Some(0.1));
        assert_eq!(PriceTier::Elite.multiplier(), Some(100.0));
    }

    #[test]
    fn test_tier_labels_are_cache_key_safe() {
        for tier in [
            PriceTier::All,
            PriceTier::Budget,
            PriceTier::Mid,
            PriceTier::Premium,
            PriceTier::Elite,
        ] {
            assert!(!tier.label().contains(':'));
        }
    }
}
