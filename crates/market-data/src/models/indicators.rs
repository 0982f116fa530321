use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    SENTIMENT_BEARISH, SENTIMENT_BULLISH, SENTIMENT_NEUTRAL, SENTIMENT_VERY_BULLISH,
    VOLATILITY_HIGH, VOLATILITY_MEDIUM,
};

/// Market sentiment derived from a percent change.
///
/// This is the single ladder used everywhere, including the aggregate
/// trends view: five buckets with thresholds at +10 / +5 / -5 / -10,
/// boundary values classifying into the higher bucket. It is total over
/// all real inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    VeryBullish,
    Bullish,
    Neutral,
    Bearish,
    VeryBearish,
}

impl Sentiment {
    pub fn from_change(change_percent: f64) -> Self {
        if change_percent >= SENTIMENT_VERY_BULLISH {
            Self::VeryBullish
        } else if change_percent >= SENTIMENT_BULLISH {
            Self::Bullish
        } else if change_percent >= SENTIMENT_NEUTRAL {
            Self::Neutral
        } else if change_percent >= SENTIMENT_BEARISH {
            Self::Bearish
        } else {
            Self::VeryBearish
        }
    }
}

/// Volatility band over the coefficient of variation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityBand {
    High,
    Medium,
    Low,
}

impl VolatilityBand {
    pub fn from_cv(cv_percent: f64) -> Self {
        if cv_percent >= VOLATILITY_HIGH {
            Self::High
        } else if cv_percent >= VOLATILITY_MEDIUM {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Per-instrument analytics derived from the latest snapshot plus up to
/// 24h of price history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstrumentAnalytics {
    pub name: String,
    pub market: String,
    pub sentiment: Sentiment,
    pub volatility: VolatilityBand,
    pub change_percent: f64,
    pub average_price_24h: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub last_updated: DateTime<Utc>,
}

/// Percentage change over the 12h and 24h lookback windows. A timeframe
/// is `None` when no history point lies within tolerance of its target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeframeChanges {
    pub change_12h: Option<f64>,
    pub change_24h: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_ladder_boundaries() {
        // Boundary values go to the higher bucket.
        assert_eq!(Sentiment::from_change(10.0), Sentiment::VeryBullish);
        assert_eq!(Sentiment::from_change(9.99), Sentiment::Bullish);
        assert_eq!(Sentiment::from_change(5.0), Sentiment::Bullish);
        assert_eq!(Sentiment::from_change(4.99), Sentiment::Neutral);
        assert_eq!(Sentiment::from_change(-5.0), Sentiment::Neutral);
        assert_eq!(Sentiment::from_change(-5.01), Sentiment::Bearish);
        assert_eq!(Sentiment::from_change(-10.0), Sentiment::Bearish);
        assert_eq!(Sentiment::from_change(-10.01), Sentiment::VeryBearish);
    }

    #[test]
    fn test_sentiment_total_over_extremes() {
        assert_eq!(Sentiment::from_change(f64::MAX), Sentiment::VeryBullish);
        assert_eq!(Sentiment::from_change(f64::MIN), Sentiment::VeryBearish);
        assert_eq!(Sentiment::from_change(0.0), Sentiment::Neutral);
        // NaN compares false everywhere and lands in the final bucket.
        assert_eq!(Sentiment::from_change(f64::NAN), Sentiment::VeryBearish);
    }

    #[test]
    fn test_volatility_bands() {
        assert_eq!(VolatilityBand::from_cv(25.0), VolatilityBand::High);
        assert_eq!(VolatilityBand::from_cv(20.0), VolatilityBand::High);
        assert_eq!(VolatilityBand::from_cv(15.0), VolatilityBand::Medium);
        assert_eq!(VolatilityBand::from_cv(10.0), VolatilityBand::Medium);
        assert_eq!(VolatilityBand::from_cv(9.99), VolatilityBand::Low);
        assert_eq!(VolatilityBand::from_cv(0.0), VolatilityBand::Low);
    }
}
