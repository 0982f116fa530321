//! Error types for the acquisition pipeline.
//!
//! Absence of an instrument or market is *not* an error: those paths
//! return `Option`/empty collections. Errors here cover upstream and
//! admission failures only.

use thiserror::Error;

/// Errors that can occur while acquiring or deriving market data.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The tier does not serve this market. Expected for the primary
    /// tier on unmapped leagues; the client falls through silently.
    #[error("Market not covered by {provider}")]
    NotCovered {
        /// Tier that declined the market
        provider: String,
    },

    /// The endpoint's sliding-window budget is exhausted. Carries the
    /// seconds until the oldest window entry expires.
    #[error("Rate limited: {endpoint} (retry after {retry_after_secs}s)")]
    RateLimited {
        /// Rate-limited endpoint tag
        endpoint: String,
        /// Seconds until a slot frees up
        retry_after_secs: u64,
    },

    /// A tier returned a malformed or non-2xx response.
    /// The client logs this and tries the next tier.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// Tier that failed
        provider: String,
        /// Upstream failure description
        message: String,
    },

    /// The headless-browser fallback failed (launch, navigation, or
    /// content extraction).
    #[error("Scrape failed: {0}")]
    Scrape(String),

    /// Every tier was tried and none yielded data. The only terminal
    /// acquisition failure surfaced to callers.
    #[error("All tiers failed for market {market}")]
    AllTiersFailed {
        /// Market whose fallback chain was exhausted
        market: String,
    },

    /// A network error occurred while calling a structured API.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Whether the tiered client should continue with the next tier
    /// after this failure.
    pub fn falls_through(&self) -> bool {
        !matches!(self, Self::AllTiersFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MarketDataError::NotCovered {
            provider: "SCOUT_API".to_string(),
        };
        assert_eq!(format!("{error}"), "Market not covered by SCOUT_API");

        let error = MarketDataError::RateLimited {
            endpoint: "poeninja:api".to_string(),
            retry_after_secs: 42,
        };
        assert_eq!(
            format!("{error}"),
            "Rate limited: poeninja:api (retry after 42s)"
        );

        let error = MarketDataError::AllTiersFailed {
            market: "Dawn".to_string(),
        };
        assert_eq!(format!("{error}"), "All tiers failed for market Dawn");
    }

    #[test]
    fn test_fallthrough_classification() {
        assert!(MarketDataError::NotCovered {
            provider: "SCOUT_API".to_string()
        }
        .falls_through());
        assert!(MarketDataError::Scrape("boom".to_string()).falls_through());
        assert!(!MarketDataError::AllTiersFailed {
            market: "Dawn".to_string()
        }
        .falls_through());
    }
}
