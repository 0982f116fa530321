//! Fixed tables and tuning knobs for the market-data pipeline.

use std::time::Duration;

/// Leagues the scheduled refresh walks every cycle.
pub const ACTIVE_LEAGUES: &[&str] = &["Dawn", "Standard"];

/// Display name -> internal API name for the primary structured tier.
/// Leagues missing here are simply not covered by that tier.
pub const SCOUT_API_LEAGUES: &[(&str, &str)] = &[
    ("Dawn", "dawn"),
    ("Standard", "standard"),
    ("Rise of the Abyssal", "abyss"),
];

/// Display name -> economy-page URL slug for the scrape tier.
/// Unmapped leagues fall back to lowercase-dash.
pub const LEAGUE_URL_SLUGS: &[(&str, &str)] = &[
    ("Dawn", "dawn"),
    ("Standard", "standard"),
    ("Rise of the Abyssal", "rise-of-the-abyssal"),
];

/// Keywords that identify a currency name cell when scraping.
pub const CURRENCY_KEYWORDS: &[&str] = &[
    "Orb",
    "Catalyst",
    "Mirror",
    "Essence",
    "Exalted",
    "Divine",
    "Chaos",
    "Shard",
    "Fragment",
    "Splinter",
    "Blessing",
    "Oil",
    "Scarab",
    "Resonator",
    "Fossil",
    "Incubator",
    "Vial",
];

/// UI decorations the scrape tier strips off matched name cells.
pub const UI_SUFFIX_NOISE: &[&str] = &["(low confidence)", "(high confidence)"];

/// The instrument every price is rebased against (1 unit == 1.0).
pub const ANCHOR_CURRENCY: &str = "Chaos Orb";

/// Anchor quote assumed when the primary tier's response does not
/// include the anchor instrument itself.
pub const APPROX_ANCHOR_QUOTE: f64 = 1.0;

/// High-value reference instruments used for trends ratios and the
/// movers tier filter.
pub const DIVINE_CURRENCY: &str = "Divine Orb";
pub const EXALTED_CURRENCY: &str = "Exalted Orb";

/// Upstream endpoints.
pub const SCOUT_API_URL: &str = "https://poe2scout.com/api/items";
pub const NINJA_API_URL: &str = "https://poe.ninja/api/data";
pub const NINJA_WEB_URL: &str = "https://poe.ninja";

pub const USER_AGENT: &str = "orbwatch/0.3 (economy tracker)";

/// Structured-API request timeout.
pub const API_TIMEOUT: Duration = Duration::from_secs(10);
/// Page-navigation timeout for the scrape tier.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
/// Settle delay after navigation so the client-side app finishes rendering.
pub const PAGE_SETTLE: Duration = Duration::from_secs(3);

/// Cache TTLs.
pub const SNAPSHOT_TTL: Duration = Duration::from_secs(300);
pub const NAME_LIST_TTL: Duration = Duration::from_secs(300);
pub const MOVERS_TTL: Duration = Duration::from_secs(180);
pub const TRENDS_TTL: Duration = Duration::from_secs(300);

/// Retention cap of one price-history stream.
pub const HISTORY_MAX_POINTS: usize = 1000;
/// 24 hours of history at the 5-minute cadence.
pub const HISTORY_24H_POINTS: usize = 288;
/// Points fetched once and shared by the 12h/24h change computation.
pub const HISTORY_TIMEFRAME_POINTS: usize = 100;
/// How far a history point may sit from the lookback target.
pub const TIMEFRAME_TOLERANCE: Duration = Duration::from_secs(3 * 60 * 60);

/// Rate limit budget per endpoint tag.
pub const RATE_LIMIT_MAX_REQUESTS: u64 = 12;
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(300);

/// Sentiment thresholds (percent change, boundary goes to the higher bucket).
pub const SENTIMENT_VERY_BULLISH: f64 = 10.0;
pub const SENTIMENT_BULLISH: f64 = 5.0;
pub const SENTIMENT_NEUTRAL: f64 = -5.0;
pub const SENTIMENT_BEARISH: f64 = -10.0;

/// Volatility bands over the coefficient of variation.
pub const VOLATILITY_HIGH: f64 = 20.0;
pub const VOLATILITY_MEDIUM: f64 = 10.0;

/// How many instruments the trends summary samples for volatility.
pub const VOLATILITY_SAMPLE: usize = 20;

/// Popular currencies fetched when the scheduler is not in fetch-all mode.
pub const SCHEDULED_FETCH_CURRENCIES: &[&str] = &[
    "Divine Orb",
    "Exalted Orb",
    "Chaos Orb",
    "Orb of Annulment",
    "Orb of Alchemy",
    "Orb of Chance",
    "Mirror of Kalandra",
    "Vaal Orb",
    "Regal Orb",
    "Gemcutter's Prism",
];

/// Internal API name for the primary tier, if the league is covered.
pub fn league_api_name(league: &str) -> Option<&'static str> {
    SCOUT_API_LEAGUES
        .iter()
        .find(|(display, _)| *display == league)
        .map(|(_, api)| *api)
}

/// URL slug for the scrape tier's economy page.
pub fn league_url_slug(league: &str) -> String {
    LEAGUE_URL_SLUGS
        .iter()
        .find(|(display, _)| *display == league)
        .map(|(_, slug)| (*slug).to_string())
        .unwrap_or_else(|| league.to_lowercase().replace(' ', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_league_api_name_coverage() {
        assert_eq!(league_api_name("Dawn"), Some("dawn"));
        assert_eq!(league_api_name("Rise of the Abyssal"), Some("abyss"));
        assert_eq!(league_api_name("Hardcore Settlers"), None);
    }

    #[test]
    fn test_league_url_slug_fallback() {
        assert_eq!(league_url_slug("Dawn"), "dawn");
        assert_eq!(
            league_url_slug("Rise of the Abyssal"),
            "rise-of-the-abyssal"
        );
        // Unmapped leagues get the lowercase-dash treatment.
        assert_eq!(league_url_slug("Some New League"), "some-new-league");
    }
}
