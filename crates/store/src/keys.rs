//! Logical key layout shared across backends.
//!
//! - `prices:stream:<market>:<instrument>`: capped price history
//! - `currency:<market>:<instrument>:current`: latest snapshot cache
//! - `discord:<key>`: derived-result cache (movers, trends, name lists)
//! - `ratelimit:<endpoint>`: rate limiter sliding windows

/// Price-history stream for one instrument in one market.
pub fn price_stream(market: &str, instrument: &str) -> String {
    format!("prices:stream:{market}:{instrument}")
}

/// Latest-snapshot cache entry for one instrument.
pub fn snapshot(market: &str, instrument: &str) -> String {
    format!("currency:{market}:{instrument}:current")
}

/// Derived-result cache entry under the `discord:` namespace.
pub fn discord(key: &str) -> String {
    format!("discord:{key}")
}

/// Sliding-window key for one rate-limited endpoint tag.
pub fn rate_window(endpoint: &str) -> String {
    format!("ratelimit:{endpoint}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(
            price_stream("Dawn", "Divine Orb"),
            "prices:stream:Dawn:Divine Orb"
        );
        assert_eq!(
            snapshot("Dawn", "Chaos Orb"),
            "currency:Dawn:Chaos Orb:current"
        );
        assert_eq!(discord("movers:Dawn:10:all"), "discord:movers:Dawn:10:all");
        assert_eq!(rate_window("poeninja:api"), "ratelimit:poeninja:api");
    }
}
