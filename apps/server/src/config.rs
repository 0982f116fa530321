//! Environment-driven server configuration.

#[derive(Clone, Debug)]
pub struct Config {
    /// Redis connection URL for the cache and history store.
    pub redis_url: String,
    /// Optional key prefix so several deployments can share one Redis.
    pub key_prefix: String,
    /// Whether the periodic market refresh runs at all.
    pub refresh_enabled: bool,
    /// Seconds between refresh cycles.
    pub refresh_interval_secs: u64,
    /// Refresh every priced instrument instead of the popular subset.
    pub fetch_all: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            redis_url: env_or("ORBWATCH_REDIS_URL", "redis://127.0.0.1:6379"),
            key_prefix: env_or("ORBWATCH_KEY_PREFIX", ""),
            refresh_enabled: env_or("ORBWATCH_REFRESH_ENABLED", "true")
                .parse()
                .unwrap_or(true),
            refresh_interval_secs: env_or("ORBWATCH_REFRESH_INTERVAL_SECS", "3600")
                .parse()
                .unwrap_or(3600),
            fetch_all: env_or("ORBWATCH_FETCH_ALL", "false").parse().unwrap_or(false),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
