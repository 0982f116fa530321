//! Orbwatch Market Data Crate
//!
//! Tiered acquisition of virtual-currency market data plus the analytics
//! derived from it.
//!
//! # Overview
//!
//! The market data crate supports:
//! - A fixed fallback chain of acquisition tiers: primary structured
//!   API, secondary structured API, browser-driven page scrape
//! - Per-tier normalization into one snapshot shape, including unit
//!   rebasing for tiers that quote relative to an anchor instrument
//! - Short-TTL snapshot caching and capped price-history recording
//! - Sliding-window rate limiting per endpoint tag
//! - Derived analytics: movers, sentiment, volatility, market trends,
//!   multi-timeframe changes and name search
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! | MarketAnalyzer   | --> | MarketDataClient |  (tier chain + cache)
//! +------------------+     +------------------+
//!          |                        |
//!          v                        v
//! +------------------+     +------------------+
//! |  price history   |     | SnapshotProvider |  (Scout, Ninja, Scrape)
//! |  (DataStore)     |     +------------------+
//! +------------------+              |
//!                                   v
//!                          +------------------+
//!                          |InstrumentSnapshot|  (normalized record)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`MarketDataClient`] - Tiered acquisition front end
//! - [`MarketAnalyzer`] - Derived analytics over snapshots and history
//! - [`InstrumentSnapshot`] - One fetch's normalized price record
//! - [`SnapshotProvider`] - One tier in the fallback chain
//! - [`RateLimiter`] - Per-endpoint sliding-window admission control

pub mod analytics;
pub mod client;
pub mod constants;
pub mod errors;
pub mod models;
pub mod provider;
pub mod rate_limiter;

pub use analytics::history::{
    coefficient_of_variation, nearest_to, percent_change, timeframe_changes,
};
pub use analytics::MarketAnalyzer;
pub use client::MarketDataClient;
pub use errors::MarketDataError;
pub use models::{
    InstrumentAnalytics, InstrumentSnapshot, KeyCurrencies, MarketBreadth, MarketTrends,
    MostStable, MoverRecord, Movers, NamedChange, NamedPrice, NamedVolume, PriceTier, Sentiment,
    TimeframeChanges, TopMovers, VolatilityBand,
};
pub use provider::{
    KeywordRowInterpreter, NinjaApiProvider, PageSource, RowInterpreter, ScoutApiProvider,
    ScrapeProvider, ScrapedRow, SnapshotProvider,
};
pub use rate_limiter::RateLimiter;
