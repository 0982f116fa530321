//! Domain models: normalized snapshots and the derived analytics views.

mod indicators;
mod movers;
mod snapshot;
mod trends;

pub use indicators::{InstrumentAnalytics, Sentiment, TimeframeChanges, VolatilityBand};
pub use movers::{MoverRecord, Movers, PriceTier};
pub use snapshot::InstrumentSnapshot;
pub use trends::{
    KeyCurrencies, MarketBreadth, MarketTrends, MostStable, NamedChange, NamedPrice, NamedVolume,
    TopMovers,
};
