//! Orbwatch Store Crate
//!
//! Backend-agnostic persistence for the orbwatch pipeline:
//! - Short-TTL JSON cache entries (snapshots, mover lists, trend summaries)
//! - Capped append-only price-history streams per (market, instrument)
//! - Sliding-window timestamp sets used by the rate limiter
//!
//! Two backends implement the [`DataStore`] trait: [`RedisStore`] for
//! production (streams, sorted sets and TTL'd keys) and [`MemoryStore`]
//! for tests and for running without a Redis instance.
//!
//! Read paths are fail-open by design: a storage outage is reported as a
//! cache miss / empty history, never as a fatal error. See [`get_json`]
//! and [`set_json`] for the logging cache helpers.

mod error;
mod memory;
mod redis_store;
mod store;

pub mod keys;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use store::{get_json, set_json, DataStore, PricePoint};
