//! Cache Module
//!
//! Provides the in-memory engine state with TTL expiration and LRU eviction.

mod entry;
mod expiry;
mod recency;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use expiry::{ExpiryHandle, ExpiryIndex};
pub use recency::{RecencyHandle, RecencyList};
pub use stats::CacheStats;
pub use store::{CacheStore, SweepReport};
