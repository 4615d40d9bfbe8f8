//! Mini Cache - An in-process key/value cache
//!
//! Provides per-entry TTL expiration and bounded-capacity LRU eviction, both
//! reconciled by a background maintenance task.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod tasks;

pub use cache::{CacheStats, SweepReport};
pub use config::CacheConfig;
pub use engine::Cache;
pub use error::{CacheError, Result};
