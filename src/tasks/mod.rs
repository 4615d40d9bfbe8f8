//! Background Tasks Module
//!
//! Contains the background task that runs periodically for each cache instance.
//!
//! # Tasks
//! - Maintenance: reclaims expired entries, then evicts LRU entries over capacity

mod maintenance;

pub use maintenance::{spawn_maintenance_task, SharedStore};
