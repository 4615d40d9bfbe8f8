//! Cache Entry Module
//!
//! Defines the record stored in the entry table for each live key.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{ExpiryHandle, RecencyHandle};

// == Cache Entry ==
/// A live key's value plus its positions in both eviction indices.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored value, shared out to readers without copying
    pub value: Arc<V>,
    /// Expiration deadline, None = no expiration
    pub expires_at: Option<Instant>,
    /// Position in the expiry index; Some exactly when `expires_at` is Some
    pub(crate) expiry: Option<ExpiryHandle>,
    /// Position in the recency list
    pub(crate) recency: RecencyHandle,
}

impl<V> CacheEntry<V> {
    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry is expired once `now` reaches its deadline,
    /// so a TTL of t seconds is fully spent after exactly t seconds.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }
}

// == Deadline ==
/// Converts a TTL in seconds into an absolute deadline.
///
/// `None` and `Some(0)` both mean the entry never expires. A TTL so large
/// that the deadline cannot be represented also never expires.
pub fn deadline(now: Instant, ttl_seconds: Option<u64>) -> Option<Instant> {
    ttl_seconds
        .filter(|&secs| secs > 0)
        .and_then(|secs| now.checked_add(Duration::from_secs(secs)))
}
