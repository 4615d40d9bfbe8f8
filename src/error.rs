//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Lookups and deletes never fail; they report absence instead. Only
/// construction and lifecycle calls return errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No tokio runtime available to host the maintenance task
    #[error("Cache must be created inside a tokio runtime")]
    NoRuntime,

    /// Shutdown was already requested on this instance
    #[error("Cache has already been shut down")]
    AlreadyShutdown,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
