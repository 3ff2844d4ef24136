//! ShareSync Cache - Local share persistence
//!
//! In-memory cache for:
//! - Last known shares of every file, per account
//! - JSON snapshots of that state, to survive a process restart
//!
//! ## Architecture
//!
//! This crate implements the `ILocalShareCache` port from `sharesync-core`.
//! It is a driven (secondary) adapter in the hexagonal architecture; only
//! `ShareRepository` writes to it.
//!
//! ## Key Components
//!
//! - [`MemoryShareCache`] - Full `ILocalShareCache` implementation
//! - [`CacheError`] - Error types for cache operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use sharesync_cache::MemoryShareCache;
//! use sharesync_core::ports::ILocalShareCache;
//!
//! let cache: Arc<dyn ILocalShareCache> = Arc::new(MemoryShareCache::new());
//! // Hand `cache` to ShareRepository::new...
//! ```

pub mod memory;

pub use memory::MemoryShareCache;

/// Errors that can occur during cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A writer panicked while holding the cache lock
    #[error("Cache lock poisoned")]
    LockPoisoned,

    /// Serialization or deserialization of a snapshot failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::SerializationError(e.to_string())
    }
}
