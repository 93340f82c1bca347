//! Cache layer
//!
//! This module provides the cache store used by the read-through services.
//! The store is a plain key/value map of serialized JSON payloads with a
//! per-entry TTL and a single "flush everything" operation; there is no
//! partial invalidation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use newsdesk::cache::{create_cache, CacheStore};
//!
//! let cache = create_cache();
//! cache.put("key", "\"value\"".to_string(), Duration::from_secs(60)).await?;
//! let payload = cache.get("key").await?;
//! cache.flush_all().await?;
//! ```

pub mod memory;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use memory::MemoryCache;

/// Errors raised by a cache store or while decoding a cached payload.
///
/// These never reach API callers: the services log them and fall back to
/// storage.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The key is absent or its entry has expired
    #[error("Cache entry not found: {0}")]
    NotFound(String),
    /// A payload could not be encoded or decoded
    #[error("Cache payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The underlying store refused the operation
    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Key/value store with per-entry TTL.
///
/// Expired entries are invisible to `exists` and `get` even if the backend
/// has not purged them yet.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Whether a live entry exists for `key`
    async fn exists(&self, key: &str) -> bool;

    /// Fetch the payload stored under `key`
    async fn get(&self, key: &str) -> Result<String, CacheError>;

    /// Store `payload` under `key`, replacing any previous entry
    async fn put(&self, key: &str, payload: String, ttl: Duration) -> Result<(), CacheError>;

    /// Evict every entry
    async fn flush_all(&self) -> Result<(), CacheError>;
}

/// Shared handle to a cache store
pub type DynCacheStore = Arc<dyn CacheStore>;

/// Create the process cache store.
///
/// TTLs are chosen per entry by the caller, so the store itself needs no
/// configuration.
pub fn create_cache() -> DynCacheStore {
    Arc::new(MemoryCache::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_cache() {
        let cache = create_cache();

        cache
            .put("test_key", "\"test_value\"".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.exists("test_key").await);
        assert_eq!(cache.get("test_key").await.unwrap(), "\"test_value\"");
    }

    #[tokio::test]
    async fn test_missing_key_is_not_found() {
        let cache = create_cache();

        assert!(!cache.exists("missing").await);
        let err = cache.get("missing").await.unwrap_err();
        assert!(matches!(err, CacheError::NotFound(key) if key == "missing"));
    }

    #[test]
    fn test_cache_error_messages() {
        let err = CacheError::NotFound("abc".to_string());
        assert_eq!(err.to_string(), "Cache entry not found: abc");

        let decode = serde_json::from_str::<i64>("not json").unwrap_err();
        let err = CacheError::from(decode);
        assert!(err.to_string().starts_with("Cache payload serialization failed"));
    }
}
