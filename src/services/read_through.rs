//! Read-through caching for the services
//!
//! Reads look up a hashed key first and fall back to the repository on a
//! miss, storing the fresh result with a TTL. Writes flush the whole cache.
//! Cache failures never reach the caller: they are logged and the request
//! continues against storage.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::{CacheError, DynCacheStore};
use crate::config::CacheConfig;

use super::ServiceError;

/// Cache key for a list query: MD5 of `<prefix>:<canonical query>`
pub fn list_key(prefix: &str, query: &str) -> String {
    format!("{:x}", md5::compute(format!("{}:{}", prefix, query)))
}

/// Cache key for a single entity: MD5 of `<prefix>:<id>`
pub fn id_key(prefix: &str, id: i64) -> String {
    format!("{:x}", md5::compute(format!("{}:{}", prefix, id)))
}

/// Read-through wrapper around the shared cache store
pub struct ReadThroughCache {
    cache: DynCacheStore,
    list_ttl: Duration,
    entity_ttl: Duration,
}

impl ReadThroughCache {
    pub fn new(cache: DynCacheStore, config: &CacheConfig) -> Self {
        Self::with_ttls(cache, config.list_ttl(), config.entity_ttl())
    }

    pub fn with_ttls(cache: DynCacheStore, list_ttl: Duration, entity_ttl: Duration) -> Self {
        Self {
            cache,
            list_ttl,
            entity_ttl,
        }
    }

    /// Serve a list query, caching the result for the list TTL
    pub async fn list<T, F, Fut>(&self, prefix: &str, query: &str, loader: F) -> Result<T, ServiceError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        self.fetch(&list_key(prefix, query), self.list_ttl, loader)
            .await
    }

    /// Serve a single-entity read, caching the result for the entity TTL.
    ///
    /// Loader errors (including NotFound) are returned as-is and not cached.
    pub async fn entity<T, F, Fut>(&self, prefix: &str, id: i64, loader: F) -> Result<T, ServiceError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        self.fetch(&id_key(prefix, id), self.entity_ttl, loader)
            .await
    }

    /// Evict everything after a successful write
    pub async fn invalidate(&self) {
        if let Err(e) = self.cache.flush_all().await {
            tracing::warn!(error = %e, "Failed to flush cache");
        }
    }

    async fn fetch<T, F, Fut>(&self, key: &str, ttl: Duration, loader: F) -> Result<T, ServiceError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        match self.lookup::<T>(key).await {
            Ok(Some(value)) => {
                tracing::debug!(key, "Cache hit");
                return Ok(value);
            }
            Ok(None) => tracing::debug!(key, "Cache miss"),
            Err(e) => tracing::warn!(key, error = %e, "Ignoring unreadable cache entry"),
        }

        let value = loader().await?;

        if let Err(e) = self.store(key, &value, ttl).await {
            tracing::warn!(key, error = %e, "Failed to cache result");
        }

        Ok(value)
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        if !self.cache.exists(key).await {
            return Ok(None);
        }

        let payload = match self.cache.get(key).await {
            Ok(payload) => payload,
            // Expired between exists and get
            Err(CacheError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        Ok(Some(serde_json::from_str(&payload)?))
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError> {
        let payload = serde_json::to_string(value)?;
        self.cache.put(key, payload, ttl).await
    }
}
