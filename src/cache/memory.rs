//! In-memory cache implementation using moka
//!
//! Entries carry their own TTL, enforced through a moka `Expiry` policy, so
//! list results and single-entity lookups can live for different periods in
//! the same store. No capacity bound is configured.

use super::{CacheError, CacheStore};
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cached payload together with the TTL it was stored with
#[derive(Clone)]
struct CacheEntry {
    /// JSON-serialized value
    payload: Arc<String>,
    ttl: Duration,
}

/// Expiry policy reading the TTL from each entry.
///
/// Overwriting a key restarts its clock with the new entry's TTL.
struct PerEntryTtl;

impl Expiry<String, CacheEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-memory cache using moka
pub struct MemoryCache {
    cache: Cache<String, CacheEntry>,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        let cache = Cache::builder().expire_after(PerEntryTtl).build();
        Self { cache }
    }

    /// Approximate number of entries, including ones not yet purged
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn exists(&self, key: &str) -> bool {
        self.cache.get(key).await.is_some()
    }

    async fn get(&self, key: &str) -> Result<String, CacheError> {
        match self.cache.get(key).await {
            Some(entry) => Ok(entry.payload.as_ref().clone()),
            None => Err(CacheError::NotFound(key.to_string())),
        }
    }

    async fn put(&self, key: &str, payload: String, ttl: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry {
            payload: Arc::new(payload),
            ttl,
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn flush_all(&self) -> Result<(), CacheError> {
        self.cache.invalidate_all();
        // Make the invalidation visible to entry_count as well as lookups
        self.cache.run_pending_tasks().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let cache = MemoryCache::new();

        cache
            .put("key1", "\"value1\"".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        assert!(cache.exists("key1").await);
        assert_eq!(cache.get("key1").await.unwrap(), "\"value1\"");
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new();

        assert!(!cache.exists("nonexistent").await);
        assert!(matches!(
            cache.get("nonexistent").await,
            Err(CacheError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_overwrite_existing_key() {
        let cache = MemoryCache::new();

        cache.put("key1", "1".to_string(), Duration::from_secs(60)).await.unwrap();
        cache.put("key1", "2".to_string(), Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get("key1").await.unwrap(), "2");
    }

    #[tokio::test]
    async fn test_entries_expire_independently() {
        let cache = MemoryCache::new();

        cache.put("short", "1".to_string(), Duration::from_millis(20)).await.unwrap();
        cache.put("long", "2".to_string(), Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(!cache.exists("short").await);
        assert!(matches!(cache.get("short").await, Err(CacheError::NotFound(_))));
        assert_eq!(cache.get("long").await.unwrap(), "2");
    }

    #[tokio::test]
    async fn test_overwrite_resets_ttl() {
        let cache = MemoryCache::new();

        cache.put("key", "old".to_string(), Duration::from_millis(20)).await.unwrap();
        cache.put("key", "new".to_string(), Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(cache.get("key").await.unwrap(), "new");
    }

    #[tokio::test]
    async fn test_flush_all() {
        let cache = MemoryCache::new();

        cache.put("tags:a", "[]".to_string(), Duration::from_secs(60)).await.unwrap();
        cache.put("articles:b", "[]".to_string(), Duration::from_secs(600)).await.unwrap();

        cache.flush_all().await.unwrap();

        assert!(!cache.exists("tags:a").await);
        assert!(!cache.exists("articles:b").await);
        assert_eq!(cache.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_entry_count() {
        let cache = MemoryCache::new();
        assert_eq!(cache.entry_count(), 0);

        cache.put("key1", "1".to_string(), Duration::from_secs(60)).await.unwrap();
        cache.cache.run_pending_tasks().await;
        assert_eq!(cache.entry_count(), 1);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(20))]

            /// A stored payload is returned unchanged until its TTL elapses.
            #[test]
            fn put_then_get_until_expiry(
                key in "[a-z]{1,10}",
                payload in "[a-z0-9]{1,100}"
            ) {
                let rt = tokio::runtime::Runtime::new().unwrap();
                rt.block_on(async {
                    let cache = MemoryCache::new();
                    let ttl = Duration::from_millis(10);

                    cache.put(&key, payload.clone(), ttl).await.unwrap();
                    prop_assert_eq!(cache.get(&key).await.unwrap(), payload);

                    tokio::time::sleep(Duration::from_millis(50)).await;
                    cache.cache.run_pending_tasks().await;

                    prop_assert!(!cache.exists(&key).await);
                    prop_assert!(cache.get(&key).await.is_err());
                    Ok(())
                })?;
            }

            /// After a flush no previously stored key is visible.
            #[test]
            fn flush_evicts_every_key(keys in prop::collection::hash_set("[a-z]{1,8}", 1..20)) {
                let rt = tokio::runtime::Runtime::new().unwrap();
                rt.block_on(async {
                    let cache = MemoryCache::new();
                    for key in &keys {
                        cache.put(key, "{}".to_string(), Duration::from_secs(60)).await.unwrap();
                    }

                    cache.flush_all().await.unwrap();

                    for key in &keys {
                        prop_assert!(!cache.exists(key).await);
                    }
                    Ok(())
                })?;
            }
        }
    }
}
