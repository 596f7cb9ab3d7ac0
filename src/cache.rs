//! Query result cache over a string → string cache collaborator.

use async_trait::async_trait;
use moka::future::Cache;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

use crate::model::QueriedRecord;

/// Minimal key/value cache contract. Entries may disappear at any time
/// (eviction, expiry); callers treat a miss as "go to storage".
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: String, value: String);
}

/// Bounded in-process cache: at most `max_entries` keys, each expiring
/// `ttl` after it was written.
#[derive(Debug, Clone)]
pub struct MokaCacheStore {
    inner: Cache<String, String>,
}

impl MokaCacheStore {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

#[async_trait]
impl CacheStore for MokaCacheStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).await
    }

    async fn set(&self, key: String, value: String) {
        self.inner.insert(key, value).await;
    }
}

/// Memoizes query results as JSON under their filter's cache key.
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn CacheStore>,
}

impl ResultCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Cached records for `key`. An entry that no longer deserializes is
    /// reported and treated as a miss.
    pub async fn lookup(&self, key: &str) -> Option<Vec<QueriedRecord>> {
        let raw = self.store.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(records) => {
                debug!(key, "cache hit");
                Some(records)
            }
            Err(e) => {
                warn!(key, error = %e, "discarding undecodable cache entry");
                None
            }
        }
    }

    pub async fn store(&self, key: &str, records: &[QueriedRecord]) {
        match serde_json::to_string(records) {
            Ok(value) => self.store.set(key.to_string(), value).await,
            Err(e) => warn!(key, error = %e, "could not serialize result for cache"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, MeasurementRecord};
    use chrono::{TimeZone, Utc};

    fn cache() -> (Arc<MokaCacheStore>, ResultCache) {
        let store = Arc::new(MokaCacheStore::new(16, Duration::from_secs(60)));
        (store.clone(), ResultCache::new(store))
    }

    fn records() -> Vec<QueriedRecord> {
        let awkward = [
            0.1 + 0.2,
            0.7578,
            1e-300,
            -200.0,
            f64::MAX,
            1e-10,
            1.0 / 3.0,
            0.0,
            -0.5,
            13.6,
            48.9,
            2.6,
            123456789.123456789,
        ];
        vec![QueriedRecord::from(&MeasurementRecord::from_values(
            Utc.with_ymd_and_hms(2004, 3, 10, 18, 0, 0).unwrap(),
            awkward,
        ))]
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let (_, cache) = cache();
        assert!(cache.lookup("k").await.is_none());
        cache.store("k", &records()).await;
        assert_eq!(cache.lookup("k").await, Some(records()));
    }

    #[tokio::test]
    async fn values_round_trip_bit_for_bit() {
        let (_, cache) = cache();
        let original = records();
        cache.store("k", &original).await;
        let back = cache.lookup("k").await.unwrap();
        for field in Field::ALL {
            let a = original[0].get(field).unwrap();
            let b = back[0].get(field).unwrap();
            assert_eq!(a.to_bits(), b.to_bits(), "{field}");
        }
    }

    #[tokio::test]
    async fn garbage_entry_is_a_miss() {
        let (store, cache) = cache();
        store.set("k".into(), "{not json".into()).await;
        assert!(cache.lookup("k").await.is_none());
    }

    #[tokio::test]
    async fn capacity_is_bounded() {
        let store = MokaCacheStore::new(4, Duration::from_secs(60));
        for i in 0..64 {
            store.set(format!("k{i}"), "[]".into()).await;
        }
        store.inner.run_pending_tasks().await;
        assert!(store.entry_count() <= 4);
    }

    #[tokio::test]
    async fn entries_expire() {
        let store = MokaCacheStore::new(4, Duration::from_millis(50));
        store.set("k".into(), "[]".into()).await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(store.get("k").await.is_none());
    }
}
