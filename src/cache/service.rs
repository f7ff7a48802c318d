//! Read-through cache service with prefix invalidation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::invalidation::InvalidationMap;
use super::keys::CacheKey;
use super::store::{CacheError, CacheStore};

const METRIC_CACHE_HIT: &str = "safra_cache_hit_total";
const METRIC_CACHE_MISS: &str = "safra_cache_miss_total";
const METRIC_CACHE_DEGRADED: &str = "safra_cache_degraded_total";
const METRIC_INVALIDATED_KEYS: &str = "safra_cache_invalidated_keys_total";

pub struct CacheService {
    store: Arc<dyn CacheStore>,
    related: InvalidationMap,
    enabled: bool,
}

impl CacheService {
    pub fn new(store: Arc<dyn CacheStore>, related: InvalidationMap) -> Self {
        Self {
            store,
            related,
            enabled: true,
        }
    }

    /// A service that never stores anything; reads always compute.
    pub fn disabled(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            related: InvalidationMap::empty(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Fetch and decode `key`. `Ok(None)` means no entry, distinct from a
    /// cached `null`, `0` or `false`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| CacheError::Decode {
                key: key.to_string(),
                source,
            })
    }

    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value).map_err(CacheError::Encode)?;
        self.store.set(key, raw, ttl).await
    }

    /// Delete every key starting with `prefix`, then every key under each
    /// namespace related to `prefix`. Returns the number of keys removed.
    pub async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut deleted = self.delete_prefix_only(prefix).await?;
        for related in self.related.related(prefix) {
            deleted += self.delete_prefix_only(related).await?;
        }
        Ok(deleted)
    }

    async fn delete_prefix_only(&self, prefix: &str) -> Result<u64, CacheError> {
        let keys = self.store.keys_with_prefix(prefix).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        let deleted = self.store.delete(&keys).await?;
        counter!(METRIC_INVALIDATED_KEYS, "namespace" => prefix.to_string()).increment(deleted);
        debug!(prefix, deleted, "Cache prefix invalidated");
        Ok(deleted)
    }

    /// Return the cached value for `key` or compute, store and return it.
    ///
    /// Cache failures are logged and bypassed; only `compute` errors surface.
    pub async fn read_through<T, E, F, Fut>(&self, key: &CacheKey, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.enabled {
            return compute().await;
        }

        let namespace = namespace_of(&key.id);
        match self.get::<T>(&key.id).await {
            Ok(Some(value)) => {
                counter!(METRIC_CACHE_HIT, "namespace" => namespace.to_string()).increment(1);
                debug!(key = %key.id, outcome = "hit", "cache lookup");
                return Ok(value);
            }
            Ok(None) => {
                counter!(METRIC_CACHE_MISS, "namespace" => namespace.to_string()).increment(1);
                debug!(key = %key.id, outcome = "miss", "cache lookup");
            }
            Err(err) => {
                counter!(METRIC_CACHE_DEGRADED, "op" => "get").increment(1);
                warn!(key = %key.id, error = %err, "Cache read failed; bypassing cache");
            }
        }

        let value = compute().await?;

        if let Err(err) = self.set(&key.id, &value, key.ttl).await {
            counter!(METRIC_CACHE_DEGRADED, "op" => "set").increment(1);
            warn!(key = %key.id, error = %err, "Cache write failed; value not cached");
        }

        Ok(value)
    }
}

fn namespace_of(id: &str) -> &str {
    id.split_once(':').map_or(id, |(namespace, _)| namespace)
}
