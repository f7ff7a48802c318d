//! Key-value stores behind the cache service.
//!
//! Values are JSON strings. The in-process store is an LRU map with per-entry
//! expiry; see `cache::redis_store` for the shared backend.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use thiserror::Error;

use super::config::CacheConfig;
use super::lock::mutex_lock;

const SOURCE: &str = "cache::store";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Backend(String),
    #[error("cache value could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("cached value for `{key}` could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Every live key starting with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError>;

    /// Delete `keys`, returning how many existed.
    async fn delete(&self, keys: &[String]) -> Result<u64, CacheError>;
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process LRU store with per-entry expiry.
pub struct MemoryStore {
    entries: Mutex<LruCache<String, Entry>>,
}

impl MemoryStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.memory_capacity_non_zero())),
        }
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let mut entries = mutex_lock(&self.entries, SOURCE, "get");
        let value = match entries.get(key) {
            None => return Ok(None),
            Some(entry) if entry.is_expired(now) => None,
            Some(entry) => Some(entry.value.clone()),
        };
        if value.is_none() {
            entries.pop(key);
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        mutex_lock(&self.entries, SOURCE, "set").put(key.to_string(), entry);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let now = Instant::now();
        let entries = mutex_lock(&self.entries, SOURCE, "keys_with_prefix");
        Ok(entries
            .iter()
            .filter(|(key, entry)| key.starts_with(prefix) && !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, CacheError> {
        let mut entries = mutex_lock(&self.entries, SOURCE, "delete");
        let removed = keys
            .iter()
            .filter(|key| entries.pop(key.as_str()).is_some())
            .count();
        Ok(removed as u64)
    }
}
