//! Cache configuration.
//!
//! Derived from the `[cache]` settings section.

use std::num::NonZeroUsize;

use serde::Deserialize;

const DEFAULT_MEMORY_CAPACITY: usize = 10_000;
const DEFAULT_AUTO_CONSUME_INTERVAL_MS: u64 = 5000;
const DEFAULT_CONSUME_BATCH_LIMIT: usize = 100;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Which key-value store backs the cache.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    Memory,
    Redis { url: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Serve reads through the cache and publish invalidation events.
    pub enabled: bool,
    pub backend: CacheBackend,
    /// Maximum entries held by the in-process store.
    pub memory_capacity: usize,
    /// Auto-consume interval (ms) for queued invalidations.
    pub auto_consume_interval_ms: u64,
    /// Maximum events per consumption batch.
    pub consume_batch_limit: usize,
    /// Attempts per invalidation before the event is dropped.
    pub max_attempts: u32,
    /// Consume the queue right after a write instead of waiting for the tick.
    pub consume_on_write: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheBackend::Memory,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            auto_consume_interval_ms: DEFAULT_AUTO_CONSUME_INTERVAL_MS,
            consume_batch_limit: DEFAULT_CONSUME_BATCH_LIMIT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            consume_on_write: true,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            backend: settings.backend.clone(),
            memory_capacity: settings.memory_capacity,
            auto_consume_interval_ms: settings.auto_consume_interval_ms,
            consume_batch_limit: settings.consume_batch_limit,
            max_attempts: settings.max_attempts,
            consume_on_write: settings.consume_on_write,
        }
    }
}

impl CacheConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the memory capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn memory_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.memory_capacity).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn max_attempts_at_least_one(&self) -> u32 {
        self.max_attempts.max(1)
    }
}
