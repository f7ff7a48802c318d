//! Read-through caching and write-driven invalidation.
//!
//! - `keys` builds deterministic `namespace:method:params` keys.
//! - `CacheService` reads through a [`CacheStore`] and clears key prefixes
//!   together with their related namespaces ([`InvalidationMap`]).
//! - Writes publish events on the [`EventQueue`]; the [`CacheConsumer`]
//!   turns them into prefix invalidations, retrying failures.

mod config;
mod consumer;
mod events;
mod invalidation;
pub mod keys;
mod lock;
mod middleware;
mod planner;
mod redis_store;
mod service;
mod store;
mod trigger;

pub use config::{CacheBackend, CacheConfig};
pub use consumer::CacheConsumer;
pub use events::{CacheEvent, Epoch, EventKind, EventQueue};
pub use invalidation::InvalidationMap;
pub use keys::{CacheKey, create_cache_key, namespaces};
pub use middleware::{API_PREFIX, invalidate_writes, namespace_from_path};
pub use planner::ConsumptionPlan;
pub use redis_store::RedisStore;
pub use service::CacheService;
pub use store::{CacheError, CacheStore, MemoryStore};
pub use trigger::CacheTrigger;
