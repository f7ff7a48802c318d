//! Cache trigger service.
//!
//! Publishes invalidation events after writes and optionally consumes them
//! right away.

use std::sync::Arc;

use tracing::debug;

use super::config::CacheConfig;
use super::consumer::CacheConsumer;
use super::events::{EventKind, EventQueue};

pub struct CacheTrigger {
    config: CacheConfig,
    queue: Arc<EventQueue>,
    consumer: Arc<CacheConsumer>,
}

impl CacheTrigger {
    pub fn new(config: CacheConfig, queue: Arc<EventQueue>, consumer: Arc<CacheConsumer>) -> Self {
        Self {
            config,
            queue,
            consumer,
        }
    }

    /// Publish an event and optionally consume immediately.
    ///
    /// Without `consume_now` the event waits for the background tick.
    pub async fn trigger(&self, kind: EventKind, consume_now: bool) {
        if !self.config.is_enabled() {
            debug!(event_kind = ?kind, "Cache trigger skipped: cache disabled");
            return;
        }

        self.queue.publish(kind);

        if consume_now {
            self.consumer.consume().await;
        }
    }

    /// A write to `namespace` completed.
    pub async fn namespace_changed(&self, namespace: &str) {
        self.trigger(
            EventKind::namespace_changed(namespace),
            self.config.consume_on_write,
        )
        .await;
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    pub fn consumer(&self) -> &Arc<CacheConsumer> {
        &self.consumer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::invalidation::InvalidationMap;
    use crate::cache::service::CacheService;
    use crate::cache::store::MemoryStore;

    fn create_trigger(config: CacheConfig) -> CacheTrigger {
        let store = Arc::new(MemoryStore::new(&config));
        let cache = Arc::new(CacheService::new(store, InvalidationMap::default()));
        let queue = Arc::new(EventQueue::new());
        let consumer = Arc::new(CacheConsumer::new(config.clone(), cache, queue.clone()));
        CacheTrigger::new(config, queue, consumer)
    }

    #[tokio::test]
    async fn trigger_publishes_event() {
        let trigger = create_trigger(CacheConfig::default());
        trigger
            .trigger(EventKind::namespace_changed("farms"), false)
            .await;
        assert_eq!(trigger.queue().len(), 1);
    }

    #[tokio::test]
    async fn trigger_respects_disabled_config() {
        let trigger = create_trigger(CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        });
        trigger.namespace_changed("farms").await;
        assert!(trigger.queue().is_empty());
    }

    #[tokio::test]
    async fn namespace_changed_consumes_when_configured() {
        let trigger = create_trigger(CacheConfig::default());
        trigger.namespace_changed("farms").await;
        assert!(trigger.queue().is_empty());

        let deferred = create_trigger(CacheConfig {
            consume_on_write: false,
            ..CacheConfig::default()
        });
        deferred.namespace_changed("farms").await;
        assert_eq!(deferred.queue().len(), 1);
        assert!(deferred.consumer().consume().await);
    }
}
