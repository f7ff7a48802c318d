//! Cache consumer for executing consumption plans.
//!
//! Drains invalidation events from the queue and clears the matching cache
//! namespaces. Failed namespaces go back on the queue until they run out of
//! attempts.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::config::CacheConfig;
use super::events::{CacheEvent, EventQueue};
use super::planner::ConsumptionPlan;
use super::service::CacheService;

const METRIC_CACHE_CONSUME_MS: &str = "safra_cache_consume_ms";
const METRIC_INVALIDATION_FAILURES: &str = "safra_cache_invalidation_failures_total";
const METRIC_EVENT_DROPPED: &str = "safra_cache_event_dropped_total";

pub struct CacheConsumer {
    config: CacheConfig,
    cache: Arc<CacheService>,
    queue: Arc<EventQueue>,
}

impl CacheConsumer {
    pub fn new(config: CacheConfig, cache: Arc<CacheService>, queue: Arc<EventQueue>) -> Self {
        Self {
            config,
            cache,
            queue,
        }
    }

    /// Consume pending events and execute the plan.
    ///
    /// Returns true if any events were processed.
    #[instrument(skip(self))]
    pub async fn consume(&self) -> bool {
        let consume_started_at = Instant::now();
        let events = self.queue.drain(self.config.consume_batch_limit);
        if events.is_empty() {
            return false;
        }

        let event_count = events.len();
        let event_ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();
        let plan = ConsumptionPlan::from_events(events);

        info!(
            event_count,
            event_ids = ?event_ids,
            plan = %plan,
            "Cache consumption starting"
        );

        let mut failed = 0usize;
        let mut deleted_total = 0u64;
        for (namespace, events) in plan.invalidate_namespaces {
            match self.cache.delete_by_prefix(&namespace).await {
                Ok(deleted) => deleted_total += deleted,
                Err(err) => {
                    failed += 1;
                    counter!(METRIC_INVALIDATION_FAILURES, "namespace" => namespace.clone())
                        .increment(1);
                    self.retry_or_drop(&namespace, events, &err.to_string());
                }
            }
        }

        info!(
            event_count,
            deleted = deleted_total,
            failed,
            "Cache consumption complete"
        );

        histogram!(METRIC_CACHE_CONSUME_MS)
            .record(consume_started_at.elapsed().as_secs_f64() * 1000.0);

        true
    }

    fn retry_or_drop(&self, namespace: &str, events: Vec<CacheEvent>, reason: &str) {
        let Some(event) = events.into_iter().max_by_key(|event| event.attempts) else {
            return;
        };

        if event.attempts + 1 >= self.config.max_attempts_at_least_one() {
            counter!(METRIC_EVENT_DROPPED, "namespace" => namespace.to_string()).increment(1);
            error!(
                namespace,
                event_id = %event.id,
                attempts = event.attempts + 1,
                reason,
                "Cache invalidation dropped after exhausting attempts"
            );
            return;
        }

        warn!(
            namespace,
            event_id = %event.id,
            attempts = event.attempts + 1,
            reason,
            "Cache invalidation failed; will retry"
        );
        self.queue.requeue(event);
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    pub fn cache(&self) -> &Arc<CacheService> {
        &self.cache
    }
}
