//! Cache event system.
//!
//! Write paths publish events here; the consumer drains them and runs the
//! resulting invalidations.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::gauge;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::lock::mutex_lock;

const SOURCE: &str = "cache::events";
const METRIC_QUEUE_LEN: &str = "safra_cache_event_queue_len";

/// Monotonic epoch for ordering events within this process.
pub type Epoch = u64;

#[derive(Debug, Clone)]
pub struct CacheEvent {
    /// Unique identifier for idempotency (UUIDv4).
    pub id: Uuid,
    pub epoch: Epoch,
    pub kind: EventKind,
    pub timestamp: OffsetDateTime,
    /// Failed invalidation attempts so far.
    pub attempts: u32,
}

impl CacheEvent {
    pub fn new(kind: EventKind, epoch: Epoch) -> Self {
        Self {
            id: Uuid::new_v4(),
            epoch,
            kind,
            timestamp: OffsetDateTime::now_utc(),
            attempts: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A write to the module succeeded; its namespace must be invalidated.
    NamespaceChanged { namespace: String },
}

impl EventKind {
    pub fn namespace_changed(namespace: impl Into<String>) -> Self {
        Self::NamespaceChanged {
            namespace: namespace.into(),
        }
    }
}

/// In-memory FIFO of pending cache events.
pub struct EventQueue {
    queue: Mutex<VecDeque<CacheEvent>>,
    epoch_counter: AtomicU64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            epoch_counter: AtomicU64::new(0),
        }
    }

    pub fn next_epoch(&self) -> Epoch {
        self.epoch_counter.fetch_add(1, Ordering::SeqCst)
    }

    pub fn publish(&self, kind: EventKind) {
        let event = CacheEvent::new(kind, self.next_epoch());

        info!(
            event_id = %event.id,
            event_epoch = event.epoch,
            event_kind = ?event.kind,
            "Cache event enqueued"
        );

        self.push(event);
    }

    /// Put a failed event back with its attempt counter bumped.
    pub fn requeue(&self, mut event: CacheEvent) {
        event.attempts += 1;
        info!(
            event_id = %event.id,
            event_kind = ?event.kind,
            attempts = event.attempts,
            "Cache event requeued"
        );
        self.push(event);
    }

    fn push(&self, event: CacheEvent) {
        let mut queue = mutex_lock(&self.queue, SOURCE, "push");
        queue.push_back(event);
        gauge!(METRIC_QUEUE_LEN).set(queue.len() as f64);
    }

    /// Drain up to `limit` events in FIFO order.
    pub fn drain(&self, limit: usize) -> Vec<CacheEvent> {
        let mut queue = mutex_lock(&self.queue, SOURCE, "drain");
        let count = limit.min(queue.len());
        let drained = queue.drain(..count).collect();
        gauge!(METRIC_QUEUE_LEN).set(queue.len() as f64);
        drained
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.queue, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    #[test]
    fn epoch_monotonicity() {
        let queue = EventQueue::new();
        let e1 = queue.next_epoch();
        let e2 = queue.next_epoch();
        assert!(e1 < e2);
    }

    #[test]
    fn publish_and_drain_in_order() {
        let queue = EventQueue::new();
        queue.publish(EventKind::namespace_changed("farms"));
        queue.publish(EventKind::namespace_changed("crops"));
        queue.publish(EventKind::namespace_changed("harvests"));

        let events = queue.drain(2);
        assert_eq!(events.len(), 2);
        assert_eq!(queue.len(), 1);
        assert_eq!(events[0].kind, EventKind::namespace_changed("farms"));
        assert_eq!(events[1].kind, EventKind::namespace_changed("crops"));
        assert!(events[0].epoch < events[1].epoch);
    }

    #[test]
    fn requeue_keeps_identity_and_counts_attempts() {
        let queue = EventQueue::new();
        queue.publish(EventKind::namespace_changed("farms"));
        let event = queue.drain(10).remove(0);
        let id = event.id;

        queue.requeue(event);
        let again = queue.drain(10).remove(0);
        assert_eq!(again.id, id);
        assert_eq!(again.attempts, 1);
    }

    #[test]
    fn event_queue_recovers_from_poisoned_lock() {
        let queue = EventQueue::new();

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = queue.queue.lock().expect("queue lock should be acquired");
            panic!("poison queue lock");
        }));

        queue.publish(EventKind::namespace_changed("farms"));
        assert_eq!(queue.len(), 1);
    }
}
