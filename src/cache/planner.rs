//! Consumption plan generation.
//!
//! Merges a batch of cache events into one invalidation per namespace.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::events::{CacheEvent, EventKind};

/// Namespaces to invalidate, each with the events that asked for it.
#[derive(Debug, Default)]
pub struct ConsumptionPlan {
    pub invalidate_namespaces: BTreeMap<String, Vec<CacheEvent>>,
}

impl fmt::Display for ConsumptionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let namespaces: Vec<&str> = self
            .invalidate_namespaces
            .keys()
            .map(String::as_str)
            .collect();
        write!(
            f,
            "ConsumptionPlan {{ invalidate: [{}] }}",
            namespaces.join(", ")
        )
    }
}

impl ConsumptionPlan {
    /// Dedupe by event id and group the remaining events by namespace.
    pub fn from_events(events: Vec<CacheEvent>) -> Self {
        let mut plan = Self::default();
        let mut seen_ids = HashSet::new();

        for event in events.into_iter().filter(|e| seen_ids.insert(e.id)) {
            match &event.kind {
                EventKind::NamespaceChanged { namespace } => {
                    plan.invalidate_namespaces
                        .entry(namespace.clone())
                        .or_default()
                        .push(event);
                }
            }
        }

        plan
    }

    pub fn is_empty(&self) -> bool {
        self.invalidate_namespaces.is_empty()
    }

    pub fn len(&self) -> usize {
        self.invalidate_namespaces.len()
    }
}
