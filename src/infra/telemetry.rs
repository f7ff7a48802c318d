use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "safra_cache_hit_total",
            Unit::Count,
            "Read-through lookups answered from the cache."
        );
        describe_counter!(
            "safra_cache_miss_total",
            Unit::Count,
            "Read-through lookups computed from the record store."
        );
        describe_counter!(
            "safra_cache_degraded_total",
            Unit::Count,
            "Cache reads or writes bypassed because the store failed."
        );
        describe_counter!(
            "safra_cache_invalidated_keys_total",
            Unit::Count,
            "Cache entries removed by prefix invalidation."
        );
        describe_counter!(
            "safra_cache_invalidation_failures_total",
            Unit::Count,
            "Namespace invalidations that failed and were re-queued."
        );
        describe_counter!(
            "safra_cache_event_dropped_total",
            Unit::Count,
            "Invalidation events dropped after exhausting their attempts."
        );
        describe_gauge!(
            "safra_cache_event_queue_len",
            Unit::Count,
            "Current number of pending cache events in the queue."
        );
        describe_histogram!(
            "safra_cache_consume_ms",
            Unit::Milliseconds,
            "Cache consumption latency in milliseconds."
        );
    });
}
