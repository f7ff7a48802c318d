//! Write-invalidation middleware.
//!
//! After a successful mutating request under `/api/<namespace>`, publishes a
//! `NamespaceChanged` event for that namespace. The response passes through
//! unchanged.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument};

use super::keys::namespaces;
use super::trigger::CacheTrigger;

pub const API_PREFIX: &str = "/api";

#[instrument(skip_all, fields(method = %request.method(), path = %request.uri().path()))]
pub async fn invalidate_writes(
    State(trigger): State<Arc<CacheTrigger>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !is_mutating(request.method()) {
        return next.run(request).await;
    }

    let Some(namespace) = namespace_from_path(request.uri().path()).map(str::to_string) else {
        return next.run(request).await;
    };

    let response = next.run(request).await;

    if response.status().is_success() {
        trigger.namespace_changed(&namespace).await;
    } else {
        debug!(
            namespace = %namespace,
            status = %response.status(),
            "Write failed; cache left untouched"
        );
    }

    response
}

fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// First path segment after the API prefix, if it names a cache namespace.
pub fn namespace_from_path(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(API_PREFIX)?.strip_prefix('/')?;
    let segment = rest.split('/').next()?;
    namespaces::ALL.iter().copied().find(|known| *known == segment)
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        http::StatusCode,
        middleware::from_fn_with_state,
        routing::post,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::cache::config::CacheConfig;
    use crate::cache::consumer::CacheConsumer;
    use crate::cache::events::EventQueue;
    use crate::cache::invalidation::InvalidationMap;
    use crate::cache::service::CacheService;
    use crate::cache::store::MemoryStore;

    #[test]
    fn namespace_extraction() {
        assert_eq!(namespace_from_path("/api/farms"), Some("farms"));
        assert_eq!(namespace_from_path("/api/farm-crops/123"), Some("farm-crops"));
        assert_eq!(namespace_from_path("/api/"), None);
        assert_eq!(namespace_from_path("/api"), None);
        assert_eq!(namespace_from_path("/apix/farms"), None);
        assert_eq!(namespace_from_path("/_health/db"), None);
        assert_eq!(namespace_from_path("/api/unknown"), None);
    }

    fn deferred_trigger() -> Arc<CacheTrigger> {
        let config = CacheConfig {
            consume_on_write: false,
            ..CacheConfig::default()
        };
        let store = Arc::new(MemoryStore::new(&config));
        let cache = Arc::new(CacheService::new(store, InvalidationMap::default()));
        let queue = Arc::new(EventQueue::new());
        let consumer = Arc::new(CacheConsumer::new(config.clone(), cache, queue.clone()));
        Arc::new(CacheTrigger::new(config, queue, consumer))
    }

    fn router(trigger: Arc<CacheTrigger>) -> Router {
        Router::new()
            .route("/api/farms", post(|| async { StatusCode::CREATED }).get(|| async { "[]" }))
            .route("/api/crops", post(|| async { StatusCode::BAD_REQUEST }))
            .layer(from_fn_with_state(trigger, invalidate_writes))
    }

    async fn send(router: Router, method: Method, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        router.oneshot(request).await.expect("response").status()
    }

    #[tokio::test]
    async fn successful_writes_publish_events() {
        let trigger = deferred_trigger();
        let status = send(router(trigger.clone()), Method::POST, "/api/farms").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(trigger.queue().len(), 1);
    }

    #[tokio::test]
    async fn reads_and_failed_writes_are_ignored() {
        let trigger = deferred_trigger();
        send(router(trigger.clone()), Method::GET, "/api/farms").await;
        send(router(trigger.clone()), Method::POST, "/api/crops").await;
        assert!(trigger.queue().is_empty());
    }
}
