pub mod api;
mod middleware;

pub use api::{ApiState, build_api_router};
pub use middleware::RequestContext;

use axum::{Router, middleware as axum_middleware, routing::get};
use tower_http::cors::CorsLayer;

/// The full application router: the `/api` surface plus the health probe.
pub fn build_router(state: ApiState) -> Router {
    let health = Router::new()
        .route("/_health/db", get(api::handlers::db_health))
        .with_state(state.clone());

    build_api_router(state)
        .merge(health)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
        .layer(CorsLayer::permissive())
}
