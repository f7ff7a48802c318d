pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{Router, middleware as axum_middleware, routing::get};

use crate::cache::invalidate_writes;

/// Routes under `/api`, with write-driven cache invalidation.
pub fn build_api_router(state: ApiState) -> Router {
    let trigger = state.cache_trigger.clone();

    Router::new()
        .route(
            "/api/producers",
            get(handlers::list_producers).post(handlers::create_producer),
        )
        .route(
            "/api/producers/{id}",
            get(handlers::get_producer)
                .patch(handlers::update_producer)
                .delete(handlers::delete_producer),
        )
        .route(
            "/api/farms",
            get(handlers::list_farms).post(handlers::create_farm),
        )
        .route("/api/farms/stats/by-state", get(handlers::farms_by_state))
        .route("/api/farms/stats/land-use", get(handlers::land_use_stats))
        .route(
            "/api/farms/stats/total-hectares",
            get(handlers::total_hectares),
        )
        .route(
            "/api/farms/{id}",
            get(handlers::get_farm)
                .patch(handlers::update_farm)
                .delete(handlers::delete_farm),
        )
        .route(
            "/api/crops",
            get(handlers::list_crops).post(handlers::create_crop),
        )
        .route(
            "/api/crops/stats/crop-statistics",
            get(handlers::crop_statistics),
        )
        .route(
            "/api/crops/{id}",
            get(handlers::get_crop)
                .patch(handlers::update_crop)
                .delete(handlers::delete_crop),
        )
        .route(
            "/api/harvests",
            get(handlers::list_harvests).post(handlers::create_harvest),
        )
        .route(
            "/api/harvests/{id}",
            get(handlers::get_harvest)
                .patch(handlers::update_harvest)
                .delete(handlers::delete_harvest),
        )
        .route(
            "/api/farm-crops",
            get(handlers::list_farm_crops).post(handlers::create_farm_crop),
        )
        .route(
            "/api/farm-crops/by-farm/{farm_id}",
            get(handlers::farm_crops_by_farm),
        )
        .route(
            "/api/farm-crops/by-harvest/{harvest_id}",
            get(handlers::farm_crops_by_harvest),
        )
        .route(
            "/api/farm-crops/{id}",
            get(handlers::get_farm_crop)
                .patch(handlers::update_farm_crop)
                .delete(handlers::delete_farm_crop),
        )
        .route("/api/dashboard/stats", get(handlers::dashboard_stats))
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            trigger,
            invalidate_writes,
        ))
}
