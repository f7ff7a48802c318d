//! Dashboard handlers

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use super::dashboard_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::state::ApiState;

pub async fn dashboard_stats(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.dashboard.stats().await.map_err(dashboard_to_api)?;
    Ok(Json(stats))
}
