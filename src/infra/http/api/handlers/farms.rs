//! Farms handlers, including the farm statistics.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::farms::FarmFilters;
use crate::application::pagination::ListQuery;

use super::farm_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, ApiQuery, IdPath};
use crate::infra::http::api::models::{FarmCreateRequest, FarmUpdateRequest, TotalHectaresResponse};
use crate::infra::http::api::state::ApiState;

pub async fn list_farms(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<ListQuery>,
    ApiQuery(filters): ApiQuery<FarmFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.farms.list(query, filters).await.map_err(farm_to_api)?;
    Ok(Json(page))
}

pub async fn get_farm(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ApiError> {
    let farm = state.farms.find_by_id(id).await.map_err(farm_to_api)?;
    Ok(Json(farm))
}

pub async fn create_farm(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<FarmCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let farm = state
        .farms
        .create(payload.into())
        .await
        .map_err(farm_to_api)?;
    Ok((StatusCode::CREATED, Json(farm)))
}

pub async fn update_farm(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
    ApiJson(payload): ApiJson<FarmUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let farm = state
        .farms
        .update(id, payload.into())
        .await
        .map_err(farm_to_api)?;
    Ok(Json(farm))
}

pub async fn delete_farm(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ApiError> {
    state.farms.delete(id).await.map_err(farm_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn farms_by_state(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.farms.farms_by_state().await.map_err(farm_to_api)?;
    Ok(Json(stats))
}

pub async fn land_use_stats(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.farms.land_use().await.map_err(farm_to_api)?;
    Ok(Json(stats))
}

pub async fn total_hectares(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let total_hectares = state.farms.total_hectares().await.map_err(farm_to_api)?;
    Ok(Json(TotalHectaresResponse { total_hectares }))
}
