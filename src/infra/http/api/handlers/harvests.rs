//! Harvests handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::harvests::HarvestFilters;
use crate::application::pagination::ListQuery;

use super::harvest_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, ApiQuery, IdPath};
use crate::infra::http::api::models::{HarvestCreateRequest, HarvestUpdateRequest};
use crate::infra::http::api::state::ApiState;

pub async fn list_harvests(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<ListQuery>,
    ApiQuery(filters): ApiQuery<HarvestFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .harvests
        .list(query, filters)
        .await
        .map_err(harvest_to_api)?;
    Ok(Json(page))
}

pub async fn get_harvest(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ApiError> {
    let harvest = state
        .harvests
        .find_by_id(id)
        .await
        .map_err(harvest_to_api)?;
    Ok(Json(harvest))
}

pub async fn create_harvest(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<HarvestCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = payload.into_command()?;
    let harvest = state
        .harvests
        .create(command)
        .await
        .map_err(harvest_to_api)?;
    Ok((StatusCode::CREATED, Json(harvest)))
}

pub async fn update_harvest(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
    ApiJson(payload): ApiJson<HarvestUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = payload.into_command()?;
    let harvest = state
        .harvests
        .update(id, command)
        .await
        .map_err(harvest_to_api)?;
    Ok(Json(harvest))
}

pub async fn delete_harvest(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ApiError> {
    state.harvests.delete(id).await.map_err(harvest_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
