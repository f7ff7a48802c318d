//! Farm-crop (planting) handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::farm_crops::FarmCropFilters;
use crate::application::pagination::ListQuery;

use super::farm_crop_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, ApiQuery, IdPath};
use crate::infra::http::api::models::{FarmCropCreateRequest, FarmCropUpdateRequest};
use crate::infra::http::api::state::ApiState;

pub async fn list_farm_crops(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<ListQuery>,
    ApiQuery(filters): ApiQuery<FarmCropFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .farm_crops
        .list(query, filters)
        .await
        .map_err(farm_crop_to_api)?;
    Ok(Json(page))
}

pub async fn get_farm_crop(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ApiError> {
    let farm_crop = state
        .farm_crops
        .find_by_id(id)
        .await
        .map_err(farm_crop_to_api)?;
    Ok(Json(farm_crop))
}

pub async fn farm_crops_by_farm(
    State(state): State<ApiState>,
    IdPath(farm_id): IdPath,
) -> Result<impl IntoResponse, ApiError> {
    let plantings = state
        .farm_crops
        .by_farm(farm_id)
        .await
        .map_err(farm_crop_to_api)?;
    Ok(Json(plantings))
}

pub async fn farm_crops_by_harvest(
    State(state): State<ApiState>,
    IdPath(harvest_id): IdPath,
) -> Result<impl IntoResponse, ApiError> {
    let plantings = state
        .farm_crops
        .by_harvest(harvest_id)
        .await
        .map_err(farm_crop_to_api)?;
    Ok(Json(plantings))
}

pub async fn create_farm_crop(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<FarmCropCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let farm_crop = state
        .farm_crops
        .create(payload.into())
        .await
        .map_err(farm_crop_to_api)?;
    Ok((StatusCode::CREATED, Json(farm_crop)))
}

pub async fn update_farm_crop(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
    ApiJson(payload): ApiJson<FarmCropUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let farm_crop = state
        .farm_crops
        .update(id, payload.into())
        .await
        .map_err(farm_crop_to_api)?;
    Ok(Json(farm_crop))
}

pub async fn delete_farm_crop(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ApiError> {
    state
        .farm_crops
        .delete(id)
        .await
        .map_err(farm_crop_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
