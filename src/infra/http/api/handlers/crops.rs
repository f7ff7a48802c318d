//! Crops handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::pagination::ListQuery;

use super::crop_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, ApiQuery, IdPath};
use crate::infra::http::api::models::{CropCreateRequest, CropUpdateRequest};
use crate::infra::http::api::state::ApiState;

pub async fn list_crops(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.crops.list(query).await.map_err(crop_to_api)?;
    Ok(Json(page))
}

pub async fn get_crop(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ApiError> {
    let crop = state.crops.find_by_id(id).await.map_err(crop_to_api)?;
    Ok(Json(crop))
}

pub async fn create_crop(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<CropCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let crop = state
        .crops
        .create(payload.into())
        .await
        .map_err(crop_to_api)?;
    Ok((StatusCode::CREATED, Json(crop)))
}

pub async fn update_crop(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
    ApiJson(payload): ApiJson<CropUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let crop = state
        .crops
        .update(id, payload.into())
        .await
        .map_err(crop_to_api)?;
    Ok(Json(crop))
}

pub async fn delete_crop(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ApiError> {
    state.crops.delete(id).await.map_err(crop_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn crop_statistics(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.crops.crop_stats().await.map_err(crop_to_api)?;
    Ok(Json(stats))
}
