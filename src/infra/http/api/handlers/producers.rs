//! Producers handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::pagination::ListQuery;
use crate::application::producers::ProducerFilters;

use super::producer_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, ApiQuery, IdPath};
use crate::infra::http::api::models::{ProducerCreateRequest, ProducerUpdateRequest};
use crate::infra::http::api::state::ApiState;

pub async fn list_producers(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<ListQuery>,
    ApiQuery(filters): ApiQuery<ProducerFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .producers
        .list(query, filters)
        .await
        .map_err(producer_to_api)?;
    Ok(Json(page))
}

pub async fn get_producer(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ApiError> {
    let producer = state
        .producers
        .find_by_id(id)
        .await
        .map_err(producer_to_api)?;
    Ok(Json(producer))
}

pub async fn create_producer(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<ProducerCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let producer = state
        .producers
        .create(payload.into())
        .await
        .map_err(producer_to_api)?;
    Ok((StatusCode::CREATED, Json(producer)))
}

pub async fn update_producer(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
    ApiJson(payload): ApiJson<ProducerUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let producer = state
        .producers
        .update(id, payload.into())
        .await
        .map_err(producer_to_api)?;
    Ok(Json(producer))
}

pub async fn delete_producer(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ApiError> {
    state
        .producers
        .delete(id)
        .await
        .map_err(producer_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
