//! Extractors whose rejections use the API error body.
//!
//! The stock axum extractors answer malformed input with plain-text bodies
//! (and `422` for JSON that does not fit the target type). These wrappers
//! report every such case as a `400` carrying the rejection text as hint.

use axum::extract::{FromRequest, FromRequestParts, Json, Path, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::error::{ApiError, codes};

/// A single UUID path parameter.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub Uuid);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::bad_request("Invalid identifier", Some(rejection.body_text()))
            })?;
        Ok(Self(id))
    }
}

#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| {
                ApiError::bad_request("Invalid request body", Some(rejection.body_text()))
            })?;
        Ok(Self(value))
    }
}

#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::new(
                    axum::http::StatusCode::BAD_REQUEST,
                    codes::INVALID_QUERY,
                    "Invalid query string",
                    Some(rejection.body_text()),
                )
            })?;
        Ok(Self(value))
    }
}
