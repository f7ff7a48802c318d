//! API handlers organized by module.
//!
//! Each submodule holds the handlers of one resource collection. Conversions
//! from service errors to [`ApiError`] are defined here and shared.

mod crops;
mod dashboard;
mod farm_crops;
mod farms;
mod harvests;
mod health;
mod producers;

pub use crops::*;
pub use dashboard::*;
pub use farm_crops::*;
pub use farms::*;
pub use harvests::*;
pub use health::*;
pub use producers::*;

use axum::http::StatusCode;

use crate::application::crops::CropError;
use crate::application::dashboard::DashboardError;
use crate::application::farm_crops::FarmCropError;
use crate::application::farms::FarmError;
use crate::application::harvests::HarvestError;
use crate::application::pagination::PaginationError;
use crate::application::producers::ProducerError;
use crate::application::repos::RepoError;

use super::error::{ApiError, codes};

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::Pagination(p) => pagination_to_api(p),
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(msg) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(msg),
        ),
    }
}

pub(crate) fn pagination_to_api(err: PaginationError) -> ApiError {
    ApiError::new(
        StatusCode::BAD_REQUEST,
        codes::INVALID_QUERY,
        "Invalid list query",
        Some(err.to_string()),
    )
}

/// A pre-check found a live record with the same natural key.
fn duplicate(message: &'static str) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, codes::DUPLICATE, message, None)
}

pub(crate) fn producer_to_api(err: ProducerError) -> ApiError {
    match err {
        ProducerError::Validation(message) => ApiError::validation(message),
        ProducerError::Duplicate(message) => duplicate(message),
        ProducerError::NotFound => ApiError::not_found(ProducerError::NotFound.to_string()),
        ProducerError::Pagination(p) => pagination_to_api(p),
        ProducerError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn farm_to_api(err: FarmError) -> ApiError {
    match err {
        FarmError::Validation(message) => ApiError::validation(message),
        FarmError::NotFound | FarmError::ProducerNotFound => ApiError::not_found(err.to_string()),
        FarmError::Pagination(p) => pagination_to_api(p),
        FarmError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn crop_to_api(err: CropError) -> ApiError {
    match err {
        CropError::Validation(message) => ApiError::validation(message),
        CropError::Duplicate(message) => duplicate(message),
        CropError::NotFound => ApiError::not_found(CropError::NotFound.to_string()),
        CropError::Pagination(p) => pagination_to_api(p),
        CropError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn harvest_to_api(err: HarvestError) -> ApiError {
    match err {
        HarvestError::Validation(message) => ApiError::validation(message),
        HarvestError::Duplicate(message) => duplicate(message),
        HarvestError::NotFound => ApiError::not_found(HarvestError::NotFound.to_string()),
        HarvestError::Pagination(p) => pagination_to_api(p),
        HarvestError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn farm_crop_to_api(err: FarmCropError) -> ApiError {
    match err {
        FarmCropError::Validation(message) => ApiError::validation(message),
        FarmCropError::MissingReference(message) => ApiError::not_found(message),
        FarmCropError::Duplicate(message) => duplicate(message),
        FarmCropError::NotFound => ApiError::not_found(FarmCropError::NotFound.to_string()),
        FarmCropError::Pagination(p) => pagination_to_api(p),
        FarmCropError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn dashboard_to_api(err: DashboardError) -> ApiError {
    match err {
        DashboardError::Farms(inner) => farm_to_api(inner),
        DashboardError::Producers(inner) => producer_to_api(inner),
        DashboardError::Crops(inner) => crop_to_api(inner),
    }
}
