use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::application::ensure_present;
use crate::application::pagination::{
    FilterValue, Filterable, FixedFilters, ListQuery, Page, PageQuery, PaginationError,
    TIMESTAMP_FIELDS,
};
use crate::application::repos::{CropParams, CropsRepo, RepoError};
use crate::cache::{CacheService, create_cache_key, namespaces};
use crate::domain::entities::{CropRecord, CropStats};

pub const SEARCH_FIELDS: &[&str] = &["cropName", "description"];
pub const SORT_FIELDS: &[&str] = &["createdAt", "updatedAt", "cropName"];
pub const INTERVAL_FIELDS: &[&str] = TIMESTAMP_FIELDS;

const CACHE_TTL_SECS: u64 = 300;
const DUPLICATE_NAME: &str = "Já existe uma safra com este nome";
const NAME_REQUIRED: &str = "Nome é obrigatório";

#[derive(Debug, Error)]
pub enum CropError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Duplicate(&'static str),
    #[error("Safra não encontrada")]
    NotFound,
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateCropCommand {
    pub crop_name: String,
    pub description: Option<String>,
}

/// Partial update; an empty `description` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateCropCommand {
    pub crop_name: Option<String>,
    pub description: Option<String>,
}

impl Filterable for CropRecord {
    fn field_values(&self, field: &str) -> Vec<FilterValue> {
        match field {
            "id" => vec![self.id.into()],
            "cropName" => vec![self.crop_name.as_str().into()],
            "description" => self
                .description
                .as_deref()
                .map(FilterValue::from)
                .into_iter()
                .collect(),
            "createdAt" => vec![self.created_at.into()],
            "updatedAt" => vec![self.updated_at.into()],
            _ => Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct CropService {
    repo: Arc<dyn CropsRepo>,
    cache: Arc<CacheService>,
}

impl CropService {
    pub fn new(repo: Arc<dyn CropsRepo>, cache: Arc<CacheService>) -> Self {
        Self { repo, cache }
    }

    pub async fn list(&self, query: ListQuery) -> Result<Page<CropRecord>, CropError> {
        let descriptor = query.normalize()?;
        descriptor.ensure_fields(SORT_FIELDS, INTERVAL_FIELDS)?;
        let page_query = PageQuery::new(SEARCH_FIELDS, &descriptor, &FixedFilters::new());
        Ok(self.repo.list_crops(&page_query).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<CropRecord, CropError> {
        let key = create_cache_key(namespaces::CROPS, CACHE_TTL_SECS, "findById", &[json!(id)]);
        self.cache
            .read_through(&key, || async {
                self.repo.find_crop(id).await?.ok_or(CropError::NotFound)
            })
            .await
    }

    pub async fn create(&self, command: CreateCropCommand) -> Result<CropRecord, CropError> {
        let crop_name = ensure_present(command.crop_name, NAME_REQUIRED).map_err(CropError::Validation)?;
        if self.repo.find_crop_by_name(&crop_name).await?.is_some() {
            return Err(CropError::Duplicate(DUPLICATE_NAME));
        }

        let params = CropParams {
            crop_name,
            description: normalize_description(command.description),
        };
        Ok(self.repo.create_crop(params).await?)
    }

    pub async fn update(&self, id: Uuid, command: UpdateCropCommand) -> Result<CropRecord, CropError> {
        let current = self.repo.find_crop(id).await?.ok_or(CropError::NotFound)?;

        let crop_name = match command.crop_name {
            Some(name) => ensure_present(name, NAME_REQUIRED).map_err(CropError::Validation)?,
            None => current.crop_name.clone(),
        };
        if crop_name != current.crop_name
            && let Some(existing) = self.repo.find_crop_by_name(&crop_name).await?
            && existing.id != id
        {
            return Err(CropError::Duplicate(DUPLICATE_NAME));
        }

        let description = match command.description {
            Some(description) => normalize_description(Some(description)),
            None => current.description,
        };

        let params = CropParams {
            crop_name,
            description,
        };
        Ok(self.repo.update_crop(id, params).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), CropError> {
        match self.repo.soft_delete_crop(id).await {
            Ok(()) => Ok(()),
            Err(RepoError::NotFound) => Err(CropError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    /// Planting count and planted area per crop, crops without plantings included.
    pub async fn crop_stats(&self) -> Result<Vec<CropStats>, CropError> {
        let key = create_cache_key(namespaces::CROPS, CACHE_TTL_SECS, "getCropStats", &[]);
        self.cache
            .read_through(&key, || async { Ok(self.repo.crop_stats().await?) })
            .await
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
