use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::application::ensure_present;
use crate::application::pagination::{
    FilterValue, Filterable, FixedFilters, ListQuery, Page, PageQuery, PaginationError,
    TIMESTAMP_FIELDS,
};
use crate::application::repos::{FarmParams, FarmsRepo, ProducersRepo, RepoError};
use crate::cache::{CacheService, create_cache_key, namespaces};
use crate::domain::entities::{FarmRecord, FarmsByState, LandUse};
use crate::domain::error::DomainError;
use crate::domain::farms::FarmAreas;

pub const SEARCH_FIELDS: &[&str] = &["farmName", "city", "state"];
pub const SORT_FIELDS: &[&str] = &[
    "createdAt",
    "updatedAt",
    "farmName",
    "city",
    "state",
    "totalArea",
    "agriculturableArea",
    "vegetationArea",
];
pub const INTERVAL_FIELDS: &[&str] = TIMESTAMP_FIELDS;

const CACHE_TTL_SECS: u64 = 300;

pub const LAND_USE_AGRICULTURABLE: &str = "Agriculturable";
pub const LAND_USE_VEGETATION: &str = "Vegetation";

#[derive(Debug, Error)]
pub enum FarmError {
    #[error("{0}")]
    Validation(String),
    #[error("Fazenda não encontrada")]
    NotFound,
    #[error("Produtor não encontrado")]
    ProducerNotFound,
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<DomainError> for FarmError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { message } => Self::Validation(message),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmFilters {
    pub producer_id: Option<Uuid>,
    pub state: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateFarmCommand {
    pub farm_name: String,
    pub city: String,
    pub state: String,
    pub total_area: f64,
    pub agriculturable_area: f64,
    pub vegetation_area: f64,
    pub producer_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateFarmCommand {
    pub farm_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub total_area: Option<f64>,
    pub agriculturable_area: Option<f64>,
    pub vegetation_area: Option<f64>,
    pub producer_id: Option<Uuid>,
}

impl Filterable for FarmRecord {
    fn field_values(&self, field: &str) -> Vec<FilterValue> {
        let value: FilterValue = match field {
            "id" => self.id.into(),
            "farmName" => self.farm_name.as_str().into(),
            "city" => self.city.as_str().into(),
            "state" => self.state.as_str().into(),
            "totalArea" => self.total_area.into(),
            "agriculturableArea" => self.agriculturable_area.into(),
            "vegetationArea" => self.vegetation_area.into(),
            "producerId" => self.producer_id.into(),
            "createdAt" => self.created_at.into(),
            "updatedAt" => self.updated_at.into(),
            _ => return Vec::new(),
        };
        vec![value]
    }
}

#[derive(Clone)]
pub struct FarmService {
    repo: Arc<dyn FarmsRepo>,
    producers: Arc<dyn ProducersRepo>,
    cache: Arc<CacheService>,
}

impl FarmService {
    pub fn new(
        repo: Arc<dyn FarmsRepo>,
        producers: Arc<dyn ProducersRepo>,
        cache: Arc<CacheService>,
    ) -> Self {
        Self {
            repo,
            producers,
            cache,
        }
    }

    pub async fn list(
        &self,
        query: ListQuery,
        filters: FarmFilters,
    ) -> Result<Page<FarmRecord>, FarmError> {
        let descriptor = query.normalize()?;
        descriptor.ensure_fields(SORT_FIELDS, INTERVAL_FIELDS)?;

        let fixed = FixedFilters::new()
            .with("producerId", filters.producer_id)
            .with("state", filters.state)
            .with("city", filters.city);
        let page_query = PageQuery::new(SEARCH_FIELDS, &descriptor, &fixed);

        Ok(self.repo.list_farms(&page_query).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<FarmRecord, FarmError> {
        let key = create_cache_key(namespaces::FARMS, CACHE_TTL_SECS, "findById", &[json!(id)]);
        self.cache
            .read_through(&key, || async {
                self.repo.find_farm(id).await?.ok_or(FarmError::NotFound)
            })
            .await
    }

    pub async fn create(&self, command: CreateFarmCommand) -> Result<FarmRecord, FarmError> {
        let params = FarmParams {
            farm_name: required(command.farm_name, FARM_NAME_REQUIRED)?,
            city: required(command.city, CITY_REQUIRED)?,
            state: required(command.state, STATE_REQUIRED)?,
            total_area: command.total_area,
            agriculturable_area: command.agriculturable_area,
            vegetation_area: command.vegetation_area,
            producer_id: command.producer_id,
        };
        areas_of(&params).validate()?;
        self.ensure_producer(params.producer_id).await?;

        Ok(self.repo.create_farm(params).await?)
    }

    pub async fn update(&self, id: Uuid, command: UpdateFarmCommand) -> Result<FarmRecord, FarmError> {
        let current = self.repo.find_farm(id).await?.ok_or(FarmError::NotFound)?;

        let params = FarmParams {
            farm_name: match command.farm_name {
                Some(name) => required(name, FARM_NAME_REQUIRED)?,
                None => current.farm_name,
            },
            city: match command.city {
                Some(city) => required(city, CITY_REQUIRED)?,
                None => current.city,
            },
            state: match command.state {
                Some(state) => required(state, STATE_REQUIRED)?,
                None => current.state,
            },
            total_area: command.total_area.unwrap_or(current.total_area),
            agriculturable_area: command
                .agriculturable_area
                .unwrap_or(current.agriculturable_area),
            vegetation_area: command.vegetation_area.unwrap_or(current.vegetation_area),
            producer_id: command.producer_id.unwrap_or(current.producer_id),
        };
        areas_of(&params).validate()?;
        if params.producer_id != current.producer_id {
            self.ensure_producer(params.producer_id).await?;
        }

        Ok(self.repo.update_farm(id, params).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), FarmError> {
        match self.repo.soft_delete_farm(id).await {
            Ok(()) => Ok(()),
            Err(RepoError::NotFound) => Err(FarmError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn count(&self) -> Result<u64, FarmError> {
        let key = create_cache_key(namespaces::FARMS, CACHE_TTL_SECS, "count", &[]);
        self.cache
            .read_through(&key, || async { Ok(self.repo.count_farms().await?) })
            .await
    }

    pub async fn total_hectares(&self) -> Result<f64, FarmError> {
        let key = create_cache_key(namespaces::FARMS, CACHE_TTL_SECS, "getTotalHectares", &[]);
        self.cache
            .read_through(&key, || async { Ok(self.repo.total_hectares().await?) })
            .await
    }

    pub async fn farms_by_state(&self) -> Result<Vec<FarmsByState>, FarmError> {
        let key = create_cache_key(namespaces::FARMS, CACHE_TTL_SECS, "getFarmsByState", &[]);
        self.cache
            .read_through(&key, || async { Ok(self.repo.farms_by_state().await?) })
            .await
    }

    /// Agriculturable and vegetation totals, in that order.
    pub async fn land_use(&self) -> Result<Vec<LandUse>, FarmError> {
        let key = create_cache_key(namespaces::FARMS, CACHE_TTL_SECS, "getLandUseStats", &[]);
        self.cache
            .read_through(&key, || async {
                let totals = self.repo.land_use().await?;
                Ok(vec![
                    LandUse {
                        kind: LAND_USE_AGRICULTURABLE.to_string(),
                        area: totals.agriculturable,
                    },
                    LandUse {
                        kind: LAND_USE_VEGETATION.to_string(),
                        area: totals.vegetation,
                    },
                ])
            })
            .await
    }

    async fn ensure_producer(&self, producer_id: Uuid) -> Result<(), FarmError> {
        self.producers
            .find_producer(producer_id)
            .await?
            .map(|_| ())
            .ok_or(FarmError::ProducerNotFound)
    }
}

const FARM_NAME_REQUIRED: &str = "Nome da fazenda é obrigatório";
const CITY_REQUIRED: &str = "Cidade é obrigatória";
const STATE_REQUIRED: &str = "Estado é obrigatório";

fn required(value: String, message: &str) -> Result<String, FarmError> {
    ensure_present(value, message).map_err(FarmError::Validation)
}

fn areas_of(params: &FarmParams) -> FarmAreas {
    FarmAreas::new(
        params.total_area,
        params.agriculturable_area,
        params.vegetation_area,
    )
}
