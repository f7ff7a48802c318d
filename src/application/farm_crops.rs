//! Plantings: a crop on a farm during a harvest season.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::application::pagination::{
    Condition, FilterValue, Filterable, FixedFilters, ListQuery, Page, PageQuery, PaginationError,
    TIMESTAMP_FIELDS,
};
use crate::application::repos::{
    CropsRepo, FarmCropParams, FarmCropsRepo, FarmsRepo, HarvestsRepo, RepoError,
};
use crate::cache::{CacheService, create_cache_key, namespaces};
use crate::domain::entities::FarmCropRecord;
use crate::domain::error::DomainError;
use crate::domain::farms::{ensure_min_amount, ensure_planted_area_fits};

pub const SEARCH_FIELDS: &[&str] = &[];
pub const SORT_FIELDS: &[&str] = &[
    "createdAt",
    "updatedAt",
    "plantedArea",
    "expectedYield",
    "actualYield",
];
pub const INTERVAL_FIELDS: &[&str] = TIMESTAMP_FIELDS;

const CACHE_TTL_SECS: u64 = 300;

const PLANTED_AREA_MIN: &str = "A área plantada deve ser maior ou igual a 0";
const EXPECTED_YIELD_MIN: &str = "Rendimento esperado deve ser maior ou igual 0";
const ACTUAL_YIELD_MIN: &str = "Rendimento real deve ser maior ou igual a 0";
const DUPLICATE_PLANTING: &str = "This crop is already planted in this farm for this harvest";

#[derive(Debug, Error)]
pub enum FarmCropError {
    #[error("{0}")]
    Validation(String),
    /// A referenced farm, crop or harvest does not exist.
    #[error("{0}")]
    MissingReference(&'static str),
    #[error("{0}")]
    Duplicate(&'static str),
    #[error("Safra de fazenda não encontrada")]
    NotFound,
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<DomainError> for FarmCropError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { message } => Self::Validation(message),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmCropFilters {
    pub farm_id: Option<Uuid>,
    pub crop_id: Option<Uuid>,
    pub harvest_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct CreateFarmCropCommand {
    pub farm_id: Uuid,
    pub crop_id: Uuid,
    pub harvest_id: Uuid,
    pub planted_area: Option<f64>,
    pub expected_yield: Option<f64>,
    pub actual_yield: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateFarmCropCommand {
    pub farm_id: Option<Uuid>,
    pub crop_id: Option<Uuid>,
    pub harvest_id: Option<Uuid>,
    pub planted_area: Option<f64>,
    pub expected_yield: Option<f64>,
    pub actual_yield: Option<f64>,
}

impl Filterable for FarmCropRecord {
    fn field_values(&self, field: &str) -> Vec<FilterValue> {
        let value = match field {
            "id" => Some(self.id.into()),
            "farmId" => Some(self.farm_id.into()),
            "cropId" => Some(self.crop_id.into()),
            "harvestId" => Some(self.harvest_id.into()),
            "plantedArea" => self.planted_area.map(FilterValue::from),
            "expectedYield" => self.expected_yield.map(FilterValue::from),
            "actualYield" => self.actual_yield.map(FilterValue::from),
            "createdAt" => Some(self.created_at.into()),
            "updatedAt" => Some(self.updated_at.into()),
            _ => None,
        };
        value.into_iter().collect()
    }
}

#[derive(Clone)]
pub struct FarmCropService {
    repo: Arc<dyn FarmCropsRepo>,
    farms: Arc<dyn FarmsRepo>,
    crops: Arc<dyn CropsRepo>,
    harvests: Arc<dyn HarvestsRepo>,
    cache: Arc<CacheService>,
}

impl FarmCropService {
    pub fn new(
        repo: Arc<dyn FarmCropsRepo>,
        farms: Arc<dyn FarmsRepo>,
        crops: Arc<dyn CropsRepo>,
        harvests: Arc<dyn HarvestsRepo>,
        cache: Arc<CacheService>,
    ) -> Self {
        Self {
            repo,
            farms,
            crops,
            harvests,
            cache,
        }
    }

    pub async fn list(
        &self,
        query: ListQuery,
        filters: FarmCropFilters,
    ) -> Result<Page<FarmCropRecord>, FarmCropError> {
        let descriptor = query.normalize()?;
        descriptor.ensure_fields(SORT_FIELDS, INTERVAL_FIELDS)?;

        let fixed = FixedFilters::new()
            .with("farmId", filters.farm_id)
            .with("cropId", filters.crop_id)
            .with("harvestId", filters.harvest_id);
        let page_query = PageQuery::new(SEARCH_FIELDS, &descriptor, &fixed);
        Ok(self.repo.list_farm_crops(&page_query).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<FarmCropRecord, FarmCropError> {
        let key = create_cache_key(namespaces::FARM_CROPS, CACHE_TTL_SECS, "findById", &[json!(id)]);
        self.cache
            .read_through(&key, || async {
                self.repo
                    .find_farm_crop(id)
                    .await?
                    .ok_or(FarmCropError::NotFound)
            })
            .await
    }

    pub async fn by_farm(&self, farm_id: Uuid) -> Result<Vec<FarmCropRecord>, FarmCropError> {
        let key = create_cache_key(
            namespaces::FARM_CROPS,
            CACHE_TTL_SECS,
            "getFarmCropsByFarm",
            &[json!(farm_id)],
        );
        self.cache
            .read_through(&key, || self.all_matching(Condition::eq("farmId", farm_id)))
            .await
    }

    pub async fn by_harvest(&self, harvest_id: Uuid) -> Result<Vec<FarmCropRecord>, FarmCropError> {
        let key = create_cache_key(
            namespaces::FARM_CROPS,
            CACHE_TTL_SECS,
            "getFarmCropsByHarvest",
            &[json!(harvest_id)],
        );
        self.cache
            .read_through(&key, || {
                self.all_matching(Condition::eq("harvestId", harvest_id))
            })
            .await
    }

    async fn all_matching(&self, scope: Condition) -> Result<Vec<FarmCropRecord>, FarmCropError> {
        let page = self.repo.list_farm_crops(&PageQuery::all(&[scope])).await?;
        Ok(page.data)
    }

    pub async fn create(
        &self,
        command: CreateFarmCropCommand,
    ) -> Result<FarmCropRecord, FarmCropError> {
        let params = FarmCropParams {
            farm_id: command.farm_id,
            crop_id: command.crop_id,
            harvest_id: command.harvest_id,
            planted_area: command.planted_area,
            expected_yield: command.expected_yield,
            actual_yield: command.actual_yield,
        };
        self.validate(&params, None).await?;
        Ok(self.repo.create_farm_crop(params).await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        command: UpdateFarmCropCommand,
    ) -> Result<FarmCropRecord, FarmCropError> {
        let current = self
            .repo
            .find_farm_crop(id)
            .await?
            .ok_or(FarmCropError::NotFound)?;

        let params = FarmCropParams {
            farm_id: command.farm_id.unwrap_or(current.farm_id),
            crop_id: command.crop_id.unwrap_or(current.crop_id),
            harvest_id: command.harvest_id.unwrap_or(current.harvest_id),
            planted_area: command.planted_area.or(current.planted_area),
            expected_yield: command.expected_yield.or(current.expected_yield),
            actual_yield: command.actual_yield.or(current.actual_yield),
        };
        self.validate(&params, Some(id)).await?;
        Ok(self.repo.update_farm_crop(id, params).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), FarmCropError> {
        match self.repo.soft_delete_farm_crop(id).await {
            Ok(()) => Ok(()),
            Err(RepoError::NotFound) => Err(FarmCropError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    /// Amounts, references, the unique triple and the farm's remaining area.
    /// `existing` is the planting being updated, if any.
    async fn validate(
        &self,
        params: &FarmCropParams,
        existing: Option<Uuid>,
    ) -> Result<(), FarmCropError> {
        ensure_min_amount(params.planted_area, PLANTED_AREA_MIN)?;
        ensure_min_amount(params.expected_yield, EXPECTED_YIELD_MIN)?;
        ensure_min_amount(params.actual_yield, ACTUAL_YIELD_MIN)?;

        let farm = self
            .farms
            .find_farm(params.farm_id)
            .await?
            .ok_or(FarmCropError::MissingReference("Farm not found"))?;
        if self.crops.find_crop(params.crop_id).await?.is_none() {
            return Err(FarmCropError::MissingReference("Crop not found"));
        }
        if self.harvests.find_harvest(params.harvest_id).await?.is_none() {
            return Err(FarmCropError::MissingReference("Harvest not found"));
        }

        if let Some(duplicate) = self
            .repo
            .find_farm_crop_by_triple(params.farm_id, params.crop_id, params.harvest_id)
            .await?
            && Some(duplicate.id) != existing
        {
            return Err(FarmCropError::Duplicate(DUPLICATE_PLANTING));
        }

        if let Some(planted) = params.planted_area {
            let already = self
                .repo
                .planted_area(params.farm_id, params.harvest_id, existing)
                .await?;
            ensure_planted_area_fits(planted, already, farm.agriculturable_area)?;
        }
        Ok(())
    }
}
