//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{Page, PageQuery, PaginationError};
use crate::domain::entities::{
    CropRecord, CropStats, FarmCropRecord, FarmRecord, FarmsByState, HarvestRecord,
    ProducerRecord,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProducerParams {
    pub cpf_cnpj: String,
    pub producer_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FarmParams {
    pub farm_name: String,
    pub city: String,
    pub state: String,
    pub total_area: f64,
    pub agriculturable_area: f64,
    pub vegetation_area: f64,
    pub producer_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CropParams {
    pub crop_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarvestParams {
    pub harvest_name: String,
    pub harvest_year: i32,
    pub start_date: Option<OffsetDateTime>,
    pub end_date: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FarmCropParams {
    pub farm_id: Uuid,
    pub crop_id: Uuid,
    pub harvest_id: Uuid,
    pub planted_area: Option<f64>,
    pub expected_yield: Option<f64>,
    pub actual_yield: Option<f64>,
}

/// Summed land use over live farms, in hectares.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LandUseTotals {
    pub agriculturable: f64,
    pub vegetation: f64,
}

#[async_trait]
pub trait ProducersRepo: Send + Sync {
    async fn list_producers(&self, query: &PageQuery) -> Result<Page<ProducerRecord>, RepoError>;

    async fn find_producer(&self, id: Uuid) -> Result<Option<ProducerRecord>, RepoError>;

    async fn find_producer_by_document(
        &self,
        cpf_cnpj: &str,
    ) -> Result<Option<ProducerRecord>, RepoError>;

    async fn create_producer(&self, params: ProducerParams) -> Result<ProducerRecord, RepoError>;

    async fn update_producer(
        &self,
        id: Uuid,
        params: ProducerParams,
    ) -> Result<ProducerRecord, RepoError>;

    /// Mark the producer deleted. `RepoError::NotFound` when no live row exists.
    async fn soft_delete_producer(&self, id: Uuid) -> Result<(), RepoError>;

    async fn count_producers(&self) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait FarmsRepo: Send + Sync {
    async fn list_farms(&self, query: &PageQuery) -> Result<Page<FarmRecord>, RepoError>;

    async fn find_farm(&self, id: Uuid) -> Result<Option<FarmRecord>, RepoError>;

    async fn create_farm(&self, params: FarmParams) -> Result<FarmRecord, RepoError>;

    async fn update_farm(&self, id: Uuid, params: FarmParams) -> Result<FarmRecord, RepoError>;

    async fn soft_delete_farm(&self, id: Uuid) -> Result<(), RepoError>;

    async fn count_farms(&self) -> Result<u64, RepoError>;

    async fn total_hectares(&self) -> Result<f64, RepoError>;

    /// Live farm counts per state, most farms first.
    async fn farms_by_state(&self) -> Result<Vec<FarmsByState>, RepoError>;

    async fn land_use(&self) -> Result<LandUseTotals, RepoError>;
}

#[async_trait]
pub trait CropsRepo: Send + Sync {
    async fn list_crops(&self, query: &PageQuery) -> Result<Page<CropRecord>, RepoError>;

    async fn find_crop(&self, id: Uuid) -> Result<Option<CropRecord>, RepoError>;

    async fn find_crop_by_name(&self, crop_name: &str) -> Result<Option<CropRecord>, RepoError>;

    async fn create_crop(&self, params: CropParams) -> Result<CropRecord, RepoError>;

    async fn update_crop(&self, id: Uuid, params: CropParams) -> Result<CropRecord, RepoError>;

    async fn soft_delete_crop(&self, id: Uuid) -> Result<(), RepoError>;

    /// Planting count and planted area per live crop, most planted first.
    async fn crop_stats(&self) -> Result<Vec<CropStats>, RepoError>;
}

#[async_trait]
pub trait HarvestsRepo: Send + Sync {
    async fn list_harvests(&self, query: &PageQuery) -> Result<Page<HarvestRecord>, RepoError>;

    async fn find_harvest(&self, id: Uuid) -> Result<Option<HarvestRecord>, RepoError>;

    async fn find_harvest_by_name(
        &self,
        harvest_name: &str,
    ) -> Result<Option<HarvestRecord>, RepoError>;

    async fn create_harvest(&self, params: HarvestParams) -> Result<HarvestRecord, RepoError>;

    async fn update_harvest(
        &self,
        id: Uuid,
        params: HarvestParams,
    ) -> Result<HarvestRecord, RepoError>;

    async fn soft_delete_harvest(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait FarmCropsRepo: Send + Sync {
    async fn list_farm_crops(&self, query: &PageQuery)
    -> Result<Page<FarmCropRecord>, RepoError>;

    async fn find_farm_crop(&self, id: Uuid) -> Result<Option<FarmCropRecord>, RepoError>;

    async fn find_farm_crop_by_triple(
        &self,
        farm_id: Uuid,
        crop_id: Uuid,
        harvest_id: Uuid,
    ) -> Result<Option<FarmCropRecord>, RepoError>;

    /// Planted area of the farm's live plantings in a harvest, skipping `exclude`.
    async fn planted_area(
        &self,
        farm_id: Uuid,
        harvest_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<f64, RepoError>;

    async fn create_farm_crop(&self, params: FarmCropParams)
    -> Result<FarmCropRecord, RepoError>;

    async fn update_farm_crop(
        &self,
        id: Uuid,
        params: FarmCropParams,
    ) -> Result<FarmCropRecord, RepoError>;

    async fn soft_delete_farm_crop(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Bulk operations used by the demo-data seeder.
#[async_trait]
pub trait SeedRepo: Send + Sync {
    /// True when any producer, farm, crop, harvest or planting row exists.
    async fn has_domain_data(&self) -> Result<bool, RepoError>;

    /// Remove every domain row, including soft-deleted ones.
    async fn wipe_domain_data(&self) -> Result<(), RepoError>;
}

/// Liveness probe of the record store.
#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
