use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::ensure_present;
use crate::application::pagination::{
    FilterValue, Filterable, FixedFilters, ListQuery, Page, PageQuery, PaginationError,
};
use crate::application::repos::{HarvestParams, HarvestsRepo, RepoError};
use crate::cache::{CacheService, create_cache_key, namespaces};
use crate::domain::entities::HarvestRecord;
use crate::domain::error::DomainError;
use crate::domain::harvests::{ensure_harvest_year, ensure_season_order};

pub const SEARCH_FIELDS: &[&str] = &["harvestName"];
pub const SORT_FIELDS: &[&str] = &[
    "createdAt",
    "updatedAt",
    "harvestName",
    "harvestYear",
    "startDate",
    "endDate",
];
pub const INTERVAL_FIELDS: &[&str] = &["createdAt", "updatedAt", "startDate", "endDate"];

const CACHE_TTL_SECS: u64 = 300;
const DUPLICATE_NAME: &str = "Já existe uma organização de colheita com este nome";
const NAME_REQUIRED: &str = "O nome da safra é obrigatório";

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Duplicate(&'static str),
    #[error("Colheita não encontrada")]
    NotFound,
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<DomainError> for HarvestError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { message } => Self::Validation(message),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestFilters {
    pub harvest_year: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct CreateHarvestCommand {
    pub harvest_name: String,
    pub harvest_year: i32,
    pub start_date: Option<OffsetDateTime>,
    pub end_date: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateHarvestCommand {
    pub harvest_name: Option<String>,
    pub harvest_year: Option<i32>,
    pub start_date: Option<OffsetDateTime>,
    pub end_date: Option<OffsetDateTime>,
}

impl Filterable for HarvestRecord {
    fn field_values(&self, field: &str) -> Vec<FilterValue> {
        match field {
            "id" => vec![self.id.into()],
            "harvestName" => vec![self.harvest_name.as_str().into()],
            "harvestYear" => vec![self.harvest_year.into()],
            "startDate" => self.start_date.map(FilterValue::from).into_iter().collect(),
            "endDate" => self.end_date.map(FilterValue::from).into_iter().collect(),
            "createdAt" => vec![self.created_at.into()],
            "updatedAt" => vec![self.updated_at.into()],
            _ => Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct HarvestService {
    repo: Arc<dyn HarvestsRepo>,
    cache: Arc<CacheService>,
}

impl HarvestService {
    pub fn new(repo: Arc<dyn HarvestsRepo>, cache: Arc<CacheService>) -> Self {
        Self { repo, cache }
    }

    pub async fn list(
        &self,
        query: ListQuery,
        filters: HarvestFilters,
    ) -> Result<Page<HarvestRecord>, HarvestError> {
        let descriptor = query.normalize()?;
        descriptor.ensure_fields(SORT_FIELDS, INTERVAL_FIELDS)?;
        if let Some(year) = filters.harvest_year {
            ensure_harvest_year(year)?;
        }

        let fixed = FixedFilters::new().with("harvestYear", filters.harvest_year);
        let page_query = PageQuery::new(SEARCH_FIELDS, &descriptor, &fixed);
        Ok(self.repo.list_harvests(&page_query).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<HarvestRecord, HarvestError> {
        let key = create_cache_key(namespaces::HARVESTS, CACHE_TTL_SECS, "findById", &[json!(id)]);
        self.cache
            .read_through(&key, || async {
                self.repo.find_harvest(id).await?.ok_or(HarvestError::NotFound)
            })
            .await
    }

    pub async fn create(&self, command: CreateHarvestCommand) -> Result<HarvestRecord, HarvestError> {
        let harvest_name =
            ensure_present(command.harvest_name, NAME_REQUIRED).map_err(HarvestError::Validation)?;
        let params = HarvestParams {
            harvest_name,
            harvest_year: command.harvest_year,
            start_date: command.start_date,
            end_date: command.end_date,
        };
        validate(&params)?;

        if self.repo.find_harvest_by_name(&params.harvest_name).await?.is_some() {
            return Err(HarvestError::Duplicate(DUPLICATE_NAME));
        }
        Ok(self.repo.create_harvest(params).await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        command: UpdateHarvestCommand,
    ) -> Result<HarvestRecord, HarvestError> {
        let current = self
            .repo
            .find_harvest(id)
            .await?
            .ok_or(HarvestError::NotFound)?;

        let harvest_name = match command.harvest_name {
            Some(name) => ensure_present(name, NAME_REQUIRED).map_err(HarvestError::Validation)?,
            None => current.harvest_name.clone(),
        };
        let params = HarvestParams {
            harvest_name,
            harvest_year: command.harvest_year.unwrap_or(current.harvest_year),
            start_date: command.start_date.or(current.start_date),
            end_date: command.end_date.or(current.end_date),
        };
        validate(&params)?;

        if params.harvest_name != current.harvest_name
            && let Some(existing) = self.repo.find_harvest_by_name(&params.harvest_name).await?
            && existing.id != id
        {
            return Err(HarvestError::Duplicate(DUPLICATE_NAME));
        }
        Ok(self.repo.update_harvest(id, params).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), HarvestError> {
        match self.repo.soft_delete_harvest(id).await {
            Ok(()) => Ok(()),
            Err(RepoError::NotFound) => Err(HarvestError::NotFound),
            Err(err) => Err(err.into()),
        }
    }
}

fn validate(params: &HarvestParams) -> Result<(), HarvestError> {
    ensure_harvest_year(params.harvest_year)?;
    ensure_season_order(params.start_date, params.end_date)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn params(start: Option<OffsetDateTime>, end: Option<OffsetDateTime>) -> HarvestParams {
        HarvestParams {
            harvest_name: "Safra 2024/2025".into(),
            harvest_year: 2024,
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn merged_dates_must_stay_ordered() {
        let start = datetime!(2024-09-01 0:00 UTC);
        let end = datetime!(2025-03-31 0:00 UTC);
        validate(&params(Some(start), Some(end))).expect("ordered season");

        let err = validate(&params(Some(end), Some(start))).expect_err("reversed");
        assert_eq!(err.to_string(), "Start date must be before end date");
    }

    #[test]
    fn year_outside_range_is_a_validation_error() {
        let mut out_of_range = params(None, None);
        out_of_range.harvest_year = 1999;
        assert!(matches!(
            validate(&out_of_range),
            Err(HarvestError::Validation(message)) if message == "O ano da safra deve ser pelo menos 2000"
        ));
    }
}
