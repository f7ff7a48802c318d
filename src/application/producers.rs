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
use crate::application::repos::{ProducerParams, ProducersRepo, RepoError};
use crate::cache::{CacheService, create_cache_key, namespaces};
use crate::domain::documents::{format_document, normalize_document};
use crate::domain::entities::ProducerRecord;

pub const SEARCH_FIELDS: &[&str] = &["producerName", "cpfCnpj"];
pub const SORT_FIELDS: &[&str] = &["createdAt", "updatedAt", "producerName", "cpfCnpj"];
pub const INTERVAL_FIELDS: &[&str] = TIMESTAMP_FIELDS;

const CACHE_TTL_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Duplicate(&'static str),
    #[error("Produtor não encontrado")]
    NotFound,
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Producer list filters; both match against the producer's farms.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProducerFilters {
    pub state: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateProducerCommand {
    pub cpf_cnpj: String,
    pub producer_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProducerCommand {
    pub cpf_cnpj: Option<String>,
    pub producer_name: Option<String>,
}

impl Filterable for ProducerRecord {
    fn field_values(&self, field: &str) -> Vec<FilterValue> {
        match field {
            "id" => vec![self.id.into()],
            "producerName" => vec![self.producer_name.as_str().into()],
            "cpfCnpj" => vec![self.cpf_cnpj.as_str().into()],
            "createdAt" => vec![self.created_at.into()],
            "updatedAt" => vec![self.updated_at.into()],
            "farms.state" => self
                .farms
                .iter()
                .map(|farm| farm.state.as_str().into())
                .collect(),
            "farms.city" => self
                .farms
                .iter()
                .map(|farm| farm.city.as_str().into())
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct ProducerService {
    repo: Arc<dyn ProducersRepo>,
    cache: Arc<CacheService>,
}

impl ProducerService {
    pub fn new(repo: Arc<dyn ProducersRepo>, cache: Arc<CacheService>) -> Self {
        Self { repo, cache }
    }

    pub async fn list(
        &self,
        query: ListQuery,
        filters: ProducerFilters,
    ) -> Result<Page<ProducerRecord>, ProducerError> {
        let descriptor = query.normalize()?;
        descriptor.ensure_fields(SORT_FIELDS, INTERVAL_FIELDS)?;

        let fixed = FixedFilters::new()
            .with("farms.state", filters.state)
            .with("farms.city", filters.city);
        let page_query = PageQuery::new(SEARCH_FIELDS, &descriptor, &fixed);

        Ok(self.repo.list_producers(&page_query).await?)
    }

    /// Producer with its farms; the document is formatted for display.
    pub async fn find_by_id(&self, id: Uuid) -> Result<ProducerRecord, ProducerError> {
        let key = create_cache_key(namespaces::PRODUCERS, CACHE_TTL_SECS, "findById", &[json!(id)]);
        let mut producer = self
            .cache
            .read_through(&key, || async {
                self.repo
                    .find_producer(id)
                    .await?
                    .ok_or(ProducerError::NotFound)
            })
            .await?;
        producer.cpf_cnpj = format_document(&producer.cpf_cnpj);
        Ok(producer)
    }

    pub async fn create(
        &self,
        command: CreateProducerCommand,
    ) -> Result<ProducerRecord, ProducerError> {
        let producer_name = ensure_present(command.producer_name, "Producer name is required")
            .map_err(ProducerError::Validation)?;
        let cpf_cnpj = validated_document(&command.cpf_cnpj)?;

        if self.repo.find_producer_by_document(&cpf_cnpj).await?.is_some() {
            return Err(ProducerError::Duplicate(DUPLICATE_DOCUMENT));
        }

        let params = ProducerParams {
            cpf_cnpj,
            producer_name,
        };
        Ok(self.repo.create_producer(params).await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        command: UpdateProducerCommand,
    ) -> Result<ProducerRecord, ProducerError> {
        let current = self
            .repo
            .find_producer(id)
            .await?
            .ok_or(ProducerError::NotFound)?;

        let cpf_cnpj = match command.cpf_cnpj {
            Some(raw) => validated_document(&raw)?,
            None => current.cpf_cnpj.clone(),
        };
        let producer_name = match command.producer_name {
            Some(name) => ensure_present(name, "Producer name is required")
                .map_err(ProducerError::Validation)?,
            None => current.producer_name.clone(),
        };

        if cpf_cnpj != current.cpf_cnpj
            && let Some(existing) = self.repo.find_producer_by_document(&cpf_cnpj).await?
            && existing.id != id
        {
            return Err(ProducerError::Duplicate(DUPLICATE_DOCUMENT));
        }

        let params = ProducerParams {
            cpf_cnpj,
            producer_name,
        };
        Ok(self.repo.update_producer(id, params).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ProducerError> {
        match self.repo.soft_delete_producer(id).await {
            Ok(()) => Ok(()),
            Err(RepoError::NotFound) => Err(ProducerError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn count(&self) -> Result<u64, ProducerError> {
        let key = create_cache_key(namespaces::PRODUCERS, CACHE_TTL_SECS, "count", &[]);
        self.cache
            .read_through(&key, || async { Ok(self.repo.count_producers().await?) })
            .await
    }
}

const DUPLICATE_DOCUMENT: &str = "Já existe um produtor com este CPF/CNPJ";

fn validated_document(raw: &str) -> Result<String, ProducerError> {
    if raw.trim().is_empty() {
        return Err(ProducerError::Validation("CPF/CNPJ is required".into()));
    }
    normalize_document(raw).map_err(|err| ProducerError::Validation(err.to_string()))
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::domain::entities::FarmRecord;

    fn farm(state: &str, city: &str) -> FarmRecord {
        let now = OffsetDateTime::now_utc();
        FarmRecord {
            id: Uuid::new_v4(),
            farm_name: "Fazenda".into(),
            city: city.into(),
            state: state.into(),
            total_area: 10.0,
            agriculturable_area: 5.0,
            vegetation_area: 5.0,
            producer_id: Uuid::nil(),
            producer_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn related_farm_fields_match_any_farm() {
        let now = OffsetDateTime::now_utc();
        let producer = ProducerRecord {
            id: Uuid::new_v4(),
            cpf_cnpj: "52998224725".into(),
            producer_name: "João".into(),
            farms: vec![farm("MT", "Sorriso"), farm("GO", "Rio Verde")],
            created_at: now,
            updated_at: now,
        };
        assert_eq!(
            producer.field_values("farms.state"),
            vec![FilterValue::from("MT"), FilterValue::from("GO")]
        );
        assert!(producer.field_values("unknown").is_empty());
    }

    #[test]
    fn document_validation_messages() {
        assert_eq!(
            validated_document("").expect_err("empty").to_string(),
            "CPF/CNPJ is required"
        );
        assert_eq!(
            validated_document("123").expect_err("short").to_string(),
            "Invalid CPF or CNPJ format"
        );
        assert_eq!(
            validated_document("529.982.247-25").expect("valid"),
            "52998224725"
        );
    }
}
