//! In-memory repositories and request helpers shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use time::{Duration, OffsetDateTime, macros::datetime};
use tower::ServiceExt;
use uuid::Uuid;

use safra::application::pagination::{Page, PageQuery, paginate_records};
use safra::application::repos::{
    CropParams, CropsRepo, FarmCropParams, FarmCropsRepo, FarmParams, FarmsRepo, HarvestParams,
    HarvestsRepo, HealthRepo, LandUseTotals, ProducerParams, ProducersRepo, RepoError, SeedRepo,
};
use safra::cache::{
    CacheConfig, CacheConsumer, CacheService, CacheTrigger, EventQueue, InvalidationMap,
    MemoryStore,
};
use safra::domain::entities::{
    CropRecord, CropStats, FarmCropRecord, FarmRecord, FarmsByState, HarvestRecord,
    ProducerRecord,
};
use safra::infra::http::{self, ApiState};

struct Row<T> {
    record: T,
    deleted: bool,
}

impl<T> Row<T> {
    fn live(record: T) -> Self {
        Self {
            record,
            deleted: false,
        }
    }
}

#[derive(Default)]
struct Tables {
    ticks: i64,
    producers: Vec<Row<ProducerRecord>>,
    farms: Vec<Row<FarmRecord>>,
    crops: Vec<Row<CropRecord>>,
    harvests: Vec<Row<HarvestRecord>>,
    farm_crops: Vec<Row<FarmCropRecord>>,
}

impl Tables {
    /// Strictly increasing timestamps keep the default `createdAt` order stable.
    fn now(&mut self) -> OffsetDateTime {
        self.ticks += 1;
        datetime!(2024-01-01 0:00 UTC) + Duration::seconds(self.ticks)
    }

    fn live<T>(rows: &[Row<T>]) -> impl Iterator<Item = &T> {
        rows.iter().filter(|row| !row.deleted).map(|row| &row.record)
    }

    fn live_mut<T>(rows: &mut [Row<T>], id: impl Fn(&T) -> bool) -> Option<&mut T> {
        rows.iter_mut()
            .filter(|row| !row.deleted)
            .map(|row| &mut row.record)
            .find(|record| id(record))
    }

    fn soft_delete<T>(rows: &mut [Row<T>], id: impl Fn(&T) -> bool) -> Result<(), RepoError> {
        let row = rows
            .iter_mut()
            .find(|row| !row.deleted && id(&row.record))
            .ok_or(RepoError::NotFound)?;
        row.deleted = true;
        Ok(())
    }

    fn producer_with_farms(&self, producer: &ProducerRecord) -> ProducerRecord {
        let mut producer = producer.clone();
        producer.farms = Self::live(&self.farms)
            .filter(|farm| farm.producer_id == producer.id)
            .map(|farm| self.farm_with_owner(farm))
            .collect();
        producer
    }

    fn farm_with_owner(&self, farm: &FarmRecord) -> FarmRecord {
        let mut farm = farm.clone();
        farm.producer_name = Self::live(&self.producers)
            .find(|producer| producer.id == farm.producer_id)
            .map(|producer| producer.producer_name.clone());
        farm
    }

    fn planting_with_names(&self, planting: &FarmCropRecord) -> FarmCropRecord {
        let mut planting = planting.clone();
        planting.farm_name = Self::live(&self.farms)
            .find(|farm| farm.id == planting.farm_id)
            .map(|farm| farm.farm_name.clone());
        planting.crop_name = Self::live(&self.crops)
            .find(|crop| crop.id == planting.crop_id)
            .map(|crop| crop.crop_name.clone());
        planting.harvest_name = Self::live(&self.harvests)
            .find(|harvest| harvest.id == planting.harvest_id)
            .map(|harvest| harvest.harvest_name.clone());
        planting
    }
}

/// Every repository trait over process memory, with per-operation call counts.
#[derive(Default)]
pub struct InMemoryRepos {
    tables: Mutex<Tables>,
    calls: Mutex<HashMap<&'static str, usize>>,
    unhealthy: AtomicBool,
}

impl InMemoryRepos {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `operation` reached the store.
    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn set_unhealthy(&self, unhealthy: bool) {
        self.unhealthy.store(unhealthy, Ordering::SeqCst);
    }

    fn tables(&self, operation: &'static str) -> MutexGuard<'_, Tables> {
        *self
            .calls
            .lock()
            .expect("calls lock")
            .entry(operation)
            .or_default() += 1;
        self.tables.lock().expect("tables lock")
    }
}

#[async_trait]
impl ProducersRepo for InMemoryRepos {
    async fn list_producers(&self, query: &PageQuery) -> Result<Page<ProducerRecord>, RepoError> {
        let tables = self.tables("list_producers");
        let records: Vec<_> = Tables::live(&tables.producers)
            .map(|producer| tables.producer_with_farms(producer))
            .collect();
        Ok(paginate_records(records, query))
    }

    async fn find_producer(&self, id: Uuid) -> Result<Option<ProducerRecord>, RepoError> {
        let tables = self.tables("find_producer");
        Ok(Tables::live(&tables.producers)
            .find(|producer| producer.id == id)
            .map(|producer| tables.producer_with_farms(producer)))
    }

    async fn find_producer_by_document(
        &self,
        cpf_cnpj: &str,
    ) -> Result<Option<ProducerRecord>, RepoError> {
        let tables = self.tables("find_producer_by_document");
        Ok(Tables::live(&tables.producers)
            .find(|producer| producer.cpf_cnpj == cpf_cnpj)
            .cloned())
    }

    async fn create_producer(&self, params: ProducerParams) -> Result<ProducerRecord, RepoError> {
        let mut tables = self.tables("create_producer");
        if Tables::live(&tables.producers).any(|producer| producer.cpf_cnpj == params.cpf_cnpj) {
            return Err(RepoError::Duplicate {
                constraint: "producers_cpf_cnpj_live_key".into(),
            });
        }
        let now = tables.now();
        let record = ProducerRecord {
            id: Uuid::new_v4(),
            cpf_cnpj: params.cpf_cnpj,
            producer_name: params.producer_name,
            farms: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        tables.producers.push(Row::live(record.clone()));
        Ok(record)
    }

    async fn update_producer(
        &self,
        id: Uuid,
        params: ProducerParams,
    ) -> Result<ProducerRecord, RepoError> {
        let mut tables = self.tables("update_producer");
        let now = tables.now();
        let producer = Tables::live_mut(&mut tables.producers, |producer| producer.id == id)
            .ok_or(RepoError::NotFound)?;
        producer.cpf_cnpj = params.cpf_cnpj;
        producer.producer_name = params.producer_name;
        producer.updated_at = now;
        let producer = producer.clone();
        Ok(tables.producer_with_farms(&producer))
    }

    async fn soft_delete_producer(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables("soft_delete_producer");
        Tables::soft_delete(&mut tables.producers, |producer| producer.id == id)
    }

    async fn count_producers(&self) -> Result<u64, RepoError> {
        let tables = self.tables("count_producers");
        Ok(Tables::live(&tables.producers).count() as u64)
    }
}

#[async_trait]
impl FarmsRepo for InMemoryRepos {
    async fn list_farms(&self, query: &PageQuery) -> Result<Page<FarmRecord>, RepoError> {
        let tables = self.tables("list_farms");
        let records: Vec<_> = Tables::live(&tables.farms)
            .map(|farm| tables.farm_with_owner(farm))
            .collect();
        Ok(paginate_records(records, query))
    }

    async fn find_farm(&self, id: Uuid) -> Result<Option<FarmRecord>, RepoError> {
        let tables = self.tables("find_farm");
        Ok(Tables::live(&tables.farms)
            .find(|farm| farm.id == id)
            .map(|farm| tables.farm_with_owner(farm)))
    }

    async fn create_farm(&self, params: FarmParams) -> Result<FarmRecord, RepoError> {
        let mut tables = self.tables("create_farm");
        let now = tables.now();
        let record = FarmRecord {
            id: Uuid::new_v4(),
            farm_name: params.farm_name,
            city: params.city,
            state: params.state,
            total_area: params.total_area,
            agriculturable_area: params.agriculturable_area,
            vegetation_area: params.vegetation_area,
            producer_id: params.producer_id,
            producer_name: None,
            created_at: now,
            updated_at: now,
        };
        tables.farms.push(Row::live(record.clone()));
        Ok(tables.farm_with_owner(&record))
    }

    async fn update_farm(&self, id: Uuid, params: FarmParams) -> Result<FarmRecord, RepoError> {
        let mut tables = self.tables("update_farm");
        let now = tables.now();
        let farm =
            Tables::live_mut(&mut tables.farms, |farm| farm.id == id).ok_or(RepoError::NotFound)?;
        farm.farm_name = params.farm_name;
        farm.city = params.city;
        farm.state = params.state;
        farm.total_area = params.total_area;
        farm.agriculturable_area = params.agriculturable_area;
        farm.vegetation_area = params.vegetation_area;
        farm.producer_id = params.producer_id;
        farm.updated_at = now;
        let farm = farm.clone();
        Ok(tables.farm_with_owner(&farm))
    }

    async fn soft_delete_farm(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables("soft_delete_farm");
        Tables::soft_delete(&mut tables.farms, |farm| farm.id == id)
    }

    async fn count_farms(&self) -> Result<u64, RepoError> {
        let tables = self.tables("count_farms");
        Ok(Tables::live(&tables.farms).count() as u64)
    }

    async fn total_hectares(&self) -> Result<f64, RepoError> {
        let tables = self.tables("total_hectares");
        Ok(Tables::live(&tables.farms).map(|farm| farm.total_area).sum())
    }

    async fn farms_by_state(&self) -> Result<Vec<FarmsByState>, RepoError> {
        let tables = self.tables("farms_by_state");
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for farm in Tables::live(&tables.farms) {
            *counts.entry(farm.state.as_str()).or_default() += 1;
        }
        let mut stats: Vec<_> = counts
            .into_iter()
            .map(|(state, count)| FarmsByState {
                state: state.to_string(),
                count,
            })
            .collect();
        stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.state.cmp(&b.state)));
        Ok(stats)
    }

    async fn land_use(&self) -> Result<LandUseTotals, RepoError> {
        let tables = self.tables("land_use");
        Ok(Tables::live(&tables.farms).fold(LandUseTotals::default(), |totals, farm| {
            LandUseTotals {
                agriculturable: totals.agriculturable + farm.agriculturable_area,
                vegetation: totals.vegetation + farm.vegetation_area,
            }
        }))
    }
}

#[async_trait]
impl CropsRepo for InMemoryRepos {
    async fn list_crops(&self, query: &PageQuery) -> Result<Page<CropRecord>, RepoError> {
        let tables = self.tables("list_crops");
        Ok(paginate_records(
            Tables::live(&tables.crops).cloned(),
            query,
        ))
    }

    async fn find_crop(&self, id: Uuid) -> Result<Option<CropRecord>, RepoError> {
        let tables = self.tables("find_crop");
        Ok(Tables::live(&tables.crops).find(|crop| crop.id == id).cloned())
    }

    async fn find_crop_by_name(&self, crop_name: &str) -> Result<Option<CropRecord>, RepoError> {
        let tables = self.tables("find_crop_by_name");
        Ok(Tables::live(&tables.crops)
            .find(|crop| crop.crop_name == crop_name)
            .cloned())
    }

    async fn create_crop(&self, params: CropParams) -> Result<CropRecord, RepoError> {
        let mut tables = self.tables("create_crop");
        let now = tables.now();
        let record = CropRecord {
            id: Uuid::new_v4(),
            crop_name: params.crop_name,
            description: params.description,
            created_at: now,
            updated_at: now,
        };
        tables.crops.push(Row::live(record.clone()));
        Ok(record)
    }

    async fn update_crop(&self, id: Uuid, params: CropParams) -> Result<CropRecord, RepoError> {
        let mut tables = self.tables("update_crop");
        let now = tables.now();
        let crop =
            Tables::live_mut(&mut tables.crops, |crop| crop.id == id).ok_or(RepoError::NotFound)?;
        crop.crop_name = params.crop_name;
        crop.description = params.description;
        crop.updated_at = now;
        Ok(crop.clone())
    }

    async fn soft_delete_crop(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables("soft_delete_crop");
        Tables::soft_delete(&mut tables.crops, |crop| crop.id == id)
    }

    async fn crop_stats(&self) -> Result<Vec<CropStats>, RepoError> {
        let tables = self.tables("crop_stats");
        let mut stats: Vec<_> = Tables::live(&tables.crops)
            .map(|crop| {
                let plantings: Vec<_> = Tables::live(&tables.farm_crops)
                    .filter(|planting| planting.crop_id == crop.id)
                    .collect();
                CropStats {
                    crop_name: crop.crop_name.clone(),
                    count: plantings.len() as u64,
                    total_area: plantings
                        .iter()
                        .filter_map(|planting| planting.planted_area)
                        .sum(),
                }
            })
            .collect();
        stats.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.crop_name.cmp(&b.crop_name))
        });
        Ok(stats)
    }
}

#[async_trait]
impl HarvestsRepo for InMemoryRepos {
    async fn list_harvests(&self, query: &PageQuery) -> Result<Page<HarvestRecord>, RepoError> {
        let tables = self.tables("list_harvests");
        Ok(paginate_records(
            Tables::live(&tables.harvests).cloned(),
            query,
        ))
    }

    async fn find_harvest(&self, id: Uuid) -> Result<Option<HarvestRecord>, RepoError> {
        let tables = self.tables("find_harvest");
        Ok(Tables::live(&tables.harvests)
            .find(|harvest| harvest.id == id)
            .cloned())
    }

    async fn find_harvest_by_name(
        &self,
        harvest_name: &str,
    ) -> Result<Option<HarvestRecord>, RepoError> {
        let tables = self.tables("find_harvest_by_name");
        Ok(Tables::live(&tables.harvests)
            .find(|harvest| harvest.harvest_name == harvest_name)
            .cloned())
    }

    async fn create_harvest(&self, params: HarvestParams) -> Result<HarvestRecord, RepoError> {
        let mut tables = self.tables("create_harvest");
        let now = tables.now();
        let record = HarvestRecord {
            id: Uuid::new_v4(),
            harvest_name: params.harvest_name,
            harvest_year: params.harvest_year,
            start_date: params.start_date,
            end_date: params.end_date,
            created_at: now,
            updated_at: now,
        };
        tables.harvests.push(Row::live(record.clone()));
        Ok(record)
    }

    async fn update_harvest(
        &self,
        id: Uuid,
        params: HarvestParams,
    ) -> Result<HarvestRecord, RepoError> {
        let mut tables = self.tables("update_harvest");
        let now = tables.now();
        let harvest = Tables::live_mut(&mut tables.harvests, |harvest| harvest.id == id)
            .ok_or(RepoError::NotFound)?;
        harvest.harvest_name = params.harvest_name;
        harvest.harvest_year = params.harvest_year;
        harvest.start_date = params.start_date;
        harvest.end_date = params.end_date;
        harvest.updated_at = now;
        Ok(harvest.clone())
    }

    async fn soft_delete_harvest(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables("soft_delete_harvest");
        Tables::soft_delete(&mut tables.harvests, |harvest| harvest.id == id)
    }
}

#[async_trait]
impl FarmCropsRepo for InMemoryRepos {
    async fn list_farm_crops(
        &self,
        query: &PageQuery,
    ) -> Result<Page<FarmCropRecord>, RepoError> {
        let tables = self.tables("list_farm_crops");
        let records: Vec<_> = Tables::live(&tables.farm_crops)
            .map(|planting| tables.planting_with_names(planting))
            .collect();
        Ok(paginate_records(records, query))
    }

    async fn find_farm_crop(&self, id: Uuid) -> Result<Option<FarmCropRecord>, RepoError> {
        let tables = self.tables("find_farm_crop");
        Ok(Tables::live(&tables.farm_crops)
            .find(|planting| planting.id == id)
            .map(|planting| tables.planting_with_names(planting)))
    }

    async fn find_farm_crop_by_triple(
        &self,
        farm_id: Uuid,
        crop_id: Uuid,
        harvest_id: Uuid,
    ) -> Result<Option<FarmCropRecord>, RepoError> {
        let tables = self.tables("find_farm_crop_by_triple");
        Ok(Tables::live(&tables.farm_crops)
            .find(|planting| {
                planting.farm_id == farm_id
                    && planting.crop_id == crop_id
                    && planting.harvest_id == harvest_id
            })
            .cloned())
    }

    async fn planted_area(
        &self,
        farm_id: Uuid,
        harvest_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<f64, RepoError> {
        let tables = self.tables("planted_area");
        Ok(Tables::live(&tables.farm_crops)
            .filter(|planting| {
                planting.farm_id == farm_id
                    && planting.harvest_id == harvest_id
                    && Some(planting.id) != exclude
            })
            .filter_map(|planting| planting.planted_area)
            .sum())
    }

    async fn create_farm_crop(
        &self,
        params: FarmCropParams,
    ) -> Result<FarmCropRecord, RepoError> {
        let mut tables = self.tables("create_farm_crop");
        let now = tables.now();
        let record = FarmCropRecord {
            id: Uuid::new_v4(),
            farm_id: params.farm_id,
            crop_id: params.crop_id,
            harvest_id: params.harvest_id,
            planted_area: params.planted_area,
            expected_yield: params.expected_yield,
            actual_yield: params.actual_yield,
            farm_name: None,
            crop_name: None,
            harvest_name: None,
            created_at: now,
            updated_at: now,
        };
        tables.farm_crops.push(Row::live(record.clone()));
        Ok(tables.planting_with_names(&record))
    }

    async fn update_farm_crop(
        &self,
        id: Uuid,
        params: FarmCropParams,
    ) -> Result<FarmCropRecord, RepoError> {
        let mut tables = self.tables("update_farm_crop");
        let now = tables.now();
        let planting = Tables::live_mut(&mut tables.farm_crops, |planting| planting.id == id)
            .ok_or(RepoError::NotFound)?;
        planting.farm_id = params.farm_id;
        planting.crop_id = params.crop_id;
        planting.harvest_id = params.harvest_id;
        planting.planted_area = params.planted_area;
        planting.expected_yield = params.expected_yield;
        planting.actual_yield = params.actual_yield;
        planting.updated_at = now;
        let planting = planting.clone();
        Ok(tables.planting_with_names(&planting))
    }

    async fn soft_delete_farm_crop(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables("soft_delete_farm_crop");
        Tables::soft_delete(&mut tables.farm_crops, |planting| planting.id == id)
    }
}

#[async_trait]
impl SeedRepo for InMemoryRepos {
    async fn has_domain_data(&self) -> Result<bool, RepoError> {
        let tables = self.tables("has_domain_data");
        Ok(!(tables.producers.is_empty()
            && tables.farms.is_empty()
            && tables.crops.is_empty()
            && tables.harvests.is_empty()
            && tables.farm_crops.is_empty()))
    }

    async fn wipe_domain_data(&self) -> Result<(), RepoError> {
        let mut tables = self.tables("wipe_domain_data");
        tables.producers.clear();
        tables.farms.clear();
        tables.crops.clear();
        tables.harvests.clear();
        tables.farm_crops.clear();
        Ok(())
    }
}

#[async_trait]
impl HealthRepo for InMemoryRepos {
    async fn ping(&self) -> Result<(), RepoError> {
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(RepoError::Timeout);
        }
        Ok(())
    }
}

/// A router over fresh in-memory repositories plus handles on its internals.
pub struct TestApp {
    pub router: Router,
    pub state: ApiState,
    pub repos: Arc<InMemoryRepos>,
    pub cache: Arc<CacheService>,
    pub trigger: Arc<CacheTrigger>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        let repos = Arc::new(InMemoryRepos::new());
        let store = Arc::new(MemoryStore::new(&config));
        let cache = if config.is_enabled() {
            Arc::new(CacheService::new(store, InvalidationMap::default()))
        } else {
            Arc::new(CacheService::disabled(store))
        };
        let queue = Arc::new(EventQueue::new());
        let consumer = Arc::new(CacheConsumer::new(
            config.clone(),
            cache.clone(),
            queue.clone(),
        ));
        let trigger = Arc::new(CacheTrigger::new(config, queue, consumer));
        let state = ApiState::from_repositories(repos.clone(), cache.clone(), trigger.clone());

        Self {
            router: http::build_router(state.clone()),
            state,
            repos,
            cache,
            trigger,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// Send a request; the body is parsed as JSON, `Null` when empty.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, json)
    }

    /// Create a producer and return its id.
    pub async fn producer(&self, document: &str, name: &str) -> String {
        let (status, body) = self
            .post(
                "/api/producers",
                serde_json::json!({ "cpfCnpj": document, "producerName": name }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    /// Create a farm of `total` hectares split 80/20 and return its id.
    pub async fn farm(&self, producer_id: &str, name: &str, state: &str, total: f64) -> String {
        let (status, body) = self
            .post(
                "/api/farms",
                serde_json::json!({
                    "farmName": name,
                    "city": "Sorriso",
                    "state": state,
                    "totalArea": total,
                    "agriculturableArea": total * 0.8,
                    "vegetationArea": total * 0.2,
                    "producerId": producer_id,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    pub async fn crop(&self, name: &str) -> String {
        let (status, body) = self
            .post("/api/crops", serde_json::json!({ "cropName": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    pub async fn harvest(&self, name: &str, year: i32) -> String {
        let (status, body) = self
            .post(
                "/api/harvests",
                serde_json::json!({ "harvestName": name, "harvestYear": year }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }
}

pub fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("record id").to_string()
}

pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().expect("error code")
}

pub const CPF_A: &str = "529.982.247-25";
pub const CPF_B: &str = "111.444.777-35";
pub const CNPJ_A: &str = "11.222.333/0001-81";
