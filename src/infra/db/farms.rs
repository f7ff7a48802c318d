use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{Page, PageQuery};
use crate::application::repos::{FarmParams, FarmsRepo, LandUseTotals, RepoError};
use crate::domain::entities::{FarmRecord, FarmsByState};

use super::query::{Column, Table, count_query, page_query};
use super::util::convert_count;
use super::{PostgresRepositories, map_sqlx_error};

pub(super) const FARMS: Table = Table {
    from: "farms f",
    alias: "f",
    columns: &[
        ("id", Column::Direct("f.id")),
        ("farmName", Column::Direct("f.farm_name")),
        ("city", Column::Direct("f.city")),
        ("state", Column::Direct("f.state")),
        ("totalArea", Column::Direct("f.total_area")),
        ("agriculturableArea", Column::Direct("f.agriculturable_area")),
        ("vegetationArea", Column::Direct("f.vegetation_area")),
        ("producerId", Column::Direct("f.producer_id")),
        ("createdAt", Column::Direct("f.created_at")),
        ("updatedAt", Column::Direct("f.updated_at")),
    ],
};

const FARM_SELECT: &str = "SELECT f.id, f.farm_name, f.city, f.state, \
     f.total_area::float8 AS total_area, \
     f.agriculturable_area::float8 AS agriculturable_area, \
     f.vegetation_area::float8 AS vegetation_area, \
     f.producer_id, p.producer_name, f.created_at, f.updated_at";

const FARM_JOINS: &str = " LEFT JOIN producers p ON p.id = f.producer_id";

#[derive(sqlx::FromRow)]
struct FarmRow {
    id: Uuid,
    farm_name: String,
    city: String,
    state: String,
    total_area: f64,
    agriculturable_area: f64,
    vegetation_area: f64,
    producer_id: Uuid,
    producer_name: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<FarmRow> for FarmRecord {
    fn from(row: FarmRow) -> Self {
        Self {
            id: row.id,
            farm_name: row.farm_name,
            city: row.city,
            state: row.state,
            total_area: row.total_area,
            agriculturable_area: row.agriculturable_area,
            vegetation_area: row.vegetation_area,
            producer_id: row.producer_id,
            producer_name: row.producer_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StateCountRow {
    state: String,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct LandUseRow {
    agriculturable: f64,
    vegetation: f64,
}

impl PostgresRepositories {
    /// Live farms of each producer in `producer_ids`, oldest first.
    pub(super) async fn farms_of_producers(
        &self,
        producer_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<FarmRecord>>, RepoError> {
        if producer_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "{FARM_SELECT} FROM farms f{FARM_JOINS} \
             WHERE f.producer_id = ANY($1) AND f.deleted_at IS NULL \
             ORDER BY f.created_at ASC, f.id ASC"
        );
        let rows = sqlx::query_as::<_, FarmRow>(&sql)
            .bind(producer_ids)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut grouped: HashMap<Uuid, Vec<FarmRecord>> = HashMap::new();
        for row in rows {
            grouped.entry(row.producer_id).or_default().push(row.into());
        }
        Ok(grouped)
    }
}

#[async_trait]
impl FarmsRepo for PostgresRepositories {
    async fn list_farms(&self, query: &PageQuery) -> Result<Page<FarmRecord>, RepoError> {
        let count: i64 = count_query(&FARMS, query)?
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let rows: Vec<FarmRow> = page_query(FARM_SELECT, FARM_JOINS, &FARMS, query)?
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(Page::new(
            rows.into_iter().map(FarmRecord::from).collect(),
            convert_count(count)?,
        ))
    }

    async fn find_farm(&self, id: Uuid) -> Result<Option<FarmRecord>, RepoError> {
        let sql = format!(
            "{FARM_SELECT} FROM farms f{FARM_JOINS} WHERE f.id = $1 AND f.deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, FarmRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(FarmRecord::from))
    }

    async fn create_farm(&self, params: FarmParams) -> Result<FarmRecord, RepoError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO farms (
                id, farm_name, city, state,
                total_area, agriculturable_area, vegetation_area, producer_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&params.farm_name)
        .bind(&params.city)
        .bind(&params.state)
        .bind(params.total_area)
        .bind(params.agriculturable_area)
        .bind(params.vegetation_area)
        .bind(params.producer_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        self.find_farm(id).await?.ok_or(RepoError::NotFound)
    }

    async fn update_farm(&self, id: Uuid, params: FarmParams) -> Result<FarmRecord, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE farms
            SET farm_name = $2,
                city = $3,
                state = $4,
                total_area = $5,
                agriculturable_area = $6,
                vegetation_area = $7,
                producer_id = $8,
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&params.farm_name)
        .bind(&params.city)
        .bind(&params.state)
        .bind(params.total_area)
        .bind(params.agriculturable_area)
        .bind(params.vegetation_area)
        .bind(params.producer_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)?;

        self.find_farm(id).await?.ok_or(RepoError::NotFound)
    }

    async fn soft_delete_farm(&self, id: Uuid) -> Result<(), RepoError> {
        self.soft_delete("farms", id).await
    }

    async fn count_farms(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM farms WHERE deleted_at IS NULL")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        convert_count(count)
    }

    async fn total_hectares(&self) -> Result<f64, RepoError> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_area), 0)::float8 FROM farms WHERE deleted_at IS NULL",
        )
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn farms_by_state(&self) -> Result<Vec<FarmsByState>, RepoError> {
        let rows = sqlx::query_as::<_, StateCountRow>(
            r#"
            SELECT state, COUNT(*) AS count
            FROM farms
            WHERE deleted_at IS NULL
            GROUP BY state
            ORDER BY count DESC, state ASC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(FarmsByState {
                    state: row.state,
                    count: convert_count(row.count)?,
                })
            })
            .collect()
    }

    async fn land_use(&self) -> Result<LandUseTotals, RepoError> {
        let row = sqlx::query_as::<_, LandUseRow>(
            r#"
            SELECT
                COALESCE(SUM(agriculturable_area), 0)::float8 AS agriculturable,
                COALESCE(SUM(vegetation_area), 0)::float8 AS vegetation
            FROM farms
            WHERE deleted_at IS NULL
            "#,
        )
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(LandUseTotals {
            agriculturable: row.agriculturable,
            vegetation: row.vegetation,
        })
    }
}
