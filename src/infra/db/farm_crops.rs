use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{Page, PageQuery};
use crate::application::repos::{FarmCropParams, FarmCropsRepo, RepoError};
use crate::domain::entities::FarmCropRecord;

use super::query::{Column, Table, count_query, page_query};
use super::util::convert_count;
use super::{PostgresRepositories, map_sqlx_error};

const FARM_CROPS: Table = Table {
    from: "farm_crops fc",
    alias: "fc",
    columns: &[
        ("id", Column::Direct("fc.id")),
        ("farmId", Column::Direct("fc.farm_id")),
        ("cropId", Column::Direct("fc.crop_id")),
        ("harvestId", Column::Direct("fc.harvest_id")),
        ("plantedArea", Column::Direct("fc.planted_area")),
        ("expectedYield", Column::Direct("fc.expected_yield")),
        ("actualYield", Column::Direct("fc.actual_yield")),
        ("createdAt", Column::Direct("fc.created_at")),
        ("updatedAt", Column::Direct("fc.updated_at")),
    ],
};

const FARM_CROP_SELECT: &str = "SELECT fc.id, fc.farm_id, fc.crop_id, fc.harvest_id, \
     fc.planted_area::float8 AS planted_area, \
     fc.expected_yield::float8 AS expected_yield, \
     fc.actual_yield::float8 AS actual_yield, \
     f.farm_name, c.crop_name, h.harvest_name, fc.created_at, fc.updated_at";

const FARM_CROP_JOINS: &str = " LEFT JOIN farms f ON f.id = fc.farm_id \
     LEFT JOIN crops c ON c.id = fc.crop_id \
     LEFT JOIN harvests h ON h.id = fc.harvest_id";

#[derive(sqlx::FromRow)]
struct FarmCropRow {
    id: Uuid,
    farm_id: Uuid,
    crop_id: Uuid,
    harvest_id: Uuid,
    planted_area: Option<f64>,
    expected_yield: Option<f64>,
    actual_yield: Option<f64>,
    farm_name: Option<String>,
    crop_name: Option<String>,
    harvest_name: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<FarmCropRow> for FarmCropRecord {
    fn from(row: FarmCropRow) -> Self {
        Self {
            id: row.id,
            farm_id: row.farm_id,
            crop_id: row.crop_id,
            harvest_id: row.harvest_id,
            planted_area: row.planted_area,
            expected_yield: row.expected_yield,
            actual_yield: row.actual_yield,
            farm_name: row.farm_name,
            crop_name: row.crop_name,
            harvest_name: row.harvest_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl FarmCropsRepo for PostgresRepositories {
    async fn list_farm_crops(
        &self,
        query: &PageQuery,
    ) -> Result<Page<FarmCropRecord>, RepoError> {
        let count: i64 = count_query(&FARM_CROPS, query)?
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let rows: Vec<FarmCropRow> =
            page_query(FARM_CROP_SELECT, FARM_CROP_JOINS, &FARM_CROPS, query)?
                .build_query_as()
                .fetch_all(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        Ok(Page::new(
            rows.into_iter().map(FarmCropRecord::from).collect(),
            convert_count(count)?,
        ))
    }

    async fn find_farm_crop(&self, id: Uuid) -> Result<Option<FarmCropRecord>, RepoError> {
        let sql = format!(
            "{FARM_CROP_SELECT} FROM farm_crops fc{FARM_CROP_JOINS} \
             WHERE fc.id = $1 AND fc.deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, FarmCropRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(FarmCropRecord::from))
    }

    async fn find_farm_crop_by_triple(
        &self,
        farm_id: Uuid,
        crop_id: Uuid,
        harvest_id: Uuid,
    ) -> Result<Option<FarmCropRecord>, RepoError> {
        let sql = format!(
            "{FARM_CROP_SELECT} FROM farm_crops fc{FARM_CROP_JOINS} \
             WHERE fc.farm_id = $1 AND fc.crop_id = $2 AND fc.harvest_id = $3 \
               AND fc.deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, FarmCropRow>(&sql)
            .bind(farm_id)
            .bind(crop_id)
            .bind(harvest_id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(FarmCropRecord::from))
    }

    async fn planted_area(
        &self,
        farm_id: Uuid,
        harvest_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<f64, RepoError> {
        sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(planted_area), 0)::float8
            FROM farm_crops
            WHERE farm_id = $1
              AND harvest_id = $2
              AND deleted_at IS NULL
              AND ($3::uuid IS NULL OR id <> $3)
            "#,
        )
        .bind(farm_id)
        .bind(harvest_id)
        .bind(exclude)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_farm_crop(
        &self,
        params: FarmCropParams,
    ) -> Result<FarmCropRecord, RepoError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO farm_crops (
                id, farm_id, crop_id, harvest_id,
                planted_area, expected_yield, actual_yield
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(params.farm_id)
        .bind(params.crop_id)
        .bind(params.harvest_id)
        .bind(params.planted_area)
        .bind(params.expected_yield)
        .bind(params.actual_yield)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        self.find_farm_crop(id).await?.ok_or(RepoError::NotFound)
    }

    async fn update_farm_crop(
        &self,
        id: Uuid,
        params: FarmCropParams,
    ) -> Result<FarmCropRecord, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE farm_crops
            SET farm_id = $2,
                crop_id = $3,
                harvest_id = $4,
                planted_area = $5,
                expected_yield = $6,
                actual_yield = $7,
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(params.farm_id)
        .bind(params.crop_id)
        .bind(params.harvest_id)
        .bind(params.planted_area)
        .bind(params.expected_yield)
        .bind(params.actual_yield)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)?;

        self.find_farm_crop(id).await?.ok_or(RepoError::NotFound)
    }

    async fn soft_delete_farm_crop(&self, id: Uuid) -> Result<(), RepoError> {
        self.soft_delete("farm_crops", id).await
    }
}
