use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{Page, PageQuery};
use crate::application::repos::{CropParams, CropsRepo, RepoError};
use crate::domain::entities::{CropRecord, CropStats};

use super::query::{Column, Table, count_query, page_query};
use super::util::convert_count;
use super::{PostgresRepositories, map_sqlx_error};

const CROPS: Table = Table {
    from: "crops c",
    alias: "c",
    columns: &[
        ("id", Column::Direct("c.id")),
        ("cropName", Column::Direct("c.crop_name")),
        ("description", Column::Direct("c.description")),
        ("createdAt", Column::Direct("c.created_at")),
        ("updatedAt", Column::Direct("c.updated_at")),
    ],
};

const CROP_SELECT: &str = "SELECT c.id, c.crop_name, c.description, c.created_at, c.updated_at";

#[derive(sqlx::FromRow)]
struct CropRow {
    id: Uuid,
    crop_name: String,
    description: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<CropRow> for CropRecord {
    fn from(row: CropRow) -> Self {
        Self {
            id: row.id,
            crop_name: row.crop_name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CropStatsRow {
    crop_name: String,
    count: i64,
    total_area: f64,
}

#[async_trait]
impl CropsRepo for PostgresRepositories {
    async fn list_crops(&self, query: &PageQuery) -> Result<Page<CropRecord>, RepoError> {
        let count: i64 = count_query(&CROPS, query)?
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let rows: Vec<CropRow> = page_query(CROP_SELECT, "", &CROPS, query)?
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(Page::new(
            rows.into_iter().map(CropRecord::from).collect(),
            convert_count(count)?,
        ))
    }

    async fn find_crop(&self, id: Uuid) -> Result<Option<CropRecord>, RepoError> {
        let sql = format!("{CROP_SELECT} FROM crops c WHERE c.id = $1 AND c.deleted_at IS NULL");
        let row = sqlx::query_as::<_, CropRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(CropRecord::from))
    }

    async fn find_crop_by_name(&self, crop_name: &str) -> Result<Option<CropRecord>, RepoError> {
        let sql =
            format!("{CROP_SELECT} FROM crops c WHERE c.crop_name = $1 AND c.deleted_at IS NULL");
        let row = sqlx::query_as::<_, CropRow>(&sql)
            .bind(crop_name)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(CropRecord::from))
    }

    async fn create_crop(&self, params: CropParams) -> Result<CropRecord, RepoError> {
        let row = sqlx::query_as::<_, CropRow>(
            r#"
            INSERT INTO crops (id, crop_name, description)
            VALUES ($1, $2, $3)
            RETURNING id, crop_name, description, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&params.crop_name)
        .bind(&params.description)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_crop(&self, id: Uuid, params: CropParams) -> Result<CropRecord, RepoError> {
        let row = sqlx::query_as::<_, CropRow>(
            r#"
            UPDATE crops
            SET crop_name = $2, description = $3, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, crop_name, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&params.crop_name)
        .bind(&params.description)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(CropRecord::from).ok_or(RepoError::NotFound)
    }

    async fn soft_delete_crop(&self, id: Uuid) -> Result<(), RepoError> {
        self.soft_delete("crops", id).await
    }

    async fn crop_stats(&self) -> Result<Vec<CropStats>, RepoError> {
        let rows = sqlx::query_as::<_, CropStatsRow>(
            r#"
            SELECT
                c.crop_name,
                COUNT(fc.id) AS count,
                COALESCE(SUM(fc.planted_area), 0)::float8 AS total_area
            FROM crops c
            LEFT JOIN farm_crops fc ON fc.crop_id = c.id AND fc.deleted_at IS NULL
            WHERE c.deleted_at IS NULL
            GROUP BY c.id, c.crop_name
            ORDER BY count DESC, c.crop_name ASC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(CropStats {
                    crop_name: row.crop_name,
                    count: convert_count(row.count)?,
                    total_area: row.total_area,
                })
            })
            .collect()
    }
}
