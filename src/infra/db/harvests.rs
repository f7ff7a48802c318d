use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{Page, PageQuery};
use crate::application::repos::{HarvestParams, HarvestsRepo, RepoError};
use crate::domain::entities::HarvestRecord;

use super::query::{Column, Table, count_query, page_query};
use super::util::convert_count;
use super::{PostgresRepositories, map_sqlx_error};

const HARVESTS: Table = Table {
    from: "harvests h",
    alias: "h",
    columns: &[
        ("id", Column::Direct("h.id")),
        ("harvestName", Column::Direct("h.harvest_name")),
        ("harvestYear", Column::Direct("h.harvest_year")),
        ("startDate", Column::Direct("h.start_date")),
        ("endDate", Column::Direct("h.end_date")),
        ("createdAt", Column::Direct("h.created_at")),
        ("updatedAt", Column::Direct("h.updated_at")),
    ],
};

const HARVEST_SELECT: &str = "SELECT h.id, h.harvest_name, h.harvest_year, h.start_date, \
     h.end_date, h.created_at, h.updated_at";

const HARVEST_RETURNING: &str =
    "RETURNING id, harvest_name, harvest_year, start_date, end_date, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct HarvestRow {
    id: Uuid,
    harvest_name: String,
    harvest_year: i32,
    start_date: Option<OffsetDateTime>,
    end_date: Option<OffsetDateTime>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<HarvestRow> for HarvestRecord {
    fn from(row: HarvestRow) -> Self {
        Self {
            id: row.id,
            harvest_name: row.harvest_name,
            harvest_year: row.harvest_year,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl HarvestsRepo for PostgresRepositories {
    async fn list_harvests(&self, query: &PageQuery) -> Result<Page<HarvestRecord>, RepoError> {
        let count: i64 = count_query(&HARVESTS, query)?
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let rows: Vec<HarvestRow> = page_query(HARVEST_SELECT, "", &HARVESTS, query)?
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(Page::new(
            rows.into_iter().map(HarvestRecord::from).collect(),
            convert_count(count)?,
        ))
    }

    async fn find_harvest(&self, id: Uuid) -> Result<Option<HarvestRecord>, RepoError> {
        let sql =
            format!("{HARVEST_SELECT} FROM harvests h WHERE h.id = $1 AND h.deleted_at IS NULL");
        let row = sqlx::query_as::<_, HarvestRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(HarvestRecord::from))
    }

    async fn find_harvest_by_name(
        &self,
        harvest_name: &str,
    ) -> Result<Option<HarvestRecord>, RepoError> {
        let sql = format!(
            "{HARVEST_SELECT} FROM harvests h WHERE h.harvest_name = $1 AND h.deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, HarvestRow>(&sql)
            .bind(harvest_name)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(HarvestRecord::from))
    }

    async fn create_harvest(&self, params: HarvestParams) -> Result<HarvestRecord, RepoError> {
        let sql = format!(
            "INSERT INTO harvests (id, harvest_name, harvest_year, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5) {HARVEST_RETURNING}"
        );
        let row = sqlx::query_as::<_, HarvestRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&params.harvest_name)
            .bind(params.harvest_year)
            .bind(params.start_date)
            .bind(params.end_date)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_harvest(
        &self,
        id: Uuid,
        params: HarvestParams,
    ) -> Result<HarvestRecord, RepoError> {
        let sql = format!(
            "UPDATE harvests \
             SET harvest_name = $2, harvest_year = $3, start_date = $4, end_date = $5, \
                 updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL {HARVEST_RETURNING}"
        );
        let row = sqlx::query_as::<_, HarvestRow>(&sql)
            .bind(id)
            .bind(&params.harvest_name)
            .bind(params.harvest_year)
            .bind(params.start_date)
            .bind(params.end_date)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(HarvestRecord::from).ok_or(RepoError::NotFound)
    }

    async fn soft_delete_harvest(&self, id: Uuid) -> Result<(), RepoError> {
        self.soft_delete("harvests", id).await
    }
}
