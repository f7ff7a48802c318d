use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{Page, PageQuery};
use crate::application::repos::{ProducerParams, ProducersRepo, RepoError};
use crate::domain::entities::ProducerRecord;

use super::query::{Column, Table, count_query, page_query};
use super::util::convert_count;
use super::{PostgresRepositories, map_sqlx_error};

pub(super) const PRODUCERS: Table = Table {
    from: "producers p",
    alias: "p",
    columns: &[
        ("id", Column::Direct("p.id")),
        ("producerName", Column::Direct("p.producer_name")),
        ("cpfCnpj", Column::Direct("p.cpf_cnpj")),
        ("createdAt", Column::Direct("p.created_at")),
        ("updatedAt", Column::Direct("p.updated_at")),
        (
            "farms.state",
            Column::Related {
                source: "farms rf WHERE rf.producer_id = p.id AND rf.deleted_at IS NULL",
                column: "rf.state",
            },
        ),
        (
            "farms.city",
            Column::Related {
                source: "farms rf WHERE rf.producer_id = p.id AND rf.deleted_at IS NULL",
                column: "rf.city",
            },
        ),
    ],
};

const PRODUCER_SELECT: &str = "SELECT p.id, p.cpf_cnpj, p.producer_name, p.created_at, p.updated_at";

const FIND_BY_ID: &str = "SELECT p.id, p.cpf_cnpj, p.producer_name, p.created_at, p.updated_at \
     FROM producers p WHERE p.id = $1 AND p.deleted_at IS NULL";

const FIND_BY_DOCUMENT: &str = "SELECT p.id, p.cpf_cnpj, p.producer_name, p.created_at, p.updated_at \
     FROM producers p WHERE p.cpf_cnpj = $1 AND p.deleted_at IS NULL";

enum ProducerLookup<'a> {
    Id(Uuid),
    Document(&'a str),
}

#[derive(sqlx::FromRow)]
struct ProducerRow {
    id: Uuid,
    cpf_cnpj: String,
    producer_name: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ProducerRow> for ProducerRecord {
    fn from(row: ProducerRow) -> Self {
        Self {
            id: row.id,
            cpf_cnpj: row.cpf_cnpj,
            producer_name: row.producer_name,
            farms: Vec::new(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PostgresRepositories {
    async fn with_farms(&self, rows: Vec<ProducerRow>) -> Result<Vec<ProducerRecord>, RepoError> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut farms = self.farms_of_producers(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let mut producer = ProducerRecord::from(row);
                producer.farms = farms.remove(&producer.id).unwrap_or_default();
                producer
            })
            .collect())
    }

    async fn find_live_producer(
        &self,
        lookup: ProducerLookup<'_>,
    ) -> Result<Option<ProducerRecord>, RepoError> {
        let query = match lookup {
            ProducerLookup::Id(id) => sqlx::query_as::<_, ProducerRow>(FIND_BY_ID).bind(id),
            ProducerLookup::Document(document) => {
                sqlx::query_as::<_, ProducerRow>(FIND_BY_DOCUMENT).bind(document)
            }
        };
        let row = query
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(row) => Ok(self.with_farms(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ProducersRepo for PostgresRepositories {
    async fn list_producers(&self, query: &PageQuery) -> Result<Page<ProducerRecord>, RepoError> {
        let count: i64 = count_query(&PRODUCERS, query)?
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let rows: Vec<ProducerRow> = page_query(PRODUCER_SELECT, "", &PRODUCERS, query)?
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(Page::new(self.with_farms(rows).await?, convert_count(count)?))
    }

    async fn find_producer(&self, id: Uuid) -> Result<Option<ProducerRecord>, RepoError> {
        self.find_live_producer(ProducerLookup::Id(id)).await
    }

    async fn find_producer_by_document(
        &self,
        cpf_cnpj: &str,
    ) -> Result<Option<ProducerRecord>, RepoError> {
        self.find_live_producer(ProducerLookup::Document(cpf_cnpj))
            .await
    }

    async fn create_producer(&self, params: ProducerParams) -> Result<ProducerRecord, RepoError> {
        let row = sqlx::query_as::<_, ProducerRow>(
            r#"
            INSERT INTO producers (id, cpf_cnpj, producer_name)
            VALUES ($1, $2, $3)
            RETURNING id, cpf_cnpj, producer_name, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&params.cpf_cnpj)
        .bind(&params.producer_name)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_producer(
        &self,
        id: Uuid,
        params: ProducerParams,
    ) -> Result<ProducerRecord, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE producers
            SET cpf_cnpj = $2, producer_name = $3, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&params.cpf_cnpj)
        .bind(&params.producer_name)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)?;

        self.find_producer(id).await?.ok_or(RepoError::NotFound)
    }

    async fn soft_delete_producer(&self, id: Uuid) -> Result<(), RepoError> {
        self.soft_delete("producers", id).await
    }

    async fn count_producers(&self) -> Result<u64, RepoError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM producers WHERE deleted_at IS NULL")
                .fetch_one(self.pool())
                .await
                .map_err(map_sqlx_error)?;
        convert_count(count)
    }
}
