//! Postgres-backed repository implementations.

mod crops;
mod farm_crops;
mod farms;
mod harvests;
mod producers;
pub(crate) mod query;
mod seed;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{
    Postgres, Transaction,
    postgres::{PgPool, PgPoolOptions},
};
use uuid::Uuid;

use crate::application::repos::{HealthRepo, RepoError};

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<Transaction<'_, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    /// Mark a live row of `table` deleted; `RepoError::NotFound` when none is.
    async fn soft_delete(&self, table: &'static str, id: Uuid) -> Result<(), RepoError> {
        let sql =
            format!("UPDATE {table} SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL");
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl HealthRepo for PostgresRepositories {
    async fn ping(&self) -> Result<(), RepoError> {
        self.health_check().await.map_err(map_sqlx_error)
    }
}
