use async_trait::async_trait;

use crate::application::repos::{RepoError, SeedRepo};

use super::{PostgresRepositories, map_sqlx_error};

// Children first so foreign keys never block a delete.
const DOMAIN_TABLES: [&str; 5] = ["farm_crops", "farms", "harvests", "crops", "producers"];

#[async_trait]
impl SeedRepo for PostgresRepositories {
    async fn has_domain_data(&self) -> Result<bool, RepoError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM producers)
                OR EXISTS (SELECT 1 FROM farms)
                OR EXISTS (SELECT 1 FROM crops)
                OR EXISTS (SELECT 1 FROM harvests)
                OR EXISTS (SELECT 1 FROM farm_crops)
            "#,
        )
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn wipe_domain_data(&self) -> Result<(), RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;
        for table in DOMAIN_TABLES {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }
        tx.commit().await.map_err(map_sqlx_error)
    }
}
