//! Redis-backed cache store for multi-instance deployments.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::info;

use super::store::{CacheError, CacheStore};

const SCAN_COUNT: u32 = 100;

pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Connect and verify the server answers `PING`.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(CacheError::backend)?;
        let mut connection = ConnectionManager::new(client)
            .await
            .map_err(CacheError::backend)?;

        let pong: String = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(CacheError::backend)?;
        if pong != "PONG" {
            return Err(CacheError::backend(format!("unexpected PING reply `{pong}`")));
        }

        info!(backend = "redis", "Cache store connected");
        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut connection = self.connection.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut connection)
            .await
            .map_err(CacheError::backend)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        redis::cmd("PSETEX")
            .arg(key)
            .arg(millis)
            .arg(value)
            .query_async::<()>(&mut connection)
            .await
            .map_err(CacheError::backend)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let mut connection = self.connection.clone();
        let pattern = format!("{}*", escape_glob(prefix));
        let mut cursor = 0u64;
        let mut keys = Vec::new();
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut connection)
                .await
                .map_err(CacheError::backend)?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, CacheError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut connection = self.connection.clone();
        redis::cmd("DEL")
            .arg(keys)
            .query_async(&mut connection)
            .await
            .map_err(CacheError::backend)
    }
}

/// Escape glob metacharacters so a prefix matches literally in `SCAN MATCH`.
fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
