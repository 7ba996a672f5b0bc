//! Key-value store backed by a Redis server

use super::KeyValueStore;
use crate::error::{CacheError, Result};
use crate::value::Value;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, info};

/// Key-value store backed by a Redis server
///
/// The connection manager reconnects on its own; clones share it.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to the Redis server at `url` (e.g. `redis://127.0.0.1:6379/0`)
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| CacheError::Config(format!("invalid Redis URL {}: {}", url, e)))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("failed to connect to Redis: {}", e)))?;

        info!("Connected to Redis at {}", url);
        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        debug!("SET key={}, kind={}", key, value.kind());
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, value.to_bytes()).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        debug!("GET key={}", key);
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut conn = self.conn.clone();
        let value: i64 = conn.incr(key, 1).await?;
        Ok(value)
    }

    async fn flush_all(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
        info!("Flushed Redis database");
        Ok(())
    }
}
