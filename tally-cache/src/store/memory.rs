//! In-process key-value store

use super::KeyValueStore;
use crate::error::{CacheError, Result};
use crate::value::Value;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// In-process key-value store
///
/// Holds the canonical byte encoding of each value, so reads behave the same
/// as against a remote store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held, counters included
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True when no keys are held
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        debug!("SET key={}, kind={}", key, value.kind());
        self.data.write().insert(key.to_string(), value.to_bytes());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        debug!("GET key={}", key);
        Ok(self.data.read().get(key).cloned())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut data = self.data.write();

        let current = match data.get(key) {
            Some(bytes) => std::str::from_utf8(bytes)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| {
                    CacheError::Store(format!("value at {} is not an integer", key))
                })?,
            None => 0,
        };

        let next = current
            .checked_add(1)
            .ok_or_else(|| CacheError::Store(format!("increment of {} would overflow", key)))?;
        data.insert(key.to_string(), next.to_string().into_bytes());

        debug!("INCR key={}, value={}", key, next);
        Ok(next)
    }

    async fn flush_all(&self) -> Result<()> {
        let mut data = self.data.write();
        let count = data.len();
        data.clear();
        info!("Flushed {} keys from memory store", count);
        Ok(())
    }
}
