//! Key-value store adapters
//!
//! The cache only talks to a store through [`KeyValueStore`]. Three adapters
//! ship with the crate:
//!
//! - [`MemoryStore`]: in-process map, for tests and embedding
//! - [`HttpStore`]: a Synap server over its StreamableHTTP command endpoint
//! - [`RedisStore`]: a Redis server

mod http;
mod memory;
mod redis;

pub use self::http::{HttpStore, HttpStoreConfig};
pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use crate::error::Result;
use crate::value::Value;
use async_trait::async_trait;

/// Minimal capability surface of a backing key-value store
///
/// Implementations are expected to make each individual operation atomic;
/// the cache adds no locking of its own.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &Value) -> Result<()>;

    /// Raw bytes stored under `key`, `None` when absent
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Atomically add one to the integer at `key` and return the new value
    ///
    /// A missing key counts as 0.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Remove every key in the store's namespace
    async fn flush_all(&self) -> Result<()>;
}
