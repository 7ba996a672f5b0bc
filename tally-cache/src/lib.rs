//! # tally-cache
//!
//! A typed, call-counting cache over an external key-value store.
//!
//! ## Features
//!
//! - **Generated identities**: every stored value gets a fresh v4 UUID key
//! - **Typed values**: text, bytes, integers and floats as one tagged [`Value`]
//! - **Typed reads**: raw bytes, UTF-8 text, integers, floats or a custom decoder
//! - **Call counting**: instrumented operations bump a persistent counter in the store
//! - **Pluggable stores**: in-memory, Synap (StreamableHTTP) or Redis
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tally_cache::{Cache, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connecting clears the store
//!     let cache = Cache::connect(MemoryStore::new()).await?;
//!
//!     let key = cache.store(123).await?;
//!     assert_eq!(cache.fetch_int(&key).await?, Some(123));
//!     assert_eq!(cache.calls(Cache::STORE).await?, 1);
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod instrument;
pub mod store;
pub mod value;

pub use cache::Cache;
pub use config::{Backend, CacheConfig};
pub use error::{CacheError, Result};
pub use instrument::count_calls;
pub use store::{HttpStore, HttpStoreConfig, KeyValueStore, MemoryStore, RedisStore};
pub use value::Value;
