//! Cache over a key-value store
//!
//! The cache generates the identity of every entry it writes, so callers
//! never pick keys. Reads come back as raw bytes or through one of the typed
//! accessors. `store` is instrumented: each call bumps the `"Cache.store"`
//! counter in the same store before anything is written.

use crate::error::{CacheError, Result};
use crate::instrument::count_calls;
use crate::store::KeyValueStore;
use crate::value::Value;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Typed, call-counting cache
///
/// Cloning is cheap; clones share the store handle and the initialized flag.
#[derive(Clone)]
pub struct Cache {
    kv: Arc<dyn KeyValueStore>,
    initialized: Arc<AtomicBool>,
}

impl Cache {
    /// Counter name for [`Cache::store`]
    pub const STORE: &'static str = "Cache.store";

    /// Wrap a store; the cache is not usable until [`Cache::initialize`]
    pub fn new<S>(store: S) -> Self
    where
        S: KeyValueStore + 'static,
    {
        Self::from_shared(Arc::new(store))
    }

    /// Wrap an already shared store handle
    pub fn from_shared(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv: store,
            initialized: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Wrap a store and initialize it in one step
    ///
    /// Destructive, see [`Cache::initialize`].
    pub async fn connect<S>(store: S) -> Result<Self>
    where
        S: KeyValueStore + 'static,
    {
        let cache = Self::new(store);
        cache.initialize().await?;
        Ok(cache)
    }

    /// Check the connection and clear every key in the store
    ///
    /// **Warning:** this wipes all pre-existing data in the store's
    /// namespace, counters included. Calling it again later clears whatever
    /// was written in between.
    pub async fn initialize(&self) -> Result<()> {
        self.kv.flush_all().await?;
        self.initialized.store(true, Ordering::Release);
        info!("Cache initialized, store flushed");
        Ok(())
    }

    /// True once [`Cache::initialize`] has succeeded
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(CacheError::NotInitialized)
        }
    }

    /// Store `data` under a freshly generated identity and return it
    ///
    /// The identity is the hyphenated form of a random v4 UUID.
    ///
    /// ```no_run
    /// # use tally_cache::{Cache, MemoryStore};
    /// # #[tokio::main]
    /// # async fn main() -> tally_cache::Result<()> {
    /// let cache = Cache::connect(MemoryStore::new()).await?;
    /// let key = cache.store("Hello, World!").await?;
    /// assert_eq!(cache.fetch_text(&key).await?.as_deref(), Some("Hello, World!"));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn store(&self, data: impl Into<Value>) -> Result<String> {
        self.ensure_initialized()?;
        let value = data.into();

        count_calls(self.kv.as_ref(), Self::STORE, || async {
            self.write_new(&value).await
        })
        .await
    }

    /// Store a dynamically typed value
    ///
    /// Strings and numbers that fit in `i64`/`f64` are accepted; anything
    /// else fails with [`CacheError::UnsupportedValue`] without writing. The
    /// call is counted under [`Cache::STORE`] either way.
    pub async fn store_json(&self, data: serde_json::Value) -> Result<String> {
        self.ensure_initialized()?;

        count_calls(self.kv.as_ref(), Self::STORE, || async {
            let value = Value::try_from(data)?;
            self.write_new(&value).await
        })
        .await
    }

    async fn write_new(&self, value: &Value) -> Result<String> {
        let key = Uuid::new_v4().to_string();
        self.kv.set(&key, value).await?;
        debug!("Stored {} value at {}", value.kind(), key);
        Ok(key)
    }

    /// Raw stored bytes for `key`, `None` when the key is unknown
    pub async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.ensure_initialized()?;
        self.kv.get(key).await
    }

    /// Fetch and decode with a caller-supplied decoder
    ///
    /// The decoder only runs when the key exists. Its error is returned as
    /// [`CacheError::Decoder`].
    pub async fn fetch_with<T, E, F>(&self, key: &str, decoder: F) -> Result<Option<T>>
    where
        F: FnOnce(Vec<u8>) -> std::result::Result<T, E>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        self.fetch(key)
            .await?
            .map(decoder)
            .transpose()
            .map_err(|e| CacheError::Decoder(e.into()))
    }

    /// Fetch as UTF-8 text
    ///
    /// Fails with [`CacheError::Utf8`] when the stored bytes are not UTF-8.
    pub async fn fetch_text(&self, key: &str) -> Result<Option<String>> {
        Ok(self.fetch(key).await?.map(String::from_utf8).transpose()?)
    }

    /// Fetch as a base-10 integer
    ///
    /// Returns `None` both when the key is unknown and when the value does
    /// not parse; use [`Cache::fetch_int_checked`] to tell them apart.
    pub async fn fetch_int(&self, key: &str) -> Result<Option<i64>> {
        match self.fetch_int_checked(key).await {
            Err(CacheError::NotAnInteger { key, value }) => {
                warn!("Value at {} is not an integer ({:?}), treating as absent", key, value);
                Ok(None)
            }
            other => other,
        }
    }

    /// Fetch as a base-10 integer, reporting unparsable values
    ///
    /// Unknown key → `Ok(None)`, unparsable value → [`CacheError::NotAnInteger`].
    pub async fn fetch_int_checked(&self, key: &str) -> Result<Option<i64>> {
        let Some(raw) = self.fetch(key).await? else {
            return Ok(None);
        };

        let text = String::from_utf8_lossy(&raw);
        text.trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| CacheError::NotAnInteger {
                key: key.to_string(),
                value: text.into_owned(),
            })
    }

    /// Fetch as a float; unknown or unparsable values are `None`
    pub async fn fetch_float(&self, key: &str) -> Result<Option<f64>> {
        let Some(raw) = self.fetch(key).await? else {
            return Ok(None);
        };

        let parsed = std::str::from_utf8(&raw)
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok());
        if parsed.is_none() {
            warn!("Value at {} is not a float, treating as absent", key);
        }
        Ok(parsed)
    }

    /// Number of counted calls recorded under `counter`
    ///
    /// A counter that was never incremented reads as 0.
    pub async fn calls(&self, counter: &str) -> Result<i64> {
        Ok(self.fetch_int_checked(counter).await?.unwrap_or(0))
    }

    /// Run `op` as an instrumented operation counted under `name`
    ///
    /// Same semantics as [`count_calls`], on this cache's store.
    pub async fn counted<T, F, Fut>(&self, name: &str, op: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.ensure_initialized()?;
        count_calls(self.kv.as_ref(), name, op).await
    }
}
