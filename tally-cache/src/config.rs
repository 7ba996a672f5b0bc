//! Cache configuration from YAML or `TALLY_*` environment variables

use crate::cache::Cache;
use crate::error::{CacheError, Result};
use crate::store::{HttpStore, HttpStoreConfig, MemoryStore, RedisStore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Which backing store to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    Http,
    Redis,
}

impl std::str::FromStr for Backend {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "http" | "synap" => Ok(Self::Http),
            "redis" => Ok(Self::Redis),
            other => Err(CacheError::Config(format!("unknown backend: {}", other))),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub backend: Backend,
    /// Server URL, required for `http` and `redis`
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            url: None,
            timeout_secs: default_timeout_secs(),
            auth_token: None,
        }
    }
}

impl CacheConfig {
    /// Parse configuration from a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| CacheError::Config(e.to_string()))
    }

    /// Load configuration from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| CacheError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    /// Read configuration from `TALLY_*` environment variables
    ///
    /// `TALLY_BACKEND` (default `memory`), `TALLY_URL`, `TALLY_TIMEOUT_SECS`,
    /// `TALLY_AUTH_TOKEN`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(backend) = lookup("TALLY_BACKEND") {
            config.backend = backend.parse()?;
        }
        config.url = lookup("TALLY_URL");
        if let Some(timeout) = lookup("TALLY_TIMEOUT_SECS") {
            config.timeout_secs = timeout
                .parse()
                .map_err(|_| CacheError::Config(format!("invalid TALLY_TIMEOUT_SECS: {}", timeout)))?;
        }
        config.auth_token = lookup("TALLY_AUTH_TOKEN");

        Ok(config)
    }

    fn require_url(&self) -> Result<&str> {
        self.url
            .as_deref()
            .ok_or_else(|| CacheError::Config(format!("{:?} backend requires a url", self.backend)))
    }

    /// Build the configured store and wrap it in a cache
    ///
    /// The returned cache is not initialized yet. Redis connects here, so an
    /// unreachable Redis server fails with [`CacheError::Connection`].
    pub async fn open(&self) -> Result<Cache> {
        info!("Opening {:?} cache backend", self.backend);
        match self.backend {
            Backend::Memory => Ok(Cache::new(MemoryStore::new())),
            Backend::Http => {
                let mut config = HttpStoreConfig::new(self.require_url()?)
                    .with_timeout(Duration::from_secs(self.timeout_secs));
                if let Some(ref token) = self.auth_token {
                    config = config.with_auth_token(token);
                }
                Ok(Cache::new(HttpStore::new(config)?))
            }
            Backend::Redis => Ok(Cache::new(RedisStore::connect(self.require_url()?).await?)),
        }
    }
}
