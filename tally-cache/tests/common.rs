//! Common test utilities

use mockito::{Server, ServerGuard};
use tally_cache::{Cache, HttpStore, HttpStoreConfig, MemoryStore};

/// Install a test log subscriber once per test binary
#[allow(dead_code)] // Used by other test modules
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Initialized cache over a fresh in-memory store
#[allow(dead_code)] // Used by other test modules
pub async fn memory_cache() -> (Cache, MemoryStore) {
    init_tracing();
    let store = MemoryStore::new();
    let cache = Cache::connect(store.clone())
        .await
        .expect("memory store never fails to flush");
    (cache, store)
}

/// Setup an HTTP store pointing to a mock Synap server
#[allow(dead_code)] // Used by other test modules
pub async fn setup_test_store() -> (HttpStore, ServerGuard) {
    let server = Server::new_async().await;
    let config = HttpStoreConfig::new(server.url()).with_timeout(std::time::Duration::from_secs(5));
    let store = HttpStore::new(config).unwrap();
    (store, server)
}

/// Redis URL for S2S tests (requires running server)
#[allow(dead_code)] // Used by S2S test modules
pub fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/15".to_string())
}
