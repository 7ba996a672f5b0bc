//! Call-count instrumentation
//!
//! An instrumented operation bumps a persistent counter in the backing store
//! each time it is invoked. The counter is incremented *before* the operation
//! runs, so it records call attempts: a call whose body later fails is still
//! counted.
//!
//! Counter names are explicit strings chosen by the caller. They share the
//! store's namespace with cache entries, so they must not look like the
//! UUID identities the cache generates (`"Cache.store"` never does).

use crate::error::Result;
use crate::store::KeyValueStore;
use std::future::Future;
use tracing::trace;

/// Increment counter `name` on `store`, then run `op`
///
/// Returns whatever `op` returns. If the increment itself fails, `op` is not
/// run and the store error is returned.
///
/// ```no_run
/// # use tally_cache::{MemoryStore, count_calls};
/// # #[tokio::main]
/// # async fn main() -> tally_cache::Result<()> {
/// let store = MemoryStore::new();
/// let answer = count_calls(&store, "Report.build", || async { Ok(42) }).await?;
/// assert_eq!(answer, 42);
/// # Ok(())
/// # }
/// ```
pub async fn count_calls<S, F, Fut, T>(store: &S, name: &str, op: F) -> Result<T>
where
    S: KeyValueStore + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let calls = store.incr(name).await?;
    trace!(counter = name, calls, "counted call");
    op().await
}
