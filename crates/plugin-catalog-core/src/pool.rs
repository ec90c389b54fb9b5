//! Bounded fan-out
//!
//! Runs one async job per item on the tokio runtime with a cap on how many
//! are in flight at once.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Default number of concurrent marketplace requests
pub const DEFAULT_CONCURRENCY: usize = 25;

/// Run `job` for every item with at most `limit` jobs in flight.
///
/// Results come back in completion order. A panicking job is logged and
/// contributes no result.
pub async fn run_bounded<I, T, F, Fut>(items: I, limit: usize, job: F) -> Vec<T>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut join_set = JoinSet::new();

    for item in items {
        let semaphore = Arc::clone(&semaphore);
        let task = job(item);
        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            task.await
        });
    }

    let mut results = Vec::with_capacity(join_set.len());
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(value) => results.push(value),
            Err(e) => tracing::error!("worker task failed: {}", e),
        }
    }

    results
}
