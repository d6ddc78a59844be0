//! Bounded concurrency runner.
//!
//! A shared cursor over the inputs is drained by at most `limit` cooperative
//! workers. Every worker claims indices with an atomic fetch-and-increment, so
//! no index is processed twice, and results are put back in input order no
//! matter which worker finishes first.

use crate::error::ApiError;
use futures::future::join_all;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Run `worker` over every input with at most `limit` invocations in flight.
///
/// The returned vector has one result per input; `results[i]` was produced by
/// `worker(inputs[i])`. Workers are polled on the calling task, so concurrency
/// comes from interleaving their await points rather than from threads.
///
/// Returns `ApiError::InvalidArgument` when `limit` is zero.
pub async fn run_limited<T, R, F, Fut>(
    inputs: &[T],
    limit: usize,
    worker: F,
) -> Result<Vec<R>, ApiError>
where
    T: Clone,
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
{
    if limit == 0 {
        return Err(ApiError::InvalidArgument(
            "Concurrency limit must be at least 1".to_string(),
        ));
    }

    let cursor = AtomicUsize::new(0);
    let worker_count = limit.min(inputs.len());
    debug!(
        inputs = inputs.len(),
        limit, worker_count, "Starting bounded runner"
    );

    let workers = (0..worker_count).map(|_| {
        let cursor = &cursor;
        let worker = &worker;
        async move {
            let mut claimed = Vec::new();
            loop {
                let index = cursor.fetch_add(1, Ordering::SeqCst);
                let Some(input) = inputs.get(index) else {
                    break;
                };
                let result = worker(input.clone()).await;
                claimed.push((index, result));
            }
            claimed
        }
    });

    let mut slots: Vec<(usize, R)> = join_all(workers).await.into_iter().flatten().collect();
    slots.sort_unstable_by_key(|(index, _)| *index);
    Ok(slots.into_iter().map(|(_, result)| result).collect())
}
