//! Bounded-concurrency fan-out over independent tasks.


use futures::stream::{self, StreamExt};
use std::fmt::Display;
use std::future::Future;
use tracing::{debug, warn};

/// Concurrent model calls when nothing else is configured
pub const DEFAULT_WORKERS: usize = 5;

/// Successful outputs in input order, plus the tasks that failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutResult<T> {
    pub results: Vec<T>,
    /// (input index, error message)
    pub failures: Vec<(usize, String)>,
}

impl<T> FanOutResult<T> {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

impl<T> FanOutResult<Vec<T>> {
    /// Concatenate per-task lists into one
    pub fn flatten(self) -> Vec<T> {
        self.results.into_iter().flatten().collect()
    }
}

/// Run `task` over `items` with at most `workers` in flight.
///
/// A failed task is logged and recorded; it never cancels its siblings.
pub async fn fan_out<I, T, R, E, F, Fut>(items: I, workers: usize, task: F) -> FanOutResult<R>
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: Display,
{
    let workers = workers.max(1);
    let outcomes: Vec<(usize, Result<R, E>)> = stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| {
            let fut = task(item);
            async move { (index, fut.await) }
        })
        .buffered(workers)
        .collect()
        .await;

    let mut results = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for (index, outcome) in outcomes {
        match outcome {
            Ok(value) => results.push(value),
            Err(e) => {
                warn!(task = index, error = %e, "task failed");
                failures.push((index, e.to_string()));
            }
        }
    }

    debug!(
        succeeded = results.len(),
        failed = failures.len(),
        workers,
        "fan-out complete"
    );
    FanOutResult { results, failures }
}
