//! Bounded scatter/gather over independent units of work.

use std::future::Future;

use futures_util::stream::{self, StreamExt};

/// Run `task` for every item with at most `limit` in flight. Results arrive in
/// completion order; callers key them (by patient id or index) before merging.
pub async fn fan_out<I, T, F, Fut>(items: I, limit: usize, task: F) -> Vec<Fut::Output>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future,
{
    stream::iter(items)
        .map(task)
        .buffer_unordered(limit.max(1))
        .collect()
        .await
}
