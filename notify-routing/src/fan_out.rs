//! Task-per-item concurrency helpers.
//!
//! Item counts are small (ancestor levels of one path, changed files of one
//! event, destinations of one run), so every item gets its own tokio task and
//! there is no pool bound. Results travel back through the join handles; the
//! only buffer is local to the awaiting task.

use std::future::Future;

use tokio::task::{JoinError, JoinSet};

/// Run `task` for every item concurrently and return the outputs in item
/// order, regardless of completion order.
///
/// Fail-fast: the first error (or panicked task) aborts every sibling still
/// running and is returned alone. Partial results are dropped.
pub async fn ordered<T, R, E, F, Fut>(items: impl IntoIterator<Item = T>, task: F) -> Result<Vec<R>, E>
where
    F: Fn(usize, T) -> Fut,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: From<JoinError> + Send + 'static,
{
    let mut set = JoinSet::new();
    for (index, item) in items.into_iter().enumerate() {
        let fut = task(index, item);
        set.spawn(async move { fut.await.map(|out| (index, out)) });
    }

    let mut done: Vec<(usize, R)> = Vec::with_capacity(set.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Ok(pair)) => done.push(pair),
            Ok(Err(err)) => {
                set.abort_all();
                return Err(err);
            }
            Err(join_err) => {
                set.abort_all();
                return Err(E::from(join_err));
            }
        }
    }

    done.sort_by_key(|(index, _)| *index);
    Ok(done.into_iter().map(|(_, out)| out).collect())
}

/// Run `task` for every item concurrently and wait for all of them.
///
/// Nothing is aborted: tasks already running when a failure is observed are
/// allowed to finish. Returns the first failure in completion order; later
/// failures are discarded.
pub async fn settle<T, E, F, Fut>(items: impl IntoIterator<Item = T>, task: F) -> Result<(), E>
where
    F: Fn(usize, T) -> Fut,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: From<JoinError> + Send + 'static,
{
    let mut set = JoinSet::new();
    for (index, item) in items.into_iter().enumerate() {
        set.spawn(task(index, item));
    }

    let mut first_err: Option<E> = None;
    while let Some(joined) = set.join_next().await {
        let outcome = joined.map_err(E::from).and_then(|r| r);
        if let Err(err) = outcome {
            first_err.get_or_insert(err);
        }
    }
    first_err.map_or(Ok(()), Err)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
