//! Bounded worker-pool dispatch
//!
//! [`dispatch`] runs a fixed set of work items through at most N
//! concurrent handler invocations and returns once every item has been
//! fully handled. The queue is pre-populated and closed before workers
//! start; a closed, drained queue is the workers' exit signal, and
//! joining the workers is the caller's completion barrier.
//!
//! Handlers are awaited inline by their worker, so work a handler spawns
//! and awaits (such as a nested dispatch for the next tier) is finished
//! before the barrier releases. A panicking handler takes down only its
//! own worker task; remaining items are drained by the surviving workers.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

/// Runs `handler` over `items` with at most `concurrency` invocations in
/// flight, returning after every item has been handled exactly once.
///
/// A `concurrency` of 0 is treated as 1. Returns immediately for an empty
/// item set. Handler outcomes are not collected; side effects are the
/// only observable output.
pub async fn dispatch<T, F, Fut>(items: Vec<T>, concurrency: usize, handler: F)
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    if items.is_empty() {
        return;
    }

    let workers = concurrency.max(1).min(items.len());

    // Pre-populate the queue, then close it by dropping the sender.
    let (tx, rx) = mpsc::channel(items.len());
    for item in items {
        // Capacity equals the item count, so this never blocks.
        if tx.send(item).await.is_err() {
            break;
        }
    }
    drop(tx);

    let rx = Arc::new(Mutex::new(rx));
    let mut pool = JoinSet::new();

    for _ in 0..workers {
        let rx = Arc::clone(&rx);
        let handler = handler.clone();
        pool.spawn(async move {
            loop {
                // Hold the receiver lock only while dequeuing; handlers
                // from different workers run concurrently.
                let item = { rx.lock().await.recv().await };
                match item {
                    Some(item) => handler(item).await,
                    None => break,
                }
            }
        });
    }

    while let Some(joined) = pool.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() {
                tracing::error!("dispatch worker panicked: {}", e);
            }
        }
    }
}
