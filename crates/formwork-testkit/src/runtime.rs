//! Local runtime helpers
//!
//! Async validation passes are spawned with `spawn_local`, so every test that
//! touches an async validator runs inside a `LocalSet`. Pair these helpers
//! with `#[tokio::test(start_paused = true)]` so that debounce delays elapse
//! instantly and deterministically.

use std::future::Future;
use std::time::Duration;

use tokio::task::LocalSet;
use tracing_subscriber::EnvFilter;

/// Run `future` to completion inside a fresh `LocalSet`.
pub async fn run_local<F: Future>(future: F) -> F::Output {
    LocalSet::new().run_until(future).await
}

/// Let `duration` of (paused) time pass, then give spawned passes a few
/// scheduler turns to deliver their results.
pub async fn settle(duration: Duration) {
    tokio::time::sleep(duration).await;
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

/// Install a test-writer subscriber honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[tokio::test(start_paused = true)]
    async fn test_settle_runs_spawned_local_tasks() {
        init_tracing();
        let done = Rc::new(Cell::new(false));
        let flag = Rc::clone(&done);
        run_local(async move {
            tokio::task::spawn_local(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                flag.set(true);
            });
            settle(Duration::from_millis(99)).await;
            assert!(!done.get());
            settle(Duration::from_millis(1)).await;
            assert!(done.get());
        })
        .await;
    }
}
