//! CancelableDelayedTask - the unit of asynchronous work
//!
//! A single-shot asynchronous computation that waits for a delay, runs its
//! producer, and hands the result to a callback, unless it was cancelled
//! first. Cancellation is a normal operation: it stops the timer, aborts a
//! running producer, and guarantees that a result which has already been
//! produced is never delivered.
//!
//! Tasks are spawned with [`tokio::task::spawn_local`], so subscribing must
//! happen inside a [`tokio::task::LocalSet`].

use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::errors::{ConfigError, Result};

type Producer<T> = Box<dyn FnOnce() -> LocalBoxFuture<'static, T>>;

/// Convert a millisecond delay, rejecting negative values.
pub fn delay_from_millis(delay_ms: i64) -> Result<Duration> {
    u64::try_from(delay_ms)
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::negative_delay(delay_ms))
}

/// A deferred, cancelable asynchronous computation.
pub struct CancelableDelayedTask<T> {
    producer: Producer<T>,
    delay: Duration,
}

impl<T: 'static> CancelableDelayedTask<T> {
    /// Create a task that runs `producer` after `delay`.
    ///
    /// A zero delay runs the producer on the next scheduler turn.
    pub fn new<F, Fut>(producer: F, delay: Duration) -> Self
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = T> + 'static,
    {
        Self {
            producer: Box::new(move || producer().boxed_local()),
            delay,
        }
    }

    /// Create a task from a millisecond delay.
    ///
    /// Fails with [`ConfigError::NegativeDelay`] when `delay_ms < 0`.
    pub fn with_delay_millis<F, Fut>(producer: F, delay_ms: i64) -> Result<Self>
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = T> + 'static,
    {
        Ok(Self::new(producer, delay_from_millis(delay_ms)?))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Start the timer and deliver the result to `on_result`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a `LocalSet`, like `spawn_local` itself.
    pub fn subscribe(self, on_result: impl FnOnce(T) + 'static) -> TaskSubscription {
        self.spawn(Some(Box::new(on_result)))
    }

    /// Start the timer without observing the result.
    pub fn start(self) -> TaskSubscription {
        self.spawn(None)
    }

    fn spawn(self, on_result: Option<Box<dyn FnOnce(T)>>) -> TaskSubscription {
        let cancelled = Rc::new(Cell::new(false));
        let flag = Rc::clone(&cancelled);
        let Self { producer, delay } = self;

        let handle = tokio::task::spawn_local(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if flag.get() {
                return;
            }
            let output = producer().await;
            if flag.get() {
                tracing::trace!("discarding result of cancelled task");
                return;
            }
            if let Some(on_result) = on_result {
                on_result(output);
            }
        });

        TaskSubscription {
            cancelled,
            handle: Some(handle),
        }
    }
}

impl<T> fmt::Debug for CancelableDelayedTask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelableDelayedTask")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Handle to a started [`CancelableDelayedTask`].
///
/// Dropping the handle detaches the task; it keeps running and still
/// delivers its result.
pub struct TaskSubscription {
    cancelled: Rc<Cell<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl TaskSubscription {
    /// Prevent the timer from firing and any result from being delivered.
    pub fn unsubscribe_and_cancel(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        self.cancelled.set(true);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Whether the task has run to completion (or been aborted).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl fmt::Debug for TaskSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSubscription")
            .field("cancelled", &self.cancelled.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tokio::task::LocalSet;

    #[test]
    fn test_negative_delay_is_rejected() {
        let result = CancelableDelayedTask::with_delay_millis(|| async { 1 }, -1);
        assert_eq!(result.err(), Some(ConfigError::negative_delay(-1)));
        assert_eq!(delay_from_millis(250), Ok(Duration::from_millis(250)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivers_after_delay() {
        LocalSet::new()
            .run_until(async {
                let received = Rc::new(RefCell::new(None));
                let sink = Rc::clone(&received);
                let task = CancelableDelayedTask::new(|| async { 42 }, Duration::from_millis(100));
                let _sub = task.subscribe(move |v| *sink.borrow_mut() = Some(v));

                tokio::time::sleep(Duration::from_millis(50)).await;
                assert_eq!(*received.borrow(), None);

                tokio::time::sleep(Duration::from_millis(60)).await;
                assert_eq!(*received.borrow(), Some(42));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_timer_fires() {
        LocalSet::new()
            .run_until(async {
                let ran = Rc::new(Cell::new(false));
                let producer_ran = Rc::clone(&ran);
                let delivered = Rc::new(Cell::new(false));
                let sink = Rc::clone(&delivered);

                let task = CancelableDelayedTask::new(
                    move || async move {
                        producer_ran.set(true);
                    },
                    Duration::from_millis(100),
                );
                let sub = task.subscribe(move |()| sink.set(true));
                tokio::time::sleep(Duration::from_millis(10)).await;
                sub.unsubscribe_and_cancel();

                tokio::time::sleep(Duration::from_millis(500)).await;
                assert!(!ran.get());
                assert!(!delivered.get());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_producer_in_flight() {
        LocalSet::new()
            .run_until(async {
                let delivered = Rc::new(Cell::new(false));
                let sink = Rc::clone(&delivered);

                let task = CancelableDelayedTask::new(
                    || async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        "slow"
                    },
                    Duration::ZERO,
                );
                let sub = task.subscribe(move |_| sink.set(true));
                tokio::time::sleep(Duration::from_millis(50)).await;
                assert!(!sub.is_finished());
                sub.unsubscribe_and_cancel();

                tokio::time::sleep(Duration::from_millis(200)).await;
                assert!(!delivered.get());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_defers_to_next_turn() {
        LocalSet::new()
            .run_until(async {
                let delivered = Rc::new(Cell::new(false));
                let sink = Rc::clone(&delivered);
                let _sub = CancelableDelayedTask::new(|| async {}, Duration::ZERO)
                    .subscribe(move |()| sink.set(true));

                assert!(!delivered.get());
                tokio::task::yield_now().await;
                tokio::time::sleep(Duration::from_millis(1)).await;
                assert!(delivered.get());
            })
            .await;
    }
}
