//! Async validators with observable behaviour
//!
//! Each constructor returns the validator together with an
//! [`InvocationCounter`] so tests can tell how many passes actually reached
//! the predicate, which is how debouncing is observed.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use formwork_core::AsyncValidator;

/// Shared count of predicate invocations.
#[derive(Debug, Clone, Default)]
pub struct InvocationCounter(Rc<Cell<usize>>);

impl InvocationCounter {
    pub fn get(&self) -> usize {
        self.0.get()
    }

    fn increment(&self) {
        self.0.set(self.0.get() + 1);
    }
}

/// A predicate that resolves after `latency` of (paused) time.
pub fn timed_validator<V: 'static>(
    latency: Duration,
    predicate: impl Fn(&V) -> bool + 'static,
) -> (AsyncValidator<V>, InvocationCounter) {
    let counter = InvocationCounter::default();
    let calls = counter.clone();
    let predicate = Rc::new(predicate);
    let validator = AsyncValidator::new(move |value: V| {
        calls.increment();
        let predicate = Rc::clone(&predicate);
        async move {
            tokio::time::sleep(latency).await;
            predicate(&value)
        }
    });
    (validator, counter)
}

/// A predicate that always fails with `error`.
pub fn failing_validator<V: 'static>(
    error: &'static str,
) -> (AsyncValidator<V>, InvocationCounter) {
    let counter = InvocationCounter::default();
    let calls = counter.clone();
    let validator = AsyncValidator::fallible(move |_value: V| {
        calls.increment();
        async move { Err::<bool, _>(error) }
    });
    (validator, counter)
}

/// A predicate that panics once polled.
pub fn panicking_validator<V: 'static>(
    message: &'static str,
) -> (AsyncValidator<V>, InvocationCounter) {
    let counter = InvocationCounter::default();
    let calls = counter.clone();
    let validator = AsyncValidator::new(move |_value: V| {
        calls.increment();
        async move {
            tokio::task::yield_now().await;
            explode(message)
        }
    });
    (validator, counter)
}

fn explode(message: &str) -> bool {
    panic!("{message}")
}

/// A predicate that never resolves; its pass stays pending until cancelled.
pub fn never_validator<V: 'static>() -> (AsyncValidator<V>, InvocationCounter) {
    let counter = InvocationCounter::default();
    let calls = counter.clone();
    let validator = AsyncValidator::new(move |_value: V| {
        calls.increment();
        futures::future::pending::<bool>()
    });
    (validator, counter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_core::Validity;

    #[tokio::test(start_paused = true)]
    async fn test_timed_validator_counts_and_waits() {
        let (validator, counter) = timed_validator(Duration::from_millis(30), |v: &i32| *v > 0);
        let result = validator
            .with_invalid_message("must be positive")
            .validate(-1)
            .await;
        assert_eq!(counter.get(), 1);
        assert_eq!(result.validity, Validity::Invalid);
    }

    #[tokio::test]
    async fn test_failing_validator_reports_error_text() {
        let (validator, _) = failing_validator::<String>("service unavailable");
        let result = validator.validate(String::new()).await;
        assert_eq!(result.validity, Validity::Invalid);
        assert_eq!(result.message.map(|m| m.text).as_deref(), Some("service unavailable"));
    }
}
