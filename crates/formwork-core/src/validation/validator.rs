//! Sync and async validators.
//!
//! A validator pairs a predicate with optional messages for each outcome.
//! Predicates are expected to be total; when one panics (or a fallible async
//! predicate returns an error) the validator reports Invalid with the failure
//! text as its message instead of unwinding through the node graph.

use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::FutureExt;

use crate::errors::PredicateError;
use crate::validity::{Message, Validity};

type SyncPredicate<V> = Rc<dyn Fn(&V) -> bool>;
type AsyncPredicate<V> = Rc<dyn Fn(V) -> LocalBoxFuture<'static, Result<bool, PredicateError>>>;

/// Outcome of a single validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorResult {
    pub validity: Validity,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Messages {
    valid: Option<String>,
    invalid: Option<String>,
}

impl Messages {
    fn result(&self, outcome: Result<bool, PredicateError>) -> ValidatorResult {
        match outcome {
            Ok(true) => ValidatorResult {
                validity: Validity::Valid,
                message: self.valid.as_ref().map(Message::valid),
            },
            Ok(false) => ValidatorResult {
                validity: Validity::Invalid,
                message: self.invalid.as_ref().map(Message::invalid),
            },
            Err(error) => {
                tracing::warn!(%error, "validator predicate failed");
                ValidatorResult {
                    validity: Validity::Invalid,
                    message: Some(Message::invalid(error.to_string())),
                }
            }
        }
    }
}

/// A synchronous validator.
pub struct Validator<V> {
    predicate: SyncPredicate<V>,
    messages: Messages,
}

impl<V: 'static> Validator<V> {
    pub fn new(predicate: impl Fn(&V) -> bool + 'static) -> Self {
        Self {
            predicate: Rc::new(predicate),
            messages: Messages::default(),
        }
    }

    #[must_use]
    pub fn with_invalid_message(mut self, message: impl Into<String>) -> Self {
        self.messages.invalid = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_valid_message(mut self, message: impl Into<String>) -> Self {
        self.messages.valid = Some(message.into());
        self
    }

    pub fn validate(&self, value: &V) -> ValidatorResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.predicate)(value)))
            .map_err(|payload| PredicateError::from_panic(payload.as_ref()));
        self.messages.result(outcome)
    }
}

impl<V> Clone for Validator<V> {
    fn clone(&self) -> Self {
        Self {
            predicate: Rc::clone(&self.predicate),
            messages: self.messages.clone(),
        }
    }
}

impl<V> fmt::Debug for Validator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("valid_message", &self.messages.valid)
            .field("invalid_message", &self.messages.invalid)
            .finish_non_exhaustive()
    }
}

/// An asynchronous validator.
pub struct AsyncValidator<V> {
    predicate: AsyncPredicate<V>,
    messages: Messages,
}

impl<V: 'static> AsyncValidator<V> {
    /// Create a validator from an infallible async predicate.
    pub fn new<F, Fut>(predicate: F) -> Self
    where
        F: Fn(V) -> Fut + 'static,
        Fut: Future<Output = bool> + 'static,
    {
        Self {
            predicate: Rc::new(move |value| {
                predicate(value)
                    .map(Ok::<bool, PredicateError>)
                    .boxed_local()
            }),
            messages: Messages::default(),
        }
    }

    /// Create a validator from an async predicate that may fail.
    ///
    /// An `Err` is reported as Invalid with the error's text as message.
    pub fn fallible<F, Fut, E>(predicate: F) -> Self
    where
        F: Fn(V) -> Fut + 'static,
        Fut: Future<Output = Result<bool, E>> + 'static,
        E: fmt::Display,
    {
        Self {
            predicate: Rc::new(move |value| {
                predicate(value)
                    .map(|outcome| outcome.map_err(PredicateError::failed))
                    .boxed_local()
            }),
            messages: Messages::default(),
        }
    }

    #[must_use]
    pub fn with_invalid_message(mut self, message: impl Into<String>) -> Self {
        self.messages.invalid = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_valid_message(mut self, message: impl Into<String>) -> Self {
        self.messages.valid = Some(message.into());
        self
    }

    /// Run the predicate against an owned copy of the value.
    pub fn validate(&self, value: V) -> LocalBoxFuture<'static, ValidatorResult> {
        let predicate = Rc::clone(&self.predicate);
        let messages = self.messages.clone();
        async move {
            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| predicate(value))) {
                Ok(future) => AssertUnwindSafe(future)
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|payload| Err(PredicateError::from_panic(payload.as_ref()))),
                Err(payload) => Err(PredicateError::from_panic(payload.as_ref())),
            };
            messages.result(outcome)
        }
        .boxed_local()
    }
}

impl<V> Clone for AsyncValidator<V> {
    fn clone(&self) -> Self {
        Self {
            predicate: Rc::clone(&self.predicate),
            messages: self.messages.clone(),
        }
    }
}

impl<V> fmt::Debug for AsyncValidator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncValidator")
            .field("valid_message", &self.messages.valid)
            .field("invalid_message", &self.messages.invalid)
            .finish_non_exhaustive()
    }
}
