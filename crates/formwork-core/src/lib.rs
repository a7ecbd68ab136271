//! Formwork Core - reactive state and validation foundation
//!
//! The building blocks every Formwork node is made of. Nothing here knows
//! about fields, groups or forms; those live in the `formwork` crate.
//!
//! # Layers
//!
//! ## Vocabulary
//! - `Validity`: `Invalid < Pending < Valid`, combined by taking the minimum
//! - `Message`: one diagnostic tagged with the validity it reports
//!
//! ## Reactive primitives
//! - `StateContainer<S>`: immutable snapshots with per-property change sets
//! - `SubscriberList<T>` / `Subscription`: synchronous, ordered notification
//! - Capability traits (`Stateful`, `Member`, `Resettable`, ...)
//!
//! ## Validation pipeline
//! - `Validator` / `AsyncValidator` and their templates
//! - `CombinedValidatorSuite`: sync pass, then debounced async pass
//! - `CancelableDelayedTask`: the delayed, cancelable unit of async work
//!
//! ## Fan-in
//! - `ValueReducer`, `ValidityReducer`, `StatefulArrayReducer`

#![allow(missing_docs)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Unified error handling
pub mod errors;

/// State containers, subscriptions and capability traits
pub mod reactive;

/// Value, validity and array reducers
pub mod reducer;

/// Delayed, cancelable async work
pub mod task;

/// Validators, templates and suites
pub mod validation;

/// Validity and message vocabulary
pub mod validity;

pub use errors::{ConfigError, PredicateError, Result};
pub use reactive::{
    member_value, ChangedProperties, Diffable, Disposable, Excludable, Interactable, Member,
    MemberCallback, MemberState, MemberStateful, Nameable, NodeExt, Property, Resettable,
    Snapshot, StateCallback, StateContainer, StateView, Stateful, SubscriberList, Subscription,
    SubscriptionSet,
};
pub use reducer::{StatefulArrayReducer, ValidityReducer, ValueReducer};
pub use task::{delay_from_millis, CancelableDelayedTask, TaskSubscription};
pub use validation::{
    AsyncValidator, AsyncValidatorSuite, AsyncValidatorTemplate, CombinedValidationResult,
    CombinedValidatorSuite, SuiteConfig, ValidationResult, Validator, ValidatorResult,
    ValidatorSuite, ValidatorTemplate,
};
pub use validity::{Message, Validity, ValiditySource};
