//! The engine every field variant is a handle to.
//!
//! A field owns its container, its validator suite and at most one in-flight
//! async pass. Every re-validating path goes through
//! [`FieldCore::validate_and_commit`], which replaces the in-flight pass
//! before committing so that a mutation triggered by the commit itself
//! cancels the pass it would otherwise race with.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::Serialize;

use formwork_core::errors::ensure_name;
use formwork_core::{
    member_value, CancelableDelayedTask, CombinedValidationResult, CombinedValidatorSuite,
    MemberCallback, MemberState, Result, Snapshot, StateCallback, StateContainer, Subscription,
    ValidationResult,
};

use super::config::FieldConfig;
use super::controlled::{ControlFn, ControlledUpdate};
use super::state::FieldState;
use crate::in_flight::InFlight;

/// Bounds every field value satisfies.
pub trait FieldValue: Clone + PartialEq + Serialize + 'static {}

impl<T: Clone + PartialEq + Serialize + 'static> FieldValue for T {}

/// Type-erased link from a controlled field to its controllers.
pub(crate) trait Control<V> {
    /// Run the control function against the current controller states.
    fn apply(&self, field: &FieldCore<V>);

    fn dispose(&self);
}

struct FieldInner<V> {
    name: String,
    default_value: V,
    default_exclude: bool,
    excludable: bool,
    suite: CombinedValidatorSuite<V>,
    container: StateContainer<FieldState<V>>,
    in_flight: InFlight,
    control: RefCell<Option<Rc<dyn Control<V>>>>,
}

impl<V> Drop for FieldInner<V> {
    fn drop(&mut self) {
        if let Some(control) = self.control.get_mut().take() {
            control.dispose();
        }
    }
}

pub(crate) struct FieldCore<V> {
    inner: Rc<FieldInner<V>>,
}

impl<V> Clone for FieldCore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

pub(crate) struct WeakFieldCore<V>(Weak<FieldInner<V>>);

impl<V> WeakFieldCore<V> {
    pub(crate) fn upgrade(&self) -> Option<FieldCore<V>> {
        self.0.upgrade().map(|inner| FieldCore { inner })
    }
}

impl<V: FieldValue> FieldCore<V> {
    pub(crate) fn new(config: FieldConfig<V>, excludable: bool) -> Result<Self> {
        let (name, default_value, validation, exclude) = config.into_parts();
        ensure_name(&name)?;
        let suite = CombinedValidatorSuite::new(validation)?;
        let default_exclude = excludable && exclude;

        let CombinedValidationResult {
            sync_result,
            observable_result,
        } = suite.validate(&default_value);
        let initial = FieldState::pristine(
            sync_result.value,
            sync_result.validity,
            sync_result.messages,
            default_exclude,
        );

        let core = Self {
            inner: Rc::new(FieldInner {
                name,
                default_value,
                default_exclude,
                excludable,
                suite,
                container: StateContainer::new(initial),
                in_flight: InFlight::default(),
                control: RefCell::new(None),
            }),
        };
        if let Some(task) = observable_result {
            core.schedule(task);
        }
        Ok(core)
    }

    pub(crate) fn downgrade(&self) -> WeakFieldCore<V> {
        WeakFieldCore(Rc::downgrade(&self.inner))
    }

    pub(crate) fn name(&self) -> &str {
        &self.inner.name
    }

    pub(crate) fn state(&self) -> FieldState<V> {
        self.inner.container.state()
    }

    pub(crate) fn snapshot(&self) -> Snapshot<FieldState<V>> {
        self.inner.container.snapshot()
    }

    pub(crate) fn subscribe_to_state(&self, callback: StateCallback<FieldState<V>>) -> Subscription {
        self.inner.container.subscribe_to_state(callback)
    }

    pub(crate) fn member_state(&self) -> MemberState {
        self.inner
            .container
            .with_state(|state| member_view(&self.inner.name, state))
    }

    pub(crate) fn subscribe_to_member_state(&self, callback: MemberCallback) -> Subscription {
        let name = self.inner.name.clone();
        self.inner
            .container
            .subscribe_to_state(move |snapshot| callback(&member_view(&name, snapshot)))
    }

    /// Whether an async pass is scheduled or running.
    pub(crate) fn is_validating(&self) -> bool {
        self.inner.in_flight.is_active()
    }

    // ------------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------------

    pub(crate) fn set_value(&self, value: V) {
        self.validate_and_commit(&value, |state| state.modified = true);
    }

    pub(crate) fn focus(&self) {
        self.update(|state| state.focused = true);
    }

    pub(crate) fn blur(&self) {
        self.update(|state| {
            state.focused = false;
            state.visited = true;
        });
    }

    pub(crate) fn visit(&self) {
        self.update(|state| state.visited = true);
    }

    pub(crate) fn set_submitted(&self) {
        self.update(|state| state.submitted = true);
    }

    pub(crate) fn set_exclude(&self, exclude: bool) {
        self.update(|state| state.exclude = exclude);
    }

    pub(crate) fn reset(&self) {
        let default_exclude = self.inner.default_exclude;
        self.validate_and_commit(&self.inner.default_value, |state| {
            state.focused = false;
            state.visited = false;
            state.modified = false;
            state.submitted = false;
            state.exclude = default_exclude;
        });

        let control = self.inner.control.borrow().clone();
        if let Some(control) = control {
            control.apply(self);
        }
    }

    pub(crate) fn dispose(&self) {
        self.cancel_in_flight();
        let control = self.inner.control.borrow_mut().take();
        if let Some(control) = control {
            control.dispose();
        }
    }

    // ------------------------------------------------------------------------
    // Control
    // ------------------------------------------------------------------------

    pub(crate) fn set_control(&self, control: Rc<dyn Control<V>>) {
        *self.inner.control.borrow_mut() = Some(control);
    }

    pub(crate) fn run_control<C>(&self, controllers: &[C], control_fn: &dyn ControlFn<C, V>) {
        let current = self.state();
        if let Some(update) = control_fn.control(controllers, &current) {
            self.apply_update(update);
        }
    }

    fn apply_update(&self, update: ControlledUpdate<V>) {
        let ControlledUpdate {
            value,
            validity,
            messages,
            exclude,
        } = update;

        let exclude = match exclude {
            Some(_) if !self.inner.excludable => {
                tracing::debug!(
                    field = %self.inner.name,
                    "ignoring controlled exclusion on a non-excludable field"
                );
                None
            }
            other => other,
        };

        if validity.is_some() || messages.is_some() {
            self.cancel_in_flight();
            self.update(|state| {
                if let Some(value) = value {
                    state.value = value;
                }
                if let Some(validity) = validity {
                    state.validity = validity;
                }
                if let Some(messages) = messages {
                    state.messages = messages;
                }
                if let Some(exclude) = exclude {
                    state.exclude = exclude;
                }
            });
        } else if let Some(value) = value {
            self.validate_and_commit(&value, |state| {
                if let Some(exclude) = exclude {
                    state.exclude = exclude;
                }
            });
        } else if let Some(exclude) = exclude {
            self.update(|state| state.exclude = exclude);
        }
    }

    // ------------------------------------------------------------------------
    // Validation pipeline
    // ------------------------------------------------------------------------

    fn validate_and_commit(&self, value: &V, apply: impl FnOnce(&mut FieldState<V>)) {
        self.cancel_in_flight();
        let CombinedValidationResult {
            sync_result,
            observable_result,
        } = self.inner.suite.validate(value);
        if let Some(task) = observable_result {
            self.schedule(task);
        }

        let mut next = self.state();
        next.value = sync_result.value;
        next.validity = sync_result.validity;
        next.messages = sync_result.messages;
        apply(&mut next);
        self.commit(next);
    }

    fn schedule(&self, task: CancelableDelayedTask<ValidationResult<V>>) {
        tracing::debug!(
            field = %self.inner.name,
            delay = ?task.delay(),
            "async validation scheduled"
        );
        let weak = self.downgrade();
        let subscription = task.subscribe(move |result| {
            if let Some(field) = weak.upgrade() {
                field.commit_async(result);
            }
        });
        self.inner.in_flight.store(subscription);
    }

    fn commit_async(&self, result: ValidationResult<V>) {
        self.inner.in_flight.finish();
        tracing::debug!(
            field = %self.inner.name,
            validity = %result.validity,
            "async validation committed"
        );
        self.update(|state| {
            state.validity = result.validity;
            state.messages = result.messages;
        });
    }

    fn cancel_in_flight(&self) {
        self.inner.in_flight.cancel(&self.inner.name);
    }

    fn update(&self, f: impl FnOnce(&mut FieldState<V>)) {
        let mut next = self.state();
        f(&mut next);
        self.commit(next);
    }

    fn commit(&self, next: FieldState<V>) {
        tracing::trace!(
            field = %self.inner.name,
            validity = %next.validity,
            "field commit"
        );
        self.inner.container.set_state(next);
    }
}

fn member_view<V: Serialize>(name: &str, state: &FieldState<V>) -> MemberState {
    MemberState::new(member_value(name, &state.value), state.validity, state.exclude)
}
