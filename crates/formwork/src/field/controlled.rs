//! Controller wiring for controlled fields.
//!
//! Controllers are fanned in through a [`StatefulArrayReducer`]; whenever one
//! of them commits, the control function sees every controller's state and
//! the field's own state and decides what, if anything, to change.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use formwork_core::{Message, Stateful, StatefulArrayReducer, SubscriptionSet, Validity};

use super::engine::{Control, FieldCore, FieldValue};
use super::state::FieldState;

/// Changes a control function asks a field to make.
///
/// - `value` alone re-validates that value through the field's suite.
/// - `validity` and/or `messages` are committed as given, without running
///   the suite.
/// - `exclude` alone only toggles exclusion, on excludable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlledUpdate<V> {
    pub value: Option<V>,
    pub validity: Option<Validity>,
    pub messages: Option<Vec<Message>>,
    pub exclude: Option<bool>,
}

impl<V> ControlledUpdate<V> {
    pub fn new() -> Self {
        Self {
            value: None,
            validity: None,
            messages: None,
            exclude: None,
        }
    }

    pub fn value(value: V) -> Self {
        Self::new().with_value(value)
    }

    pub fn exclude(exclude: bool) -> Self {
        Self::new().with_exclude(exclude)
    }

    #[must_use]
    pub fn with_value(mut self, value: V) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn with_validity(mut self, validity: Validity) -> Self {
        self.validity = Some(validity);
        self
    }

    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = Some(messages);
        self
    }

    #[must_use]
    pub fn with_exclude(mut self, exclude: bool) -> Self {
        self.exclude = Some(exclude);
        self
    }
}

impl<V> Default for ControlledUpdate<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives a field update from controller states.
///
/// Returning `None` leaves the field untouched.
pub trait ControlFn<C, V> {
    fn control(&self, controllers: &[C], state: &FieldState<V>) -> Option<ControlledUpdate<V>>;
}

impl<C, V, F> ControlFn<C, V> for F
where
    F: Fn(&[C], &FieldState<V>) -> Option<ControlledUpdate<V>>,
{
    fn control(&self, controllers: &[C], state: &FieldState<V>) -> Option<ControlledUpdate<V>> {
        self(controllers, state)
    }
}

/// The controllers of a controlled field and the function that applies them.
pub struct ControlledBy<C, V> {
    pub controllers: Vec<Rc<dyn Stateful<State = C>>>,
    pub control_fn: Rc<dyn ControlFn<C, V>>,
}

impl<C, V> ControlledBy<C, V> {
    pub fn new(
        controllers: Vec<Rc<dyn Stateful<State = C>>>,
        control_fn: impl ControlFn<C, V> + 'static,
    ) -> Self {
        Self {
            controllers,
            control_fn: Rc::new(control_fn),
        }
    }
}

impl<C, V> fmt::Debug for ControlledBy<C, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlledBy")
            .field("controllers", &self.controllers.len())
            .finish_non_exhaustive()
    }
}

struct ControlLink<C, V> {
    reducer: StatefulArrayReducer<C>,
    control_fn: Rc<dyn ControlFn<C, V>>,
    on_change: RefCell<SubscriptionSet>,
}

impl<C: Clone + 'static, V: FieldValue> Control<V> for ControlLink<C, V> {
    fn apply(&self, field: &FieldCore<V>) {
        field.run_control(&self.reducer.states(), self.control_fn.as_ref());
    }

    fn dispose(&self) {
        self.on_change.borrow_mut().unsubscribe_all();
        self.reducer.dispose();
    }
}

/// Subscribe `field` to its controllers and apply the initial control pass.
pub(crate) fn attach<C: Clone + 'static, V: FieldValue>(
    field: &FieldCore<V>,
    controlled_by: ControlledBy<C, V>,
) {
    let ControlledBy {
        controllers,
        control_fn,
    } = controlled_by;
    let reducer = StatefulArrayReducer::new(&controllers);

    let weak = field.downgrade();
    let control = Rc::clone(&control_fn);
    let subscription = reducer.subscribe(move |states| {
        if let Some(field) = weak.upgrade() {
            field.run_control(states, control.as_ref());
        }
    });
    let mut on_change = SubscriptionSet::new();
    on_change.push(subscription);

    let link = Rc::new(ControlLink {
        reducer,
        control_fn,
        on_change: RefCell::new(on_change),
    });
    field.set_control(link.clone());
    link.apply(field);
}
