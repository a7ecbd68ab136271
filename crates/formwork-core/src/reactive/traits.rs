//! Capability traits implemented by node handles.
//!
//! Each node kind implements the subset relevant to it instead of inheriting
//! from a base class:
//!
//! | Trait | Field | Excludable field | Group | Adapter | Form |
//! |-------|:-----:|:----------------:|:-----:|:-------:|:----:|
//! | [`Stateful`], [`Nameable`], [`Disposable`] | ✓ | ✓ | ✓ | ✓ | ✓ |
//! | [`Member`] | ✓ | ✓ | ✓ | ✓ | |
//! | [`Resettable`] | ✓ | ✓ | field groups | | ✓ |
//! | [`Interactable`] | ✓ | ✓ | | | |
//! | [`Excludable`] | | ✓ | | | |

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use super::container::{ChangedProperties, Diffable, Property, Snapshot};
use super::subscription::Subscription;
use crate::validity::Validity;

/// Callback invoked with every committed snapshot.
pub type StateCallback<S> = Box<dyn Fn(&Snapshot<S>)>;

/// Callback invoked with every committed member state.
pub type MemberCallback = Box<dyn Fn(&MemberState)>;

/// A node with an observable state snapshot.
pub trait Stateful {
    type State: Clone + 'static;

    /// Clone of the current state.
    fn state(&self) -> Self::State;

    /// Observe every subsequent commit.
    fn subscribe_to_state(&self, callback: StateCallback<Self::State>) -> Subscription;
}

pub trait Nameable {
    fn name(&self) -> &str;
}

pub trait Excludable {
    fn set_exclude(&self, exclude: bool);
}

pub trait Resettable {
    /// Restore the construction-time state. Subscriptions are kept.
    fn reset(&self);
}

pub trait Interactable {
    fn focus(&self);
    fn blur(&self);
    fn visit(&self);
    fn set_submitted(&self);
}

pub trait Disposable {
    /// Cancel in-flight work and release upstream subscriptions.
    fn dispose(&self);
}

/// The part of a state that parents aggregate over.
pub trait StateView {
    fn validity(&self) -> Validity;

    fn is_excluded(&self) -> bool {
        false
    }
}

/// Type-erased view of a node as seen by the composite that contains it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberState {
    pub value: Value,
    pub validity: Validity,
    pub exclude: bool,
}

impl MemberState {
    pub fn new(value: Value, validity: Validity, exclude: bool) -> Self {
        Self {
            value,
            validity,
            exclude,
        }
    }
}

impl Diffable for MemberState {
    fn changed_properties(&self, previous: &Self) -> ChangedProperties {
        let mut changed = ChangedProperties::new();
        changed.track(Property::Value, &self.value, &previous.value);
        changed.track(Property::Validity, &self.validity, &previous.validity);
        changed.track(Property::Exclude, &self.exclude, &previous.exclude);
        changed
    }
}

impl StateView for MemberState {
    fn validity(&self) -> Validity {
        self.validity
    }

    fn is_excluded(&self) -> bool {
        self.exclude
    }
}

/// A node that can take part in a group, multi-source adapter or form.
pub trait Member: Nameable {
    fn member_state(&self) -> MemberState;

    fn subscribe_to_member_state(&self, callback: MemberCallback) -> Subscription;
}

/// Convert a typed value into the JSON value parents aggregate.
///
/// Values that cannot be represented (for example maps with non-string keys)
/// become `null` and are logged.
pub fn member_value<V: Serialize>(node: &str, value: &V) -> Value {
    match serde_json::to_value(value) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(node, %error, "member value is not representable as JSON");
            Value::Null
        }
    }
}

/// Trait-object handles for any cloneable node.
pub trait NodeExt: Clone + 'static {
    /// Shared `Member` handle for composite constructors.
    fn as_member(&self) -> Rc<dyn Member>
    where
        Self: Member,
    {
        Rc::new(self.clone())
    }

    /// Shared `Stateful` handle for adapter and controller constructors.
    fn as_stateful(&self) -> Rc<dyn Stateful<State = <Self as Stateful>::State>>
    where
        Self: Stateful,
    {
        Rc::new(self.clone())
    }
}

impl<T: Clone + 'static> NodeExt for T {}

/// [`Stateful`] view over a [`Member`], for mixing node kinds in one
/// adapter or controller list.
#[derive(Clone)]
pub struct MemberStateful(pub Rc<dyn Member>);

impl Stateful for MemberStateful {
    type State = MemberState;

    fn state(&self) -> MemberState {
        self.0.member_state()
    }

    fn subscribe_to_state(&self, callback: StateCallback<MemberState>) -> Subscription {
        let previous = RefCell::new(self.0.member_state());
        self.0.subscribe_to_member_state(Box::new(move |state| {
            let changed = state.changed_properties(&previous.borrow());
            *previous.borrow_mut() = state.clone();
            callback(&Snapshot::with_changes(state.clone(), changed));
        }))
    }
}

impl Nameable for MemberStateful {
    fn name(&self) -> &str {
        self.0.name()
    }
}
