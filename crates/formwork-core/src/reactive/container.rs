//! StateContainer - an immutable snapshot holder with change broadcasting
//!
//! `StateContainer<S>` holds the current state of one node. Every commit
//! replaces the whole snapshot, records which named properties differ from
//! the previous one, and synchronously notifies subscribers in subscription
//! order. There is no queuing or coalescing: one commit, one notification
//! round.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;

use serde::Serialize;

use super::subscription::{SubscriberList, Subscription};

/// Named properties a snapshot may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Value,
    Validity,
    Messages,
    Focused,
    Visited,
    Modified,
    Submitted,
    Exclude,
    ValiditySource,
    IncludedMemberNames,
}

/// The set of properties that differ between two consecutive snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedProperties(BTreeSet<Property>);

impl ChangedProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `property` as changed if `current != previous`.
    pub fn track<T: PartialEq + ?Sized>(&mut self, property: Property, current: &T, previous: &T) {
        if current != previous {
            self.0.insert(property);
        }
    }

    pub fn insert(&mut self, property: Property) {
        self.0.insert(property);
    }

    pub fn contains(&self, property: Property) -> bool {
        self.0.contains(&property)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Property> + '_ {
        self.0.iter().copied()
    }
}

/// State types that can report which of their properties changed.
///
/// Implementations call [`ChangedProperties::track`] once per property.
pub trait Diffable {
    fn changed_properties(&self, previous: &Self) -> ChangedProperties;
}

/// A committed state together with its change set.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<S> {
    state: S,
    changed: ChangedProperties,
}

impl<S> Snapshot<S> {
    /// A snapshot with no recorded changes (the initial one).
    pub fn initial(state: S) -> Self {
        Self {
            state,
            changed: ChangedProperties::new(),
        }
    }

    pub fn with_changes(state: S, changed: ChangedProperties) -> Self {
        Self { state, changed }
    }

    /// Whether `property` differs from the previous snapshot.
    pub fn did_property_change(&self, property: Property) -> bool {
        self.changed.contains(property)
    }

    pub fn changed_properties(&self) -> &ChangedProperties {
        &self.changed
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S> Deref for Snapshot<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.state
    }
}

/// Holds one node's current snapshot and broadcasts new ones.
pub struct StateContainer<S> {
    current: RefCell<Snapshot<S>>,
    subscribers: SubscriberList<Snapshot<S>>,
}

impl<S: Diffable + Clone + 'static> StateContainer<S> {
    pub fn new(initial: S) -> Self {
        Self {
            current: RefCell::new(Snapshot::initial(initial)),
            subscribers: SubscriberList::new(),
        }
    }

    /// Clone of the current state.
    pub fn state(&self) -> S {
        self.current.borrow().state.clone()
    }

    /// Clone of the current snapshot, change set included.
    pub fn snapshot(&self) -> Snapshot<S> {
        self.current.borrow().clone()
    }

    /// Read the current state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.current.borrow().state)
    }

    /// Commit `next` and notify every subscriber.
    pub fn set_state(&self, next: S) {
        let snapshot = {
            let mut current = self.current.borrow_mut();
            let changed = next.changed_properties(&current.state);
            *current = Snapshot {
                state: next,
                changed,
            };
            current.clone()
        };
        self.subscribers.notify(&snapshot);
    }

    /// Clone the current state, apply `f`, commit the result.
    pub fn update(&self, f: impl FnOnce(&mut S)) {
        let mut next = self.state();
        f(&mut next);
        self.set_state(next);
    }

    pub fn subscribe_to_state(&self, callback: impl Fn(&Snapshot<S>) + 'static) -> Subscription {
        self.subscribers.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<S: fmt::Debug> fmt::Debug for StateContainer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateContainer")
            .field("state", &self.current.borrow().state)
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        value: u32,
        tags: Vec<String>,
    }

    impl Diffable for Counter {
        fn changed_properties(&self, previous: &Self) -> ChangedProperties {
            let mut changed = ChangedProperties::new();
            changed.track(Property::Value, &self.value, &previous.value);
            changed.track(Property::Messages, &self.tags, &previous.tags);
            changed
        }
    }

    fn counter(value: u32) -> Counter {
        Counter {
            value,
            tags: vec!["a".to_string()],
        }
    }

    #[test]
    fn test_initial_snapshot_reports_no_changes() {
        let container = StateContainer::new(counter(0));
        assert!(container.snapshot().changed_properties().is_empty());
        assert_eq!(container.state().value, 0);
    }

    #[test]
    fn test_commit_reports_changed_properties() {
        let container = StateContainer::new(counter(0));
        container.set_state(counter(1));

        let snapshot = container.snapshot();
        assert!(snapshot.did_property_change(Property::Value));
        assert!(!snapshot.did_property_change(Property::Messages));
    }

    #[test]
    fn test_structural_equality_for_composites() {
        let container = StateContainer::new(counter(0));
        container.update(|s| s.tags = vec!["a".to_string()]);
        assert!(!container.snapshot().did_property_change(Property::Messages));

        container.update(|s| s.tags.push("b".to_string()));
        assert!(container.snapshot().did_property_change(Property::Messages));
    }

    #[test]
    fn test_every_commit_notifies_once() {
        let container = StateContainer::new(counter(0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = container.subscribe_to_state(move |snapshot| {
            sink.borrow_mut()
                .push((snapshot.value, snapshot.did_property_change(Property::Value)));
        });

        container.set_state(counter(1));
        container.set_state(counter(1));
        container.set_state(counter(2));

        assert_eq!(*seen.borrow(), vec![(1, true), (1, false), (2, true)]);
    }

    #[test]
    fn test_subscriber_can_read_container_during_notification() {
        let container = Rc::new(StateContainer::new(counter(0)));
        let observed = Rc::new(RefCell::new(None));

        let reader = Rc::downgrade(&container);
        let sink = Rc::clone(&observed);
        let _sub = container.subscribe_to_state(move |_| {
            if let Some(container) = reader.upgrade() {
                *sink.borrow_mut() = Some(container.state().value);
            }
        });

        container.set_state(counter(5));
        assert_eq!(*observed.borrow(), Some(5));
    }
}
