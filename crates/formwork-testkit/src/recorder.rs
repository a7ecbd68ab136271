//! Snapshot recording

use std::cell::RefCell;
use std::rc::Rc;

use formwork_core::{Snapshot, StateView, Stateful, Subscription, Validity};

/// Captures every snapshot a node commits after the recorder is attached.
///
/// The subscription is released when the recorder is dropped.
pub struct StateRecorder<S> {
    snapshots: Rc<RefCell<Vec<Snapshot<S>>>>,
    subscription: Option<Subscription>,
}

impl<S: Clone + 'static> StateRecorder<S> {
    pub fn attach<N: Stateful<State = S> + ?Sized>(node: &N) -> Self {
        let snapshots = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&snapshots);
        let subscription = node.subscribe_to_state(Box::new(move |snapshot: &Snapshot<S>| {
            sink.borrow_mut().push(snapshot.clone());
        }));
        Self {
            snapshots,
            subscription: Some(subscription),
        }
    }

    pub fn snapshots(&self) -> Vec<Snapshot<S>> {
        self.snapshots.borrow().clone()
    }

    pub fn states(&self) -> Vec<S> {
        self.snapshots
            .borrow()
            .iter()
            .map(|snapshot| snapshot.state().clone())
            .collect()
    }

    pub fn last(&self) -> Option<Snapshot<S>> {
        self.snapshots.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.snapshots.borrow_mut().clear();
    }
}

impl<S: StateView + Clone + 'static> StateRecorder<S> {
    /// Validity of each recorded commit, in order.
    pub fn validities(&self) -> Vec<Validity> {
        self.snapshots
            .borrow()
            .iter()
            .map(|snapshot| snapshot.state().validity())
            .collect()
    }
}

impl<S> Drop for StateRecorder<S> {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_core::{ChangedProperties, Diffable, Property, StateContainer};

    #[derive(Debug, Clone, PartialEq)]
    struct Probe(Validity);

    impl Diffable for Probe {
        fn changed_properties(&self, previous: &Self) -> ChangedProperties {
            let mut changed = ChangedProperties::new();
            changed.track(Property::Validity, &self.0, &previous.0);
            changed
        }
    }

    impl StateView for Probe {
        fn validity(&self) -> Validity {
            self.0
        }
    }

    struct Node(StateContainer<Probe>);

    impl Stateful for Node {
        type State = Probe;

        fn state(&self) -> Probe {
            self.0.state()
        }

        fn subscribe_to_state(
            &self,
            callback: formwork_core::StateCallback<Probe>,
        ) -> Subscription {
            self.0.subscribe_to_state(callback)
        }
    }

    #[test]
    fn test_records_commits_until_dropped() {
        let node = Node(StateContainer::new(Probe(Validity::Valid)));
        let recorder = StateRecorder::attach(&node);
        node.0.set_state(Probe(Validity::Pending));
        node.0.set_state(Probe(Validity::Invalid));
        assert_eq!(recorder.validities(), vec![Validity::Pending, Validity::Invalid]);

        drop(recorder);
        assert_eq!(node.0.subscriber_count(), 0);
    }
}
