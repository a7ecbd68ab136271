//! StatefulArrayReducer - fan-in of many same-typed nodes
//!
//! Keeps the latest state of each tracked node at its construction position
//! and re-emits the whole array whenever any of them commits. Controlled
//! fields and multi-source adapters are built on top of it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::reactive::{Disposable, Stateful, SubscriberList, Subscription, SubscriptionSet};

struct ArrayInner<S> {
    states: RefCell<Vec<S>>,
    subscribers: SubscriberList<Vec<S>>,
    upstream: RefCell<SubscriptionSet>,
}

impl<S: Clone + 'static> ArrayInner<S> {
    fn replace(&self, index: usize, state: S) {
        let states = {
            let mut states = self.states.borrow_mut();
            if let Some(slot) = states.get_mut(index) {
                *slot = state;
            }
            states.clone()
        };
        self.subscribers.notify(&states);
    }
}

impl<S> Drop for ArrayInner<S> {
    fn drop(&mut self) {
        self.upstream.get_mut().unsubscribe_all();
    }
}

/// Positional array of the latest states of a fixed list of nodes.
pub struct StatefulArrayReducer<S> {
    inner: Rc<ArrayInner<S>>,
}

impl<S: Clone + 'static> StatefulArrayReducer<S> {
    pub fn new(members: &[Rc<dyn Stateful<State = S>>]) -> Self {
        let inner = Rc::new(ArrayInner {
            states: RefCell::new(members.iter().map(|member| member.state()).collect()),
            subscribers: SubscriberList::new(),
            upstream: RefCell::new(SubscriptionSet::new()),
        });

        for (index, member) in members.iter().enumerate() {
            let weak = Rc::downgrade(&inner);
            let subscription = member.subscribe_to_state(Box::new(move |snapshot| {
                if let Some(inner) = weak.upgrade() {
                    inner.replace(index, snapshot.state().clone());
                }
            }));
            inner.upstream.borrow_mut().push(subscription);
        }

        Self { inner }
    }

    /// Clone of the current array.
    pub fn states(&self) -> Vec<S> {
        self.inner.states.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.states.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Observe the full array after every member commit.
    pub fn subscribe(&self, callback: impl Fn(&[S]) + 'static) -> Subscription {
        self.inner
            .subscribers
            .subscribe(move |states: &Vec<S>| callback(states))
    }

    /// Stop tracking the members.
    pub fn dispose(&self) {
        self.inner.upstream.borrow_mut().unsubscribe_all();
    }
}

impl<S: Clone + 'static> Disposable for StatefulArrayReducer<S> {
    fn dispose(&self) {
        StatefulArrayReducer::dispose(self);
    }
}

impl<S> fmt::Debug for StatefulArrayReducer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatefulArrayReducer")
            .field("members", &self.inner.states.borrow().len())
            .field("upstream", &self.inner.upstream.borrow().len())
            .finish()
    }
}
