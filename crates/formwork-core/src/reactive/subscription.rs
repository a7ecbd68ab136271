//! Ordered callback registry with unsubscribe handles.
//!
//! Notification is push-based and synchronous: `notify` invokes every live
//! callback in subscription order before returning. The registry never holds
//! a borrow while a callback runs, so callbacks may subscribe, unsubscribe
//! or trigger further notifications.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

impl<T> Registry<T> {
    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|(entry_id, _)| *entry_id == id)
    }
}

/// Ordered list of subscribers for values of type `T`.
pub struct SubscriberList<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T: 'static> SubscriberList<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a callback. It stays registered until the returned
    /// [`Subscription`] is explicitly unsubscribed or the list is dropped.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, Rc::new(callback)));
            id
        };

        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry
                    .borrow_mut()
                    .entries
                    .retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Invoke every subscriber, in subscription order, with `value`.
    ///
    /// A subscriber removed by an earlier callback in the same round is
    /// skipped. Subscribers added during the round are not invoked until the
    /// next one.
    pub fn notify(&self, value: &T) {
        let round: Vec<(u64, Callback<T>)> = self
            .registry
            .borrow()
            .entries
            .iter()
            .map(|(id, callback)| (*id, Rc::clone(callback)))
            .collect();

        for (id, callback) in round {
            if self.registry.borrow().contains(id) {
                callback(value);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for SubscriberList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SubscriberList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberList")
            .field("subscribers", &self.registry.borrow().entries.len())
            .finish()
    }
}

/// Handle to a registered callback.
///
/// Dropping a `Subscription` does not unsubscribe: subscriptions live as long
/// as their source unless [`Subscription::unsubscribe`] is called.
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription that is not attached to anything.
    pub fn detached() -> Self {
        Self { release: None }
    }

    /// Remove the callback from its source.
    pub fn unsubscribe(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.release.is_some())
            .finish()
    }
}

/// The upstream subscriptions a node holds, released together.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Unsubscribe everything collected so far.
    pub fn unsubscribe_all(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl Extend<Subscription> for SubscriptionSet {
    fn extend<I: IntoIterator<Item = Subscription>>(&mut self, iter: I) {
        self.subscriptions.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_notifies_in_subscription_order() {
        let list = SubscriberList::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&seen);
        let _a = list.subscribe(move |v| first.borrow_mut().push(("a", *v)));
        let second = Rc::clone(&seen);
        let _b = list.subscribe(move |v| second.borrow_mut().push(("b", *v)));

        list.notify(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unsubscribe_removes_callback() {
        let list = SubscriberList::<u32>::new();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let sub = list.subscribe(move |_| counter.set(counter.get() + 1));

        list.notify(&1);
        sub.unsubscribe();
        list.notify(&2);

        assert_eq!(count.get(), 1);
        assert!(list.is_empty());
    }

    #[test]
    fn test_dropping_handle_keeps_callback() {
        let list = SubscriberList::<u32>::new();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        drop(list.subscribe(move |_| counter.set(counter.get() + 1)));

        list.notify(&1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_callback_removed_mid_round_is_skipped() {
        let list = Rc::new(SubscriberList::<u32>::new());
        let late = Rc::new(RefCell::new(None::<Subscription>));
        let count = Rc::new(Cell::new(0));

        let remover = Rc::clone(&late);
        let _first = list.subscribe(move |_| {
            if let Some(sub) = remover.borrow_mut().take() {
                sub.unsubscribe();
            }
        });
        let counter = Rc::clone(&count);
        *late.borrow_mut() = Some(list.subscribe(move |_| counter.set(counter.get() + 1)));

        list.notify(&1);
        assert_eq!(count.get(), 0);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_subscription_set_releases_all() {
        let list = SubscriberList::<u32>::new();
        let mut set = SubscriptionSet::new();
        set.push(list.subscribe(|_| {}));
        set.push(list.subscribe(|_| {}));
        assert_eq!(list.len(), 2);

        set.unsubscribe_all();
        assert!(list.is_empty());
        assert!(set.is_empty());
    }
}
