use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use formwork_core::errors::ensure_name;
use formwork_core::{
    member_value, Disposable, MemberCallback, MemberState, Result, Snapshot, StateCallback,
    StateContainer, StateView, Stateful, StatefulArrayReducer, Subscription, SubscriptionSet,
    Validity, ValidityReducer,
};

use super::state::AdapterState;

struct AdapterInner<T> {
    name: String,
    container: StateContainer<AdapterState<T>>,
    upstream: RefCell<SubscriptionSet>,
    fan_in: RefCell<Option<Box<dyn Disposable>>>,
}

impl<T> Drop for AdapterInner<T> {
    fn drop(&mut self) {
        self.upstream.get_mut().unsubscribe_all();
    }
}

pub(crate) struct AdapterCore<T> {
    inner: Rc<AdapterInner<T>>,
}

impl<T> Clone for AdapterCore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> AdapterCore<T> {
    fn create(name: String, initial: AdapterState<T>) -> Self {
        Self {
            inner: Rc::new(AdapterInner {
                name,
                container: StateContainer::new(initial),
                upstream: RefCell::new(SubscriptionSet::new()),
                fan_in: RefCell::new(None),
            }),
        }
    }

    /// Follow one source.
    pub(crate) fn single<S: Clone + 'static>(
        name: String,
        source: Rc<dyn Stateful<State = S>>,
        compute: impl Fn(&S) -> AdapterState<T> + 'static,
    ) -> Result<Self> {
        ensure_name(&name)?;
        let core = Self::create(name, compute(&source.state()));

        let weak = Rc::downgrade(&core.inner);
        let subscription = source.subscribe_to_state(Box::new(move |snapshot| {
            if let Some(inner) = weak.upgrade() {
                AdapterCore { inner }.commit(compute(snapshot.state()));
            }
        }));
        core.inner.upstream.borrow_mut().push(subscription);
        Ok(core)
    }

    /// Follow many sources through a positional array reducer.
    pub(crate) fn multi<S: Clone + 'static>(
        name: String,
        sources: &[Rc<dyn Stateful<State = S>>],
        compute: impl Fn(&[S]) -> AdapterState<T> + 'static,
    ) -> Result<Self> {
        ensure_name(&name)?;
        let reducer = StatefulArrayReducer::new(sources);
        let core = Self::create(name, compute(reducer.states().as_slice()));

        let weak = Rc::downgrade(&core.inner);
        let subscription = reducer.subscribe(move |states| {
            if let Some(inner) = weak.upgrade() {
                AdapterCore { inner }.commit(compute(states));
            }
        });
        core.inner.upstream.borrow_mut().push(subscription);
        *core.inner.fan_in.borrow_mut() = Some(Box::new(reducer));
        Ok(core)
    }

    pub(crate) fn name(&self) -> &str {
        &self.inner.name
    }

    pub(crate) fn state(&self) -> AdapterState<T> {
        self.inner.container.state()
    }

    pub(crate) fn snapshot(&self) -> Snapshot<AdapterState<T>> {
        self.inner.container.snapshot()
    }

    pub(crate) fn subscribe_to_state(
        &self,
        callback: StateCallback<AdapterState<T>>,
    ) -> Subscription {
        self.inner.container.subscribe_to_state(callback)
    }

    pub(crate) fn dispose(&self) {
        self.inner.upstream.borrow_mut().unsubscribe_all();
        let fan_in = self.inner.fan_in.borrow_mut().take();
        if let Some(fan_in) = fan_in {
            fan_in.dispose();
        }
    }

    fn commit(&self, next: AdapterState<T>) {
        tracing::trace!(
            adapter = %self.inner.name,
            validity = %next.validity,
            exclude = next.exclude,
            "adapter commit"
        );
        self.inner.container.set_state(next);
    }
}

impl<T: Clone + PartialEq + Serialize + 'static> AdapterCore<T> {
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
}

/// Validity of a source array, honouring each source's exclusion.
pub(crate) fn reduce_validity<S: StateView>(states: &[S]) -> Validity {
    let mut reducer = ValidityReducer::<usize>::new();
    for (index, state) in states.iter().enumerate() {
        reducer.process_member_state_update(index, state);
    }
    reducer.validity()
}

fn member_view<T: Serialize>(name: &str, state: &AdapterState<T>) -> MemberState {
    MemberState::new(member_value(name, &state.value), state.validity, state.exclude)
}
