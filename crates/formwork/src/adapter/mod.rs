//! # Adapters
//!
//! Derived nodes: an adapter maps the state of one or more sources to a new
//! value and carries the sources' validity along. Adapters have no mutators
//! besides `dispose()`; they recompute on every source commit.
//!
//! | Type | Sources | Adapt function |
//! |------|---------|----------------|
//! | [`Adapter`] | one | `Fn(&S) -> T` |
//! | [`ExcludableAdapter`] | one | `Fn(&S) -> Adapted<T>` |
//! | [`MultiAdapter`] | many | `Fn(&[S]) -> T` |
//! | [`ExcludableMultiAdapter`] | many | `Fn(&[S]) -> Adapted<T>` |

mod engine;
mod state;

use std::rc::Rc;

use serde::Serialize;

use formwork_core::{
    Disposable, Member, MemberCallback, MemberState, Nameable, Result, Snapshot, StateCallback,
    StateView, Stateful, Subscription,
};

pub use self::state::{Adapted, AdapterState};

use self::engine::{reduce_validity, AdapterCore};

macro_rules! adapter_handle {
    ($handle:ident) => {
        impl<T> Clone for $handle<T> {
            fn clone(&self) -> Self {
                Self {
                    core: self.core.clone(),
                }
            }
        }

        impl<T: Clone + PartialEq + 'static> $handle<T> {
            pub fn snapshot(&self) -> Snapshot<AdapterState<T>> {
                self.core.snapshot()
            }
        }

        impl<T: Clone + PartialEq + 'static> Stateful for $handle<T> {
            type State = AdapterState<T>;

            fn state(&self) -> AdapterState<T> {
                self.core.state()
            }

            fn subscribe_to_state(
                &self,
                callback: StateCallback<AdapterState<T>>,
            ) -> Subscription {
                self.core.subscribe_to_state(callback)
            }
        }

        impl<T: Clone + PartialEq + 'static> Nameable for $handle<T> {
            fn name(&self) -> &str {
                self.core.name()
            }
        }

        impl<T: Clone + PartialEq + Serialize + 'static> Member for $handle<T> {
            fn member_state(&self) -> MemberState {
                self.core.member_state()
            }

            fn subscribe_to_member_state(&self, callback: MemberCallback) -> Subscription {
                self.core.subscribe_to_member_state(callback)
            }
        }

        impl<T: Clone + PartialEq + 'static> Disposable for $handle<T> {
            fn dispose(&self) {
                self.core.dispose();
            }
        }
    };
}

/// Maps one source's state to a value.
pub struct Adapter<T> {
    core: AdapterCore<T>,
}

impl<T: Clone + PartialEq + 'static> Adapter<T> {
    pub fn new<S: StateView + Clone + 'static>(
        name: impl Into<String>,
        source: Rc<dyn Stateful<State = S>>,
        adapt_fn: impl Fn(&S) -> T + 'static,
    ) -> Result<Self> {
        let core = AdapterCore::single(name.into(), source, move |state: &S| AdapterState {
            value: adapt_fn(state),
            validity: state.validity(),
            exclude: false,
        })?;
        Ok(Self { core })
    }
}

/// Maps one source's state to a value that may be excluded.
pub struct ExcludableAdapter<T> {
    core: AdapterCore<T>,
}

impl<T: Clone + PartialEq + 'static> ExcludableAdapter<T> {
    pub fn new<S: StateView + Clone + 'static>(
        name: impl Into<String>,
        source: Rc<dyn Stateful<State = S>>,
        adapt_fn: impl Fn(&S) -> Adapted<T> + 'static,
    ) -> Result<Self> {
        let core = AdapterCore::single(name.into(), source, move |state: &S| {
            let Adapted { value, exclude } = adapt_fn(state);
            AdapterState {
                value,
                validity: state.validity(),
                exclude,
            }
        })?;
        Ok(Self { core })
    }
}

/// Maps the states of several sources to one value.
///
/// Validity is the reduction of the sources' validities; excluded sources do
/// not count.
pub struct MultiAdapter<T> {
    core: AdapterCore<T>,
}

impl<T: Clone + PartialEq + 'static> MultiAdapter<T> {
    pub fn new<S: StateView + Clone + 'static>(
        name: impl Into<String>,
        sources: Vec<Rc<dyn Stateful<State = S>>>,
        adapt_fn: impl Fn(&[S]) -> T + 'static,
    ) -> Result<Self> {
        let core = AdapterCore::multi(name.into(), &sources, move |states: &[S]| AdapterState {
            value: adapt_fn(states),
            validity: reduce_validity(states),
            exclude: false,
        })?;
        Ok(Self { core })
    }
}

/// Maps the states of several sources to one value that may be excluded.
pub struct ExcludableMultiAdapter<T> {
    core: AdapterCore<T>,
}

impl<T: Clone + PartialEq + 'static> ExcludableMultiAdapter<T> {
    pub fn new<S: StateView + Clone + 'static>(
        name: impl Into<String>,
        sources: Vec<Rc<dyn Stateful<State = S>>>,
        adapt_fn: impl Fn(&[S]) -> Adapted<T> + 'static,
    ) -> Result<Self> {
        let core = AdapterCore::multi(name.into(), &sources, move |states: &[S]| {
            let Adapted { value, exclude } = adapt_fn(states);
            AdapterState {
                value,
                validity: reduce_validity(states),
                exclude,
            }
        })?;
        Ok(Self { core })
    }
}

adapter_handle!(Adapter);
adapter_handle!(ExcludableAdapter);
adapter_handle!(MultiAdapter);
adapter_handle!(ExcludableMultiAdapter);
