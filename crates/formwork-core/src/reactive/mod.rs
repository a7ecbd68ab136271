//! # Reactive Primitives
//!
//! Push-based building blocks every node is made of.
//!
//! ## Core Types
//!
//! - [`StateContainer<S>`]: holds a node's immutable snapshot, records which
//!   properties changed on each commit, and notifies subscribers.
//!
//! - [`SubscriberList<T>`] / [`Subscription`]: the ordered callback registry
//!   behind every container and reducer.
//!
//! - [`Stateful`], [`Member`] and the other capability traits: the contract
//!   node handles expose to each other and to outer layers.
//!
//! ## Design Principles
//!
//! 1. **Synchronous, depth-first**: a commit notifies every subscriber before
//!    returning, so a child's commit recomputes its parents before control
//!    returns to the caller of the original mutator.
//!
//! 2. **Single-threaded**: containers use `Rc`/`RefCell`. Nodes are `!Send`.
//!
//! 3. **Weak upstream links**: downstream nodes subscribe with weak
//!    references, so dropping a node never leaks through its sources.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use formwork_core::reactive::{Property, StateContainer};
//!
//! let container = StateContainer::new(state);
//! let _sub = container.subscribe_to_state(|snapshot| {
//!     if snapshot.did_property_change(Property::Value) {
//!         persist(&snapshot.value);
//!     }
//! });
//! container.update(|s| s.value = next);
//! ```

mod container;
mod subscription;
mod traits;

pub use container::{ChangedProperties, Diffable, Property, Snapshot, StateContainer};
pub use subscription::{SubscriberList, Subscription, SubscriptionSet};
pub use traits::{
    member_value, Disposable, Excludable, Interactable, Member, MemberCallback, MemberState,
    MemberStateful, Nameable, NodeExt, Resettable, StateCallback, StateView, Stateful,
};
