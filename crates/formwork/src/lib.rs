//! Formwork - reactive form state
//!
//! Nodes that hold user input, validate it, and propagate value and validity
//! upward through groups and adapters to a form.
//!
//! # Node kinds
//!
//! - **Fields** hold one value and run a `CombinedValidatorSuite`: the
//!   synchronous validators on every change, then a debounced, cancelable
//!   async pass when async validators are configured.
//! - **Groups** aggregate named members into a JSON object value. Their own
//!   validators only run when every included member is Valid.
//! - **Adapters** derive a value from one or more sources and carry the
//!   sources' validity along.
//! - **Forms** take their value from adapters and their validity from
//!   adapters, transient fields and groups.
//!
//! Every node exposes immutable snapshots and synchronous subscriptions.
//! Nodes are single-threaded (`Rc` handles); async validation is spawned
//! with `spawn_local` and so needs a `tokio::task::LocalSet`.
//!
//! # Example
//!
//! ```rust,no_run
//! use formwork::prelude::*;
//!
//! let email = Field::new(
//!     FieldConfig::new("email", String::new()).with_validation(
//!         SuiteConfig::new()
//!             .with_validator(Validator::new(|v: &String| v.contains('@'))
//!                 .with_invalid_message("Enter an email address")),
//!     ),
//! )?;
//! email.set_value("ada@example.com".to_string());
//! assert_eq!(email.state().validity, Validity::Valid);
//! # Ok::<(), formwork::ConfigError>(())
//! ```

#![allow(missing_docs)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Derived nodes
pub mod adapter;

/// Leaf nodes holding user input
pub mod field;

/// Root aggregates
pub mod form;

/// Named member composites
pub mod group;

mod in_flight;

pub use adapter::{
    Adapted, Adapter, AdapterState, ExcludableAdapter, ExcludableMultiAdapter, MultiAdapter,
};
pub use field::{
    ControlFn, ControlledBy, ControlledExcludableField, ControlledField, ControlledUpdate,
    ExcludableField, Field, FieldConfig, FieldState, FieldValue, FormField, FormFieldExt,
};
pub use form::{Form, FormConfig, FormState, FormValidityReducer, FormValueReducer};
pub use group::{FieldGroup, FieldGroupConfig, Group, GroupConfig, GroupState, GroupValue};

pub use formwork_core::{
    errors, validation, AsyncValidator, ChangedProperties, ConfigError, Disposable, Excludable,
    Interactable, Member, MemberState, MemberStateful, Message, Nameable, NodeExt, Property,
    Resettable, Result, Snapshot, StateView, Stateful, Subscription, SuiteConfig, Validator,
    Validity, ValiditySource,
};

/// Everything needed to build and observe a form.
pub mod prelude {
    pub use crate::adapter::{
        Adapted, Adapter, ExcludableAdapter, ExcludableMultiAdapter, MultiAdapter,
    };
    pub use crate::field::{
        ControlledBy, ControlledExcludableField, ControlledField, ControlledUpdate,
        ExcludableField, Field, FieldConfig, FieldState, FormFieldExt,
    };
    pub use crate::form::{Form, FormConfig};
    pub use crate::group::{FieldGroup, FieldGroupConfig, Group, GroupConfig};
    pub use formwork_core::validation::{Includes, MaxLength, MinLength, Required};
    pub use formwork_core::{
        AsyncValidator, Disposable, Excludable, Interactable, Member, MemberState, Message,
        Nameable, NodeExt, Property, Resettable, StateView, Stateful, SuiteConfig, Validator,
        Validity,
    };
}
