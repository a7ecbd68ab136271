//! # Fields
//!
//! Leaf nodes holding one user-editable value.
//!
//! | Type | Exclusion | Controllers |
//! |------|:---------:|:-----------:|
//! | [`Field`] | | |
//! | [`ExcludableField`] | ✓ | |
//! | [`ControlledField`] | | ✓ |
//! | [`ControlledExcludableField`] | ✓ | ✓ |
//!
//! All four are cheap `Clone` handles to the same engine. Fields with async
//! validators spawn their passes with `spawn_local`, so they must be created
//! and mutated inside a `tokio::task::LocalSet`.

mod config;
mod controlled;
mod engine;
mod state;

use std::rc::Rc;

use formwork_core::{
    Disposable, Excludable, Interactable, Member, MemberCallback, MemberState, Nameable,
    Resettable, Result, Snapshot, StateCallback, Stateful, Subscription,
};

pub use self::config::FieldConfig;
pub use self::controlled::{ControlFn, ControlledBy, ControlledUpdate};
pub use self::engine::FieldValue;
pub use self::state::FieldState;

use self::engine::FieldCore;

/// A field as seen by groups and forms: a member that can also be reset and
/// marked submitted.
pub trait FormField: Member + Resettable + Interactable {}

impl<T: Member + Resettable + Interactable> FormField for T {}

/// Shared [`FormField`] handles for group and form constructors.
pub trait FormFieldExt: FormField + Clone + 'static {
    fn as_form_field(&self) -> Rc<dyn FormField> {
        Rc::new(self.clone())
    }
}

impl<T: FormField + Clone + 'static> FormFieldExt for T {}

macro_rules! field_handle {
    ($handle:ident) => {
        impl<V> Clone for $handle<V> {
            fn clone(&self) -> Self {
                Self {
                    core: self.core.clone(),
                }
            }
        }

        impl<V: FieldValue> $handle<V> {
            /// Validate and commit a user-entered value; marks the field
            /// modified.
            pub fn set_value(&self, value: V) {
                self.core.set_value(value);
            }

            pub fn snapshot(&self) -> Snapshot<FieldState<V>> {
                self.core.snapshot()
            }

            /// Whether an async validation pass is scheduled or running.
            pub fn is_validating(&self) -> bool {
                self.core.is_validating()
            }
        }

        impl<V: FieldValue> Stateful for $handle<V> {
            type State = FieldState<V>;

            fn state(&self) -> FieldState<V> {
                self.core.state()
            }

            fn subscribe_to_state(&self, callback: StateCallback<FieldState<V>>) -> Subscription {
                self.core.subscribe_to_state(callback)
            }
        }

        impl<V: FieldValue> Nameable for $handle<V> {
            fn name(&self) -> &str {
                self.core.name()
            }
        }

        impl<V: FieldValue> Member for $handle<V> {
            fn member_state(&self) -> MemberState {
                self.core.member_state()
            }

            fn subscribe_to_member_state(&self, callback: MemberCallback) -> Subscription {
                self.core.subscribe_to_member_state(callback)
            }
        }

        impl<V: FieldValue> Resettable for $handle<V> {
            fn reset(&self) {
                self.core.reset();
            }
        }

        impl<V: FieldValue> Interactable for $handle<V> {
            fn focus(&self) {
                self.core.focus();
            }

            fn blur(&self) {
                self.core.blur();
            }

            fn visit(&self) {
                self.core.visit();
            }

            fn set_submitted(&self) {
                self.core.set_submitted();
            }
        }

        impl<V: FieldValue> Disposable for $handle<V> {
            fn dispose(&self) {
                self.core.dispose();
            }
        }
    };
}

/// A validated input field.
pub struct Field<V> {
    core: FieldCore<V>,
}

impl<V: FieldValue> Field<V> {
    pub fn new(config: FieldConfig<V>) -> Result<Self> {
        Ok(Self {
            core: FieldCore::new(config, false)?,
        })
    }
}

/// A field whose value can be left out of its parents' aggregates.
pub struct ExcludableField<V> {
    core: FieldCore<V>,
}

impl<V: FieldValue> ExcludableField<V> {
    pub fn new(config: FieldConfig<V>) -> Result<Self> {
        Ok(Self {
            core: FieldCore::new(config, true)?,
        })
    }
}

/// A field whose value (or verdict) is derived from other nodes' states.
pub struct ControlledField<V> {
    core: FieldCore<V>,
}

impl<V: FieldValue> ControlledField<V> {
    pub fn new<C: Clone + 'static>(
        config: FieldConfig<V>,
        controlled_by: ControlledBy<C, V>,
    ) -> Result<Self> {
        let core = FieldCore::new(config, false)?;
        controlled::attach(&core, controlled_by);
        Ok(Self { core })
    }
}

/// A controlled field whose control function may also toggle exclusion.
pub struct ControlledExcludableField<V> {
    core: FieldCore<V>,
}

impl<V: FieldValue> ControlledExcludableField<V> {
    pub fn new<C: Clone + 'static>(
        config: FieldConfig<V>,
        controlled_by: ControlledBy<C, V>,
    ) -> Result<Self> {
        let core = FieldCore::new(config, true)?;
        controlled::attach(&core, controlled_by);
        Ok(Self { core })
    }
}

field_handle!(Field);
field_handle!(ExcludableField);
field_handle!(ControlledField);
field_handle!(ControlledExcludableField);

impl<V: FieldValue> Excludable for ExcludableField<V> {
    fn set_exclude(&self, exclude: bool) {
        self.core.set_exclude(exclude);
    }
}

impl<V: FieldValue> Excludable for ControlledExcludableField<V> {
    fn set_exclude(&self, exclude: bool) {
        self.core.set_exclude(exclude);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_core::{Message, NodeExt, Property, SuiteConfig, Validator, Validity};
    use std::cell::RefCell;

    fn required() -> SuiteConfig<String> {
        SuiteConfig::new()
            .with_validator(Validator::new(|v: &String| !v.is_empty()).with_invalid_message("required"))
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let result = Field::new(FieldConfig::new("", 0u32));
        assert!(matches!(result, Err(formwork_core::ConfigError::EmptyName)));
    }

    #[test]
    fn test_construction_validates_default() {
        let field = Field::new(FieldConfig::new("name", String::new()).with_validation(required())).unwrap();
        let state = field.state();
        assert_eq!(state.validity, Validity::Invalid);
        assert_eq!(state.messages, vec![Message::invalid("required")]);
        assert!(!state.modified && !state.focused && !state.visited && !state.submitted);
    }

    #[test]
    fn test_interaction_flags() {
        let field = Field::new(FieldConfig::new("name", String::new())).unwrap();
        field.focus();
        assert!(field.state().focused);
        field.blur();
        let state = field.state();
        assert!(!state.focused);
        assert!(state.visited);

        field.set_submitted();
        assert!(field.snapshot().did_property_change(Property::Submitted));
    }

    #[test]
    fn test_non_excludable_field_ignores_exclude_by_default() {
        let field = Field::new(FieldConfig::new("name", 1u8).with_exclude_by_default(true)).unwrap();
        assert!(!field.state().exclude);
        assert!(!field.member_state().exclude);
    }

    #[test]
    fn test_persisted_overrides_become_defaults() {
        let field = ExcludableField::new(
            FieldConfig::new("city", "Oslo".to_string())
                .with_exclude_by_default(true)
                .with_initial_value("Bergen".to_string())
                .with_initial_exclude(false),
        )
        .unwrap();
        field.set_value("Tromsø".to_string());
        field.set_exclude(true);
        field.reset();

        let state = field.state();
        assert_eq!(state.value, "Bergen");
        assert!(!state.exclude);
        assert!(!state.modified);
    }

    #[test]
    fn test_member_state_serializes_value() {
        let field = Field::new(FieldConfig::new("age", 42u32)).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = field.subscribe_to_member_state(Box::new(move |state| {
            sink.borrow_mut().push(state.value.clone());
        }));

        field.set_value(43);
        assert_eq!(field.member_state().value, serde_json::json!(43));
        assert_eq!(*seen.borrow(), vec![serde_json::json!(43)]);
    }

    #[test]
    fn test_controlled_field_follows_controller() {
        let source = Field::new(FieldConfig::new("first", "Ada".to_string())).unwrap();
        let greeting = ControlledField::new(
            FieldConfig::new("greeting", String::new()),
            ControlledBy::new(
                vec![source.as_stateful()],
                |states: &[FieldState<String>], _: &FieldState<String>| {
                    Some(ControlledUpdate::value(format!("Hello, {}", states[0].value)))
                },
            ),
        )
        .unwrap();
        assert_eq!(greeting.state().value, "Hello, Ada");

        source.set_value("Grace".to_string());
        let state = greeting.state();
        assert_eq!(state.value, "Hello, Grace");
        assert!(!state.modified);
    }
}
