//! # Groups
//!
//! Composite nodes whose value is the map of their included members' values.
//!
//! - [`Group`]: members are any [`Member`] (fields, adapters, other groups).
//! - [`FieldGroup`]: members are fields; resets and submissions fan out to
//!   them.
//!
//! A group's validity comes from one of two places, reported in
//! `validity_source`: the reduction of its members' validities, or, once
//! every included member is valid, its own validator suite.

mod config;
mod engine;
mod state;

use std::collections::BTreeSet;
use std::rc::Rc;

use formwork_core::{
    Disposable, Interactable, Member, MemberCallback, MemberState, Nameable, Resettable, Result,
    Snapshot, StateCallback, Stateful, Subscription,
};

pub use self::config::{FieldGroupConfig, GroupConfig};
pub use self::state::{GroupState, GroupValue};

use self::engine::GroupCore;
use crate::field::FormField;

macro_rules! group_handle {
    ($handle:ident) => {
        impl $handle {
            pub fn snapshot(&self) -> Snapshot<GroupState> {
                self.core.snapshot()
            }

            /// Whether the group's own async pass is scheduled or running.
            pub fn is_validating(&self) -> bool {
                self.core.is_validating()
            }
        }

        impl Stateful for $handle {
            type State = GroupState;

            fn state(&self) -> GroupState {
                self.core.state()
            }

            fn subscribe_to_state(&self, callback: StateCallback<GroupState>) -> Subscription {
                self.core.subscribe_to_state(callback)
            }
        }

        impl Nameable for $handle {
            fn name(&self) -> &str {
                self.core.name()
            }
        }

        impl Member for $handle {
            fn member_state(&self) -> MemberState {
                self.core.member_state()
            }

            fn subscribe_to_member_state(&self, callback: MemberCallback) -> Subscription {
                self.core.subscribe_to_member_state(callback)
            }
        }

        impl Disposable for $handle {
            fn dispose(&self) {
                self.core.dispose();
            }
        }
    };
}

/// A group over arbitrary members.
#[derive(Clone)]
pub struct Group {
    core: GroupCore,
    members: Rc<[Rc<dyn Member>]>,
}

impl Group {
    pub fn new(config: GroupConfig) -> Result<Self> {
        let GroupConfig {
            name,
            members,
            validation,
        } = config;
        let core = GroupCore::new(name, &members, validation)?;
        Ok(Self {
            core,
            members: members.into(),
        })
    }

    pub fn members(&self) -> &[Rc<dyn Member>] {
        &self.members
    }
}

/// A group whose members are fields.
#[derive(Clone)]
pub struct FieldGroup {
    core: GroupCore,
    fields: Rc<[Rc<dyn FormField>]>,
}

impl FieldGroup {
    pub fn new(config: FieldGroupConfig) -> Result<Self> {
        let FieldGroupConfig {
            name,
            members,
            validation,
        } = config;
        let as_members: Vec<Rc<dyn Member>> = members
            .iter()
            .map(|field| Rc::new(FieldMember(Rc::clone(field))) as Rc<dyn Member>)
            .collect();
        let core = GroupCore::new(name, &as_members, validation)?;
        Ok(Self {
            core,
            fields: members.into(),
        })
    }

    pub fn fields(&self) -> &[Rc<dyn FormField>] {
        &self.fields
    }

    /// Names of the members currently contributing to the group's value.
    pub fn included_member_names(&self) -> BTreeSet<String> {
        self.core.state().included_member_names
    }

    /// Mark every member field as submitted.
    pub fn set_submitted(&self) {
        for field in self.fields.iter() {
            field.set_submitted();
        }
    }
}

impl Resettable for FieldGroup {
    /// Reset every member field; the group recomputes from their defaults.
    fn reset(&self) {
        for field in self.fields.iter() {
            field.reset();
        }
    }
}

group_handle!(Group);
group_handle!(FieldGroup);

/// [`Member`] view of a field held as a [`FormField`].
struct FieldMember(Rc<dyn FormField>);

impl Nameable for FieldMember {
    fn name(&self) -> &str {
        self.0.name()
    }
}

impl Member for FieldMember {
    fn member_state(&self) -> MemberState {
        self.0.member_state()
    }

    fn subscribe_to_member_state(&self, callback: MemberCallback) -> Subscription {
        self.0.subscribe_to_member_state(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{ExcludableField, Field, FieldConfig, FormFieldExt};
    use formwork_core::{ConfigError, Excludable, NodeExt, Validity, ValiditySource};
    use serde_json::json;

    #[test]
    fn test_duplicate_member_names_are_rejected() {
        let a = Field::new(FieldConfig::new("a", 1u8)).unwrap();
        let result = Group::new(GroupConfig::new("g", vec![a.as_member(), a.as_member()]));
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some(ConfigError::duplicate_member("g", "a").to_string())
        );
    }

    #[test]
    fn test_value_tracks_included_members() {
        let street = Field::new(FieldConfig::new("street", "Main".to_string())).unwrap();
        let unit = ExcludableField::new(
            FieldConfig::new("unit", "4B".to_string()).with_exclude_by_default(true),
        )
        .unwrap();
        let group = FieldGroup::new(FieldGroupConfig::new(
            "address",
            vec![street.as_form_field(), unit.as_form_field()],
        ))
        .unwrap();

        assert_eq!(json!(group.state().value), json!({ "street": "Main" }));
        assert_eq!(
            group.included_member_names(),
            BTreeSet::from(["street".to_string()])
        );

        unit.set_exclude(false);
        assert_eq!(
            json!(group.state().value),
            json!({ "street": "Main", "unit": "4B" })
        );
        assert_eq!(group.state().validity_source, ValiditySource::Validation);
        assert_eq!(group.state().validity, Validity::Valid);
    }

    #[test]
    fn test_reset_and_submit_fan_out() {
        let name = Field::new(FieldConfig::new("name", String::new())).unwrap();
        let group =
            FieldGroup::new(FieldGroupConfig::new("person", vec![name.as_form_field()])).unwrap();

        name.set_value("Ada".to_string());
        group.set_submitted();
        assert!(name.state().submitted);

        group.reset();
        let state = name.state();
        assert_eq!(state.value, "");
        assert!(!state.submitted);
        assert!(!state.modified);
    }

    #[test]
    fn test_dispose_stops_tracking_members() {
        let a = Field::new(FieldConfig::new("a", 1u8)).unwrap();
        let group = Group::new(GroupConfig::new("g", vec![a.as_member()])).unwrap();
        group.dispose();

        a.set_value(2);
        assert_eq!(json!(group.state().value), json!({ "a": 1 }));
    }
}
