use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Map, Value};

use formwork_core::{
    ChangedProperties, Diffable, Message, Property, StateView, Validity, ValiditySource,
};

/// The aggregated value of a group: member name to member value.
pub type GroupValue = Map<String, Value>;

/// Snapshot of a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupState {
    pub value: GroupValue,
    pub validity: Validity,
    /// Empty unless `validity_source` is `Validation`
    pub messages: Vec<Message>,
    pub validity_source: ValiditySource,
    pub included_member_names: BTreeSet<String>,
}

impl Diffable for GroupState {
    fn changed_properties(&self, previous: &Self) -> ChangedProperties {
        let mut changed = ChangedProperties::new();
        changed.track(Property::Value, &self.value, &previous.value);
        changed.track(Property::Validity, &self.validity, &previous.validity);
        changed.track(Property::Messages, &self.messages, &previous.messages);
        changed.track(
            Property::ValiditySource,
            &self.validity_source,
            &previous.validity_source,
        );
        changed.track(
            Property::IncludedMemberNames,
            &self.included_member_names,
            &previous.included_member_names,
        );
        changed
    }
}

impl StateView for GroupState {
    fn validity(&self) -> Validity {
        self.validity
    }
}
