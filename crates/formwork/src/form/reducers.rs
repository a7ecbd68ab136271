//! Form-level fan-in.
//!
//! A form has three membership categories. Adapters contribute value and
//! validity; transient fields and groups contribute validity only. Each
//! category keeps its own [`ValidityReducer`] so that a change in one never
//! disturbs the bookkeeping of the others.

use serde_json::{Map, Value};

use formwork_core::{MemberState, Validity, ValidityReducer, ValueReducer};

/// Validity over adapters, transient fields and groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValidityReducer {
    adapters: ValidityReducer,
    transient_fields: ValidityReducer,
    groups: ValidityReducer,
}

impl FormValidityReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_adapter_update(&mut self, name: &str, state: &MemberState) {
        self.adapters.process_member_state_update(name.to_string(), state);
    }

    pub fn process_transient_field_update(&mut self, name: &str, state: &MemberState) {
        self.transient_fields
            .process_member_state_update(name.to_string(), state);
    }

    pub fn process_group_update(&mut self, name: &str, state: &MemberState) {
        self.groups.process_member_state_update(name.to_string(), state);
    }

    pub fn validity(&self) -> Validity {
        Validity::reduce([
            self.adapters.validity(),
            self.transient_fields.validity(),
            self.groups.validity(),
        ])
    }
}

/// Value over adapters only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValueReducer {
    adapters: ValueReducer,
}

impl FormValueReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_adapter_update(&mut self, name: &str, state: &MemberState) {
        self.adapters.process_member_state_update(name, state);
    }

    pub fn value(&self) -> &Map<String, Value> {
        self.adapters.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(validity: Validity, exclude: bool) -> MemberState {
        MemberState::new(json!(null), validity, exclude)
    }

    #[test]
    fn test_categories_are_isolated() {
        let mut reducer = FormValidityReducer::new();
        reducer.process_adapter_update("shared", &state(Validity::Pending, false));
        reducer.process_transient_field_update("shared", &state(Validity::Invalid, false));
        assert_eq!(reducer.validity(), Validity::Invalid);

        // Excluding the transient field leaves the adapter with the same name alone.
        reducer.process_transient_field_update("shared", &state(Validity::Invalid, true));
        assert_eq!(reducer.validity(), Validity::Pending);
    }

    #[test]
    fn test_groups_contribute_validity() {
        let mut reducer = FormValidityReducer::new();
        reducer.process_group_update("address", &state(Validity::Invalid, false));
        assert_eq!(reducer.validity(), Validity::Invalid);
        reducer.process_group_update("address", &state(Validity::Valid, false));
        assert_eq!(reducer.validity(), Validity::Valid);
    }

    #[test]
    fn test_value_ignores_excluded_adapters() {
        let mut reducer = FormValueReducer::new();
        reducer.process_adapter_update("email", &MemberState::new(json!("a@b.c"), Validity::Valid, false));
        reducer.process_adapter_update("phone", &MemberState::new(json!("123"), Validity::Valid, true));
        assert_eq!(Value::Object(reducer.value().clone()), json!({ "email": "a@b.c" }));
    }
}
