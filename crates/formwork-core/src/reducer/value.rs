//! Value fan-in: a JSON map of every included member's value.

use serde_json::{Map, Value};

use crate::reactive::MemberState;

/// Maintains `name -> value` for included members.
///
/// Values are deep copies; an excluded member has no key at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueReducer {
    value: Map<String, Value>,
}

impl ValueReducer {
    pub fn new<'a>(members: impl IntoIterator<Item = (&'a str, &'a MemberState)>) -> Self {
        let mut reducer = Self::default();
        for (name, state) in members {
            reducer.process_member_state_update(name, state);
        }
        reducer
    }

    pub fn process_member_state_update(&mut self, name: &str, state: &MemberState) {
        if state.exclude {
            self.value.remove(name);
        } else {
            self.value.insert(name.to_string(), state.value.clone());
        }
    }

    pub fn value(&self) -> &Map<String, Value> {
        &self.value
    }

    pub fn contains(&self, name: &str) -> bool {
        self.value.contains_key(name)
    }

    /// Names of members currently contributing a value.
    pub fn included_names(&self) -> impl Iterator<Item = &str> {
        self.value.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validity::Validity;
    use serde_json::json;

    fn member(value: Value, exclude: bool) -> MemberState {
        MemberState::new(value, Validity::Valid, exclude)
    }

    #[test]
    fn test_seeding_skips_excluded() {
        let first = member(json!("a"), false);
        let second = member(json!("b"), true);
        let reducer = ValueReducer::new([("first", &first), ("second", &second)]);
        assert_eq!(Value::Object(reducer.value().clone()), json!({ "first": "a" }));
    }

    #[test]
    fn test_exclusion_toggle_removes_and_restores_key() {
        let mut reducer = ValueReducer::default();
        reducer.process_member_state_update("city", &member(json!("Oslo"), false));
        reducer.process_member_state_update("city", &member(json!("Oslo"), true));
        assert!(!reducer.contains("city"));

        reducer.process_member_state_update("city", &member(json!("Bergen"), false));
        assert_eq!(reducer.value().get("city"), Some(&json!("Bergen")));
    }

    #[test]
    fn test_values_are_deep_copies() {
        let mut source = member(json!({ "tags": ["a"] }), false);
        let mut reducer = ValueReducer::default();
        reducer.process_member_state_update("nested", &source);

        source.value["tags"][0] = json!("changed");
        assert_eq!(reducer.value()["nested"], json!({ "tags": ["a"] }));
    }
}
