use serde::Serialize;

use formwork_core::{ChangedProperties, Diffable, Message, Property, StateView, Validity};

/// Snapshot of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldState<V> {
    pub value: V,
    pub validity: Validity,
    pub messages: Vec<Message>,
    pub focused: bool,
    pub visited: bool,
    pub modified: bool,
    pub submitted: bool,
    /// Always `false` on non-excludable fields
    pub exclude: bool,
}

impl<V> FieldState<V> {
    /// A pristine state: no interaction flags set.
    pub fn pristine(value: V, validity: Validity, messages: Vec<Message>, exclude: bool) -> Self {
        Self {
            value,
            validity,
            messages,
            focused: false,
            visited: false,
            modified: false,
            submitted: false,
            exclude,
        }
    }
}

impl<V: PartialEq> Diffable for FieldState<V> {
    fn changed_properties(&self, previous: &Self) -> ChangedProperties {
        let mut changed = ChangedProperties::new();
        changed.track(Property::Value, &self.value, &previous.value);
        changed.track(Property::Validity, &self.validity, &previous.validity);
        changed.track(Property::Messages, &self.messages, &previous.messages);
        changed.track(Property::Focused, &self.focused, &previous.focused);
        changed.track(Property::Visited, &self.visited, &previous.visited);
        changed.track(Property::Modified, &self.modified, &previous.modified);
        changed.track(Property::Submitted, &self.submitted, &previous.submitted);
        changed.track(Property::Exclude, &self.exclude, &previous.exclude);
        changed
    }
}

impl<V> StateView for FieldState<V> {
    fn validity(&self) -> Validity {
        self.validity
    }

    fn is_excluded(&self) -> bool {
        self.exclude
    }
}
