use serde::Serialize;

use formwork_core::{ChangedProperties, Diffable, Property, StateView, Validity};

/// Snapshot of an adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdapterState<T> {
    pub value: T,
    pub validity: Validity,
    /// Always `false` on non-excludable adapters
    pub exclude: bool,
}

impl<T: PartialEq> Diffable for AdapterState<T> {
    fn changed_properties(&self, previous: &Self) -> ChangedProperties {
        let mut changed = ChangedProperties::new();
        changed.track(Property::Value, &self.value, &previous.value);
        changed.track(Property::Validity, &self.validity, &previous.validity);
        changed.track(Property::Exclude, &self.exclude, &previous.exclude);
        changed
    }
}

impl<T> StateView for AdapterState<T> {
    fn validity(&self) -> Validity {
        self.validity
    }

    fn is_excluded(&self) -> bool {
        self.exclude
    }
}

/// What an excludable adapt function returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adapted<T> {
    pub value: T,
    pub exclude: bool,
}

impl<T> Adapted<T> {
    pub fn included(value: T) -> Self {
        Self {
            value,
            exclude: false,
        }
    }

    pub fn excluded(value: T) -> Self {
        Self {
            value,
            exclude: true,
        }
    }
}
