//! # Forms
//!
//! The root aggregate. A form's value is the map of its adapters' values;
//! its validity combines adapters, transient fields (fields whose value the
//! form does not carry) and groups.

mod reducers;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde_json::{Map, Value};

use formwork_core::errors::{ensure_name, ensure_unique_names};
use formwork_core::{
    ChangedProperties, Diffable, Disposable, Interactable, Member, MemberState, Nameable,
    Property, Resettable, Result, Snapshot, StateCallback, StateContainer, StateView, Stateful,
    Subscription, SubscriptionSet, Validity,
};

pub use self::reducers::{FormValidityReducer, FormValueReducer};

use crate::field::FormField;

/// Snapshot of a form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormState {
    pub value: Map<String, Value>,
    pub validity: Validity,
    pub submitted: bool,
}

impl Diffable for FormState {
    fn changed_properties(&self, previous: &Self) -> ChangedProperties {
        let mut changed = ChangedProperties::new();
        changed.track(Property::Value, &self.value, &previous.value);
        changed.track(Property::Validity, &self.validity, &previous.validity);
        changed.track(Property::Submitted, &self.submitted, &previous.submitted);
        changed
    }
}

impl StateView for FormState {
    fn validity(&self) -> Validity {
        self.validity
    }
}

/// Construction options for a [`Form`].
pub struct FormConfig {
    pub name: String,
    /// Contribute value and validity
    pub adapters: Vec<Rc<dyn Member>>,
    /// Contribute validity only
    pub transient_fields: Vec<Rc<dyn FormField>>,
    /// Contribute validity only
    pub groups: Vec<Rc<dyn Member>>,
    /// Fields feeding the adapters; reached only by reset and submit
    pub adapted_fields: Vec<Rc<dyn FormField>>,
}

impl FormConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            adapters: Vec::new(),
            transient_fields: Vec::new(),
            groups: Vec::new(),
            adapted_fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_adapter(mut self, adapter: Rc<dyn Member>) -> Self {
        self.adapters.push(adapter);
        self
    }

    #[must_use]
    pub fn with_transient_field(mut self, field: Rc<dyn FormField>) -> Self {
        self.transient_fields.push(field);
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: Rc<dyn Member>) -> Self {
        self.groups.push(group);
        self
    }

    #[must_use]
    pub fn with_adapted_field(mut self, field: Rc<dyn FormField>) -> Self {
        self.adapted_fields.push(field);
        self
    }
}

impl fmt::Debug for FormConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn names<'a>(nodes: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
            nodes.collect()
        }
        f.debug_struct("FormConfig")
            .field("name", &self.name)
            .field("adapters", &names(self.adapters.iter().map(|n| n.name())))
            .field(
                "transient_fields",
                &names(self.transient_fields.iter().map(|n| n.name())),
            )
            .field("groups", &names(self.groups.iter().map(|n| n.name())))
            .field(
                "adapted_fields",
                &names(self.adapted_fields.iter().map(|n| n.name())),
            )
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum Category {
    Adapter,
    TransientField,
    Group,
}

struct FormInner {
    name: String,
    values: RefCell<FormValueReducer>,
    validities: RefCell<FormValidityReducer>,
    container: StateContainer<FormState>,
    /// Transient and adapted fields, in that order
    fields: Vec<Rc<dyn FormField>>,
    upstream: RefCell<SubscriptionSet>,
}

impl Drop for FormInner {
    fn drop(&mut self) {
        self.upstream.get_mut().unsubscribe_all();
    }
}

/// Aggregate of adapters, transient fields and groups.
#[derive(Clone)]
pub struct Form {
    inner: Rc<FormInner>,
    adapters: Rc<[Rc<dyn Member>]>,
    groups: Rc<[Rc<dyn Member>]>,
}

impl Form {
    pub fn new(config: FormConfig) -> Result<Self> {
        let FormConfig {
            name,
            adapters,
            transient_fields,
            groups,
            adapted_fields,
        } = config;
        ensure_name(&name)?;
        ensure_unique_names(&name, adapters.iter().map(|n| n.name()))?;
        ensure_unique_names(&name, transient_fields.iter().map(|n| n.name()))?;
        ensure_unique_names(&name, groups.iter().map(|n| n.name()))?;
        ensure_unique_names(&name, adapted_fields.iter().map(|n| n.name()))?;

        let mut values = FormValueReducer::new();
        let mut validities = FormValidityReducer::new();
        for adapter in &adapters {
            let state = adapter.member_state();
            values.process_adapter_update(adapter.name(), &state);
            validities.process_adapter_update(adapter.name(), &state);
        }
        for field in &transient_fields {
            validities.process_transient_field_update(field.name(), &field.member_state());
        }
        for group in &groups {
            validities.process_group_update(group.name(), &group.member_state());
        }

        let initial = FormState {
            value: values.value().clone(),
            validity: validities.validity(),
            submitted: false,
        };
        let mut fields = transient_fields.clone();
        fields.extend(adapted_fields);

        let form = Self {
            inner: Rc::new(FormInner {
                name,
                values: RefCell::new(values),
                validities: RefCell::new(validities),
                container: StateContainer::new(initial),
                fields,
                upstream: RefCell::new(SubscriptionSet::new()),
            }),
            adapters: adapters.into(),
            groups: groups.into(),
        };

        let adapter_members = form.adapters.iter().map(|n| (Category::Adapter, Rc::clone(n)));
        let group_members = form.groups.iter().map(|n| (Category::Group, Rc::clone(n)));
        for (category, node) in adapter_members.chain(group_members) {
            let subscription = node.subscribe_to_member_state(form.on_update(category, node.name()));
            form.inner.upstream.borrow_mut().push(subscription);
        }
        for field in &transient_fields {
            let subscription = field
                .subscribe_to_member_state(form.on_update(Category::TransientField, field.name()));
            form.inner.upstream.borrow_mut().push(subscription);
        }

        Ok(form)
    }

    pub fn snapshot(&self) -> Snapshot<FormState> {
        self.inner.container.snapshot()
    }

    pub fn adapters(&self) -> &[Rc<dyn Member>] {
        &self.adapters
    }

    pub fn groups(&self) -> &[Rc<dyn Member>] {
        &self.groups
    }

    /// Transient fields followed by adapted fields.
    pub fn fields(&self) -> &[Rc<dyn FormField>] {
        &self.inner.fields
    }

    /// Mark the form and every field as submitted.
    pub fn set_submitted(&self) {
        for field in &self.inner.fields {
            field.set_submitted();
        }
        self.update(|state| state.submitted = true);
    }

    fn on_update(&self, category: Category, name: &str) -> Box<dyn Fn(&MemberState)> {
        let weak = Rc::downgrade(&self.inner);
        let name = name.to_string();
        Box::new(move |state| {
            if let Some(inner) = weak.upgrade() {
                let form = FormHandle { inner };
                form.process(category, &name, state);
            }
        })
    }

    fn update(&self, f: impl FnOnce(&mut FormState)) {
        FormHandle {
            inner: Rc::clone(&self.inner),
        }
        .update(f);
    }
}

/// Internal handle used by upstream callbacks, which only hold the inner
/// state weakly.
struct FormHandle {
    inner: Rc<FormInner>,
}

impl FormHandle {
    fn process(&self, category: Category, name: &str, state: &MemberState) {
        {
            let mut validities = self.inner.validities.borrow_mut();
            match category {
                Category::Adapter => {
                    self.inner
                        .values
                        .borrow_mut()
                        .process_adapter_update(name, state);
                    validities.process_adapter_update(name, state);
                }
                Category::TransientField => validities.process_transient_field_update(name, state),
                Category::Group => validities.process_group_update(name, state),
            }
        }

        let value = self.inner.values.borrow().value().clone();
        let validity = self.inner.validities.borrow().validity();
        self.update(|next| {
            next.value = value;
            next.validity = validity;
        });
    }

    fn update(&self, f: impl FnOnce(&mut FormState)) {
        let mut next = self.inner.container.state();
        f(&mut next);
        tracing::trace!(
            form = %self.inner.name,
            validity = %next.validity,
            submitted = next.submitted,
            "form commit"
        );
        self.inner.container.set_state(next);
    }
}

impl Stateful for Form {
    type State = FormState;

    fn state(&self) -> FormState {
        self.inner.container.state()
    }

    fn subscribe_to_state(&self, callback: StateCallback<FormState>) -> Subscription {
        self.inner.container.subscribe_to_state(callback)
    }
}

impl Nameable for Form {
    fn name(&self) -> &str {
        &self.inner.name
    }
}

impl Resettable for Form {
    /// Reset every field and clear `submitted`.
    fn reset(&self) {
        for field in &self.inner.fields {
            field.reset();
        }
        self.update(|state| state.submitted = false);
    }
}

impl Disposable for Form {
    fn dispose(&self) {
        self.inner.upstream.borrow_mut().unsubscribe_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Adapter;
    use crate::field::{ExcludableField, Field, FieldConfig, FieldState, FormFieldExt};
    use formwork_core::{ConfigError, Excludable, NodeExt, SuiteConfig, Validator};
    use serde_json::json;

    fn required(name: &str) -> Field<String> {
        Field::new(
            FieldConfig::new(name, String::new()).with_validation(
                SuiteConfig::new().with_validator(Validator::new(|v: &String| !v.is_empty())),
            ),
        )
        .unwrap()
    }

    #[test]
    fn test_value_comes_from_adapters_only() {
        let email = required("email");
        let terms = ExcludableField::new(FieldConfig::new("terms", false)).unwrap();
        let adapter = Adapter::new("email", email.as_stateful(), |s: &FieldState<String>| {
            s.value.to_lowercase()
        })
        .unwrap();

        let form = Form::new(
            FormConfig::new("signup")
                .with_adapter(adapter.as_member())
                .with_adapted_field(email.as_form_field())
                .with_transient_field(terms.as_form_field()),
        )
        .unwrap();
        assert_eq!(form.state().validity, Validity::Invalid);

        email.set_value("Ada@Example.com".to_string());
        let state = form.state();
        assert_eq!(Value::Object(state.value), json!({ "email": "ada@example.com" }));
        assert_eq!(state.validity, Validity::Valid);
    }

    #[test]
    fn test_excluding_invalid_transient_field() {
        let code = ExcludableField::new(
            FieldConfig::new("code", String::new()).with_validation(
                SuiteConfig::new().with_validator(Validator::new(|v: &String| v.len() == 4)),
            ),
        )
        .unwrap();
        let form = Form::new(FormConfig::new("f").with_transient_field(code.as_form_field())).unwrap();
        assert_eq!(form.state().validity, Validity::Invalid);

        code.set_exclude(true);
        assert_eq!(form.state().validity, Validity::Valid);
        assert!(form.state().value.is_empty());
    }

    #[test]
    fn test_submit_and_reset_fan_out() {
        let email = required("email");
        let form = Form::new(FormConfig::new("f").with_adapted_field(email.as_form_field())).unwrap();

        email.set_value("x".to_string());
        form.set_submitted();
        assert!(form.state().submitted);
        assert!(email.state().submitted);

        form.reset();
        assert!(!form.state().submitted);
        let state = email.state();
        assert!(!state.submitted);
        assert_eq!(state.value, "");
    }

    #[test]
    fn test_duplicate_names_within_category() {
        let a = required("a");
        let result = Form::new(
            FormConfig::new("f")
                .with_transient_field(a.as_form_field())
                .with_transient_field(a.as_form_field()),
        );
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some(ConfigError::duplicate_member("f", "a").to_string())
        );
    }
}
