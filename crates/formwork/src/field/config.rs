use std::fmt;

use formwork_core::SuiteConfig;

/// Construction options for every field variant.
pub struct FieldConfig<V> {
    pub name: String,
    pub default_value: V,
    pub validation: SuiteConfig<V>,
    /// Only read by excludable variants
    pub exclude_by_default: bool,
    /// Persisted value that replaces `default_value`, reset included
    pub initial_value: Option<V>,
    /// Persisted exclusion that replaces `exclude_by_default`
    pub initial_exclude: Option<bool>,
}

impl<V> FieldConfig<V> {
    pub fn new(name: impl Into<String>, default_value: V) -> Self {
        Self {
            name: name.into(),
            default_value,
            validation: SuiteConfig::new(),
            exclude_by_default: false,
            initial_value: None,
            initial_exclude: None,
        }
    }

    #[must_use]
    pub fn with_validation(mut self, validation: SuiteConfig<V>) -> Self {
        self.validation = validation;
        self
    }

    #[must_use]
    pub fn with_exclude_by_default(mut self, exclude: bool) -> Self {
        self.exclude_by_default = exclude;
        self
    }

    #[must_use]
    pub fn with_initial_value(mut self, value: V) -> Self {
        self.initial_value = Some(value);
        self
    }

    #[must_use]
    pub fn with_initial_exclude(mut self, exclude: bool) -> Self {
        self.initial_exclude = Some(exclude);
        self
    }

    /// Name, starting value, validation and starting exclusion, with the
    /// persisted overrides applied.
    pub(crate) fn into_parts(self) -> (String, V, SuiteConfig<V>, bool) {
        let exclude = self.initial_exclude.unwrap_or(self.exclude_by_default);
        let value = self.initial_value.unwrap_or(self.default_value);
        (self.name, value, self.validation, exclude)
    }
}

impl<V: fmt::Debug> fmt::Debug for FieldConfig<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConfig")
            .field("name", &self.name)
            .field("default_value", &self.default_value)
            .field("validation", &self.validation)
            .field("exclude_by_default", &self.exclude_by_default)
            .field("initial_value", &self.initial_value)
            .field("initial_exclude", &self.initial_exclude)
            .finish()
    }
}
