use std::fmt;
use std::rc::Rc;

use formwork_core::{Member, Nameable, SuiteConfig};

use super::state::GroupValue;
use crate::field::FormField;

/// Construction options for a [`Group`](super::Group).
pub struct GroupConfig {
    pub name: String,
    pub members: Vec<Rc<dyn Member>>,
    /// Validators run on the reduced value once every member is valid
    pub validation: SuiteConfig<GroupValue>,
}

impl GroupConfig {
    pub fn new(name: impl Into<String>, members: Vec<Rc<dyn Member>>) -> Self {
        Self {
            name: name.into(),
            members,
            validation: SuiteConfig::new(),
        }
    }

    #[must_use]
    pub fn with_validation(mut self, validation: SuiteConfig<GroupValue>) -> Self {
        self.validation = validation;
        self
    }
}

impl fmt::Debug for GroupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<&str> = self.members.iter().map(|m| m.name()).collect();
        f.debug_struct("GroupConfig")
            .field("name", &self.name)
            .field("members", &members)
            .field("validation", &self.validation)
            .finish()
    }
}

/// Construction options for a [`FieldGroup`](super::FieldGroup).
pub struct FieldGroupConfig {
    pub name: String,
    pub members: Vec<Rc<dyn FormField>>,
    pub validation: SuiteConfig<GroupValue>,
}

impl FieldGroupConfig {
    pub fn new(name: impl Into<String>, members: Vec<Rc<dyn FormField>>) -> Self {
        Self {
            name: name.into(),
            members,
            validation: SuiteConfig::new(),
        }
    }

    #[must_use]
    pub fn with_validation(mut self, validation: SuiteConfig<GroupValue>) -> Self {
        self.validation = validation;
        self
    }
}

impl fmt::Debug for FieldGroupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<&str> = self.members.iter().map(|m| m.name()).collect();
        f.debug_struct("FieldGroupConfig")
            .field("name", &self.name)
            .field("members", &members)
            .field("validation", &self.validation)
            .finish()
    }
}
