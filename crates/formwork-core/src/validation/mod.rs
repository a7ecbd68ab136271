//! Validation pipeline: validators, templates and suites.

mod suite;
mod templates;
mod validator;

pub use suite::{
    AsyncValidatorSuite, CombinedValidationResult, CombinedValidatorSuite, SuiteConfig,
    ValidationResult, ValidatorSuite,
};
pub use templates::{
    AsyncValidatorTemplate, CharacterClass, Includes, MaxLength, MinLength, Required,
    StringTemplate, ValidatorTemplate,
};
pub use validator::{AsyncValidator, Validator, ValidatorResult};
