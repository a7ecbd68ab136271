//! Declarative validator templates.
//!
//! A template is a description that instantiates a fresh validator. Factory
//! layers build node graphs from templates; the built-in string templates
//! below can be deserialized from JSON for that purpose:
//!
//! ```json
//! { "min_length": { "min": 8, "invalid_message": "Too short" } }
//! ```

use serde::Deserialize;

use super::validator::{AsyncValidator, Validator};

/// Instantiates synchronous validators.
pub trait ValidatorTemplate<V> {
    fn instantiate(&self) -> Validator<V>;
}

/// Instantiates asynchronous validators.
pub trait AsyncValidatorTemplate<V> {
    fn instantiate(&self) -> AsyncValidator<V>;
}

impl<V, F> ValidatorTemplate<V> for F
where
    F: Fn() -> Validator<V>,
{
    fn instantiate(&self) -> Validator<V> {
        self()
    }
}

impl<V, F> AsyncValidatorTemplate<V> for F
where
    F: Fn() -> AsyncValidator<V>,
{
    fn instantiate(&self) -> AsyncValidator<V> {
        self()
    }
}

fn with_messages<V: 'static>(
    validator: Validator<V>,
    valid_message: &Option<String>,
    invalid_message: &Option<String>,
) -> Validator<V> {
    let validator = match valid_message {
        Some(message) => validator.with_valid_message(message.clone()),
        None => validator,
    };
    match invalid_message {
        Some(message) => validator.with_invalid_message(message.clone()),
        None => validator,
    }
}

/// Non-empty after trimming whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Required {
    #[serde(default)]
    pub valid_message: Option<String>,
    #[serde(default)]
    pub invalid_message: Option<String>,
}

impl Required {
    pub fn new(invalid_message: impl Into<String>) -> Self {
        Self {
            valid_message: None,
            invalid_message: Some(invalid_message.into()),
        }
    }
}

impl<V: AsRef<str> + 'static> ValidatorTemplate<V> for Required {
    fn instantiate(&self) -> Validator<V> {
        with_messages(
            Validator::new(|value: &V| !value.as_ref().trim().is_empty()),
            &self.valid_message,
            &self.invalid_message,
        )
    }
}

/// At least `min` characters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MinLength {
    pub min: usize,
    #[serde(default)]
    pub valid_message: Option<String>,
    #[serde(default)]
    pub invalid_message: Option<String>,
}

impl MinLength {
    pub fn new(min: usize, invalid_message: impl Into<String>) -> Self {
        Self {
            min,
            valid_message: None,
            invalid_message: Some(invalid_message.into()),
        }
    }
}

impl<V: AsRef<str> + 'static> ValidatorTemplate<V> for MinLength {
    fn instantiate(&self) -> Validator<V> {
        let min = self.min;
        with_messages(
            Validator::new(move |value: &V| value.as_ref().chars().count() >= min),
            &self.valid_message,
            &self.invalid_message,
        )
    }
}

/// At most `max` characters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MaxLength {
    pub max: usize,
    #[serde(default)]
    pub valid_message: Option<String>,
    #[serde(default)]
    pub invalid_message: Option<String>,
}

impl MaxLength {
    pub fn new(max: usize, invalid_message: impl Into<String>) -> Self {
        Self {
            max,
            valid_message: None,
            invalid_message: Some(invalid_message.into()),
        }
    }
}

impl<V: AsRef<str> + 'static> ValidatorTemplate<V> for MaxLength {
    fn instantiate(&self) -> Validator<V> {
        let max = self.max;
        with_messages(
            Validator::new(move |value: &V| value.as_ref().chars().count() <= max),
            &self.valid_message,
            &self.invalid_message,
        )
    }
}

/// Character classes a string must contain at least one of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterClass {
    Uppercase,
    Lowercase,
    Digit,
}

impl CharacterClass {
    fn matches(self, c: char) -> bool {
        match self {
            Self::Uppercase => c.is_uppercase(),
            Self::Lowercase => c.is_lowercase(),
            Self::Digit => c.is_ascii_digit(),
        }
    }
}

/// Contains at least one character of `class`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Includes {
    pub class: CharacterClass,
    #[serde(default)]
    pub valid_message: Option<String>,
    #[serde(default)]
    pub invalid_message: Option<String>,
}

impl Includes {
    pub fn new(class: CharacterClass, invalid_message: impl Into<String>) -> Self {
        Self {
            class,
            valid_message: None,
            invalid_message: Some(invalid_message.into()),
        }
    }

    pub fn uppercase(invalid_message: impl Into<String>) -> Self {
        Self::new(CharacterClass::Uppercase, invalid_message)
    }

    pub fn lowercase(invalid_message: impl Into<String>) -> Self {
        Self::new(CharacterClass::Lowercase, invalid_message)
    }

    pub fn digit(invalid_message: impl Into<String>) -> Self {
        Self::new(CharacterClass::Digit, invalid_message)
    }
}

impl<V: AsRef<str> + 'static> ValidatorTemplate<V> for Includes {
    fn instantiate(&self) -> Validator<V> {
        let class = self.class;
        with_messages(
            Validator::new(move |value: &V| value.as_ref().chars().any(|c| class.matches(c))),
            &self.valid_message,
            &self.invalid_message,
        )
    }
}

/// Any built-in string template, tagged by name for declarative configs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringTemplate {
    Required(Required),
    MinLength(MinLength),
    MaxLength(MaxLength),
    Includes(Includes),
}

impl<V: AsRef<str> + 'static> ValidatorTemplate<V> for StringTemplate {
    fn instantiate(&self) -> Validator<V> {
        match self {
            Self::Required(template) => template.instantiate(),
            Self::MinLength(template) => template.instantiate(),
            Self::MaxLength(template) => template.instantiate(),
            Self::Includes(template) => template.instantiate(),
        }
    }
}
