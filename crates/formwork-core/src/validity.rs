//! Validity vocabulary shared by every node.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-state verdict carried by every node's state.
///
/// The derived ordering is `Invalid < Pending < Valid`, so combining
/// validities is taking the minimum: Invalid beats Pending beats Valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validity {
    /// At least one included dependency is invalid
    Invalid,
    /// Nothing is invalid but something is still being checked
    Pending,
    /// Every included dependency is valid
    Valid,
}

impl Validity {
    /// Combine two validities with Invalid > Pending > Valid precedence.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        self.min(other)
    }

    /// Reduce any number of validities. An empty input is Valid.
    pub fn reduce(validities: impl IntoIterator<Item = Self>) -> Self {
        validities.into_iter().fold(Self::Valid, Self::combine)
    }

    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }

    pub fn is_invalid(self) -> bool {
        self == Self::Invalid
    }

    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }

    /// Lowercase label, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Pending => "pending",
            Self::Valid => "valid",
        }
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a group's current validity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValiditySource {
    /// Reduced from member validities; the group's own suite did not run
    Reduction,
    /// Produced by the group's own validator suite
    Validation,
}

/// One diagnostic produced by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub validity: Validity,
}

impl Message {
    pub fn new(text: impl Into<String>, validity: Validity) -> Self {
        Self {
            text: text.into(),
            validity,
        }
    }

    pub fn invalid(text: impl Into<String>) -> Self {
        Self::new(text, Validity::Invalid)
    }

    pub fn pending(text: impl Into<String>) -> Self {
        Self::new(text, Validity::Pending)
    }

    pub fn valid(text: impl Into<String>) -> Self {
        Self::new(text, Validity::Valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(Validity::Valid.combine(Validity::Pending), Validity::Pending);
        assert_eq!(Validity::Pending.combine(Validity::Invalid), Validity::Invalid);
        assert_eq!(Validity::Valid.combine(Validity::Valid), Validity::Valid);
        assert_eq!(Validity::reduce([]), Validity::Valid);
        assert_eq!(
            Validity::reduce([Validity::Valid, Validity::Invalid, Validity::Pending]),
            Validity::Invalid
        );
    }

    #[test]
    fn test_serialized_form() {
        assert_eq!(
            serde_json::to_string(&Validity::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_value(Message::invalid("required")).unwrap(),
            serde_json::json!({"text": "required", "validity": "invalid"})
        );
        assert_eq!(
            serde_json::from_str::<ValiditySource>("\"reduction\"").unwrap(),
            ValiditySource::Reduction
        );
    }
}
