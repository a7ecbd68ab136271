//! Error types for Formwork
//!
//! Validation failure is data, not an error: a node that fails validation is
//! represented by `Validity::Invalid` plus messages. The types here cover the
//! two remaining cases:
//!
//! - [`ConfigError`]: a construction-time programming mistake. Constructors
//!   fail fast with it.
//! - [`PredicateError`]: a validator predicate that could not produce a
//!   verdict. The validation pipeline converts it into an Invalid result.

/// Construction-time configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A delay before async validation was negative
    #[error("async validation delay must be non-negative, got {delay_ms}ms")]
    NegativeDelay {
        /// The rejected delay in milliseconds
        delay_ms: i64,
    },

    /// A node was given an empty name
    #[error("node name must not be empty")]
    EmptyName,

    /// Two members of the same composite share a name
    #[error("duplicate member `{name}` in `{parent}`")]
    DuplicateMember {
        /// Name of the composite node
        parent: String,
        /// The repeated member name
        name: String,
    },
}

impl ConfigError {
    /// Create a negative delay error
    pub fn negative_delay(delay_ms: i64) -> Self {
        Self::NegativeDelay { delay_ms }
    }

    /// Create a duplicate member error
    pub fn duplicate_member(parent: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateMember {
            parent: parent.into(),
            name: name.into(),
        }
    }
}

/// A validator predicate that failed to produce a verdict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredicateError {
    /// A fallible predicate returned an error
    #[error("{message}")]
    Failed {
        /// The error text reported by the predicate
        message: String,
    },

    /// The predicate panicked
    #[error("validator panicked: {message}")]
    Panicked {
        /// The panic payload, when it was a string
        message: String,
    },
}

impl PredicateError {
    /// Create a failure from any displayable error
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self::Failed {
            message: error.to_string(),
        }
    }

    /// Create a panic error from a caught panic payload
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked { message }
    }
}

/// Result alias for fallible construction
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Reject empty node names.
pub fn ensure_name(name: &str) -> Result<()> {
    if name.is_empty() {
        Err(ConfigError::EmptyName)
    } else {
        Ok(())
    }
}

/// Reject repeated names within one composite.
pub fn ensure_unique_names<'a>(
    parent: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let mut seen = std::collections::BTreeSet::new();
    for name in names {
        ensure_name(name)?;
        if !seen.insert(name) {
            return Err(ConfigError::duplicate_member(parent, name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_delay_message() {
        let err = ConfigError::negative_delay(-5);
        assert_eq!(
            err.to_string(),
            "async validation delay must be non-negative, got -5ms"
        );
    }

    #[test]
    fn test_panic_payload_extraction() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(
            PredicateError::from_panic(payload.as_ref()),
            PredicateError::Panicked {
                message: "boom".to_string()
            }
        );

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(
            PredicateError::from_panic(payload.as_ref()).to_string(),
            "validator panicked: owned boom"
        );
    }

    #[test]
    fn test_unique_names() {
        assert!(ensure_unique_names("group", ["a", "b"]).is_ok());
        assert_eq!(
            ensure_unique_names("group", ["a", "a"]),
            Err(ConfigError::duplicate_member("group", "a"))
        );
        assert_eq!(
            ensure_unique_names("group", ["a", ""]),
            Err(ConfigError::EmptyName)
        );
    }
}
