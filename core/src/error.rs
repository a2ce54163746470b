//! Common error types for the core crate.

use thiserror::Error;

/// Errors that can occur when extracting typed values from an attribute set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// The attribute is present but holds a different kind of value.
    #[error("Attribute '{key}' has type {actual}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The attribute value could not be parsed from its textual form.
    #[error("Malformed value for attribute '{key}': {value}")]
    Malformed { key: String, value: String },
}

impl AttributeError {
    pub fn type_mismatch(key: impl Into<String>, expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch {
            key: key.into(),
            expected,
            actual,
        }
    }

    pub fn malformed(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Malformed {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Result type for attribute lookups.
pub type AttributeResult<T> = Result<T, AttributeError>;
