//! Registry errors.

use thiserror::Error;

/// Errors raised while reconciling persisted symbols with a live registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The registry already holds the key under a different ordinal.
    #[error("Symbol '{label}' has ordinal {live} in the registry but {persisted} in persisted data")]
    OrdinalMismatch {
        label: String,
        live: usize,
        persisted: usize,
    },

    /// Adopting the record would leave a gap or reuse an ordinal.
    #[error("Symbol '{label}' was persisted with ordinal {persisted} but the next free ordinal is {next}")]
    OrdinalGap {
        label: String,
        persisted: usize,
        next: usize,
    },
}

impl RegistryError {
    pub fn ordinal_mismatch(label: impl Into<String>, live: usize, persisted: usize) -> Self {
        Self::OrdinalMismatch {
            label: label.into(),
            live,
            persisted,
        }
    }

    pub fn ordinal_gap(label: impl Into<String>, persisted: usize, next: usize) -> Self {
        Self::OrdinalGap {
            label: label.into(),
            persisted,
            next,
        }
    }

    /// Critical errors mean ordinals can no longer be trusted as indices;
    /// callers must abort rather than continue.
    pub fn is_critical(&self) -> bool {
        match self {
            RegistryError::OrdinalMismatch { .. } | RegistryError::OrdinalGap { .. } => true,
        }
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
