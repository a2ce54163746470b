//! Definition construction errors.

use thiserror::Error;

/// Errors raised when assembling a [`crate::Definition`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("Duplicate module '{0}'")]
    DuplicateModule(String),

    #[error("Main module '{0}' is not defined")]
    UnknownMainModule(String),

    #[error("Module '{module}' imports unknown module '{import}'")]
    UnresolvedImport { module: String, import: String },

    #[error("Import cycle through module '{0}'")]
    ImportCycle(String),

    #[error("Malformed configuration: {0}")]
    MalformedConfiguration(String),
}

impl DefinitionError {
    pub fn unresolved_import(module: impl Into<String>, import: impl Into<String>) -> Self {
        Self::UnresolvedImport {
            module: module.into(),
            import: import.into(),
        }
    }

    pub fn malformed_configuration(message: impl Into<String>) -> Self {
        Self::MalformedConfiguration(message.into())
    }
}

/// Result type for definition operations.
pub type DefinitionResult<T> = Result<T, DefinitionError>;
