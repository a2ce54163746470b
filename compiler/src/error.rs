//! Compiler error types.

use kompile_checks::Violations;
use kompile_core::AttributeError;
use kompile_definition::DefinitionError;
use thiserror::Error;

/// Errors raised by a single pass.
#[derive(Debug, Error)]
pub enum PassError {
    /// A `stream` attribute naming neither `stdin` nor `stdout`.
    #[error("Unknown stream '{stream}' on cell <{cell}>")]
    UnknownStream { cell: String, stream: String },

    /// A strict position outside the production's arity.
    #[error("Strict position {position} of '{label}' is out of range 1..={arity}")]
    StrictPosition {
        label: String,
        position: u32,
        arity: usize,
    },

    /// A context must mention `HOLE` exactly once.
    #[error("Context {context} has {holes} holes, expected exactly one")]
    ContextHoles { context: String, holes: usize },

    /// A heat or cool rule without `HOLE`.
    #[error("Heating/cooling rule {rule} does not mention HOLE")]
    MissingHole { rule: String },

    /// `!X` of a sort with no `freshGenerator` production.
    #[error("No freshGenerator function for sort {sort}")]
    MissingFreshGenerator { sort: String },

    /// A rule mentions a cell the configuration does not declare.
    #[error("Cell <{cell}> is not declared in the configuration")]
    UnknownCell { cell: String },

    /// A non-function rule whose body cannot be placed into cells.
    #[error("Rule {rule} has no cell structure")]
    NoCellStructure { rule: String },

    /// A module the pass needs is absent.
    #[error("Module {name} is required but not defined")]
    MissingModule { name: String },

    /// Any other malformed input.
    #[error("{0}")]
    Malformed(String),

    #[error(transparent)]
    Attribute(#[from] AttributeError),

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

impl PassError {
    pub fn unknown_stream(cell: impl Into<String>, stream: impl Into<String>) -> Self {
        Self::UnknownStream {
            cell: cell.into(),
            stream: stream.into(),
        }
    }

    pub fn strict_position(label: impl Into<String>, position: u32, arity: usize) -> Self {
        Self::StrictPosition {
            label: label.into(),
            position,
            arity,
        }
    }

    pub fn context_holes(context: impl ToString, holes: usize) -> Self {
        Self::ContextHoles {
            context: context.to_string(),
            holes,
        }
    }

    pub fn missing_hole(rule: impl ToString) -> Self {
        Self::MissingHole {
            rule: rule.to_string(),
        }
    }

    pub fn missing_fresh_generator(sort: impl ToString) -> Self {
        Self::MissingFreshGenerator {
            sort: sort.to_string(),
        }
    }

    pub fn unknown_cell(cell: impl Into<String>) -> Self {
        Self::UnknownCell { cell: cell.into() }
    }

    pub fn no_cell_structure(rule: impl ToString) -> Self {
        Self::NoCellStructure {
            rule: rule.to_string(),
        }
    }

    pub fn missing_module(name: impl Into<String>) -> Self {
        Self::MissingModule { name: name.into() }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

/// Result type for a single pass.
pub type PassResult<T> = Result<T, PassError>;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Parse error from the parser.
    #[error("Parse error: {0}")]
    Parse(#[from] kompile_parser::ParseError),

    /// The validator found blocking problems; no pass ran. `count` is the
    /// number of errors, `violations` also holds any warnings.
    #[error("Had {count} structural errors.\n{violations}")]
    StructuralErrors { count: usize, violations: Violations },

    /// A pipeline pass failed; later passes did not run.
    #[error("Pass '{pass}' failed: {source}")]
    Pass {
        pass: &'static str,
        #[source]
        source: PassError,
    },

    /// No main module was given.
    #[error("No main module configured")]
    MissingMainModule,

    /// Symbol registry error.
    #[error("Registry error: {0}")]
    Registry(#[from] kompile_registry::RegistryError),

    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),
}

impl CompileError {
    pub fn structural(violations: Violations) -> Self {
        Self::StructuralErrors {
            count: violations.errors().count(),
            violations,
        }
    }

    pub fn pass(pass: &'static str, source: PassError) -> Self {
        Self::Pass { pass, source }
    }

    /// Critical errors mean the symbol tables are inconsistent and the
    /// process must not continue with them.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Registry(e) if e.is_critical())
    }
}

/// Result type for compiler operations.
pub type CompileResult<T> = Result<T, CompileError>;
