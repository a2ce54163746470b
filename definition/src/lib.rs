//! Kompile Definition Model
//!
//! Immutable terms, sentences, modules and definitions, plus the cell
//! layout read from a definition's configuration.

mod configuration;
mod definition;
mod error;
mod module;
mod sentence;
mod term;

pub use configuration::{default_configuration, CellInfo, ConfigurationInfo, COMPUTATION_CELL};
pub use definition::Definition;
pub use error::{DefinitionError, DefinitionResult};
pub use module::Module;
pub use sentence::{Configuration, Context, Production, Rule, Sentence, SortDecl};
pub use term::{labels, Apply, Cell, Rewrite, Term, Token, Variable};
