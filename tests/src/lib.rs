//! Integration test support for kompile.
//!
//! A [`Scenario`] compiles one definition with a fresh registry and records
//! which passes ran; [`assertion`] compares compiled rules modulo the names
//! the compiler generates.

pub mod assertion;
mod scenario;

pub use scenario::{Outcome, PassLog, Scenario};

pub mod prelude {
    pub use crate::assertion::{assert_same_rule, normalize_fresh};
    pub use crate::{Outcome, PassLog, Scenario};
    pub use kompile_compiler::{
        CompileError, CompiledDefinition, KompileOptions, Kompiler, Pass, PassError, Pipeline,
    };
    pub use kompile_core::{keys, Attributes, Sort, SortSignature};
    pub use kompile_definition::{Definition, Rule, Sentence, Term};
    pub use kompile_registry::{Symbol, SymbolRecord, SymbolRegistry};
}
