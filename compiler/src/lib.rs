//! Kompile Compiler
//!
//! Turns a parsed definition into the form a rewrite engine executes:
//! - Batched structural validation before anything else
//! - The twelve ordered passes of the [`Pipeline`]
//! - Synthesis of the `SEMANTICS` and `LANGUAGE-PARSING` modules
//! - Compilation of single rules against a finished compilation
//!
//! [`Kompiler`] ties these together and owns the symbol registry handle.

mod compiled;
mod error;
mod kompile;
mod options;
pub mod passes;
mod pipeline;
pub mod prelude;
mod stopwatch;

pub use compiled::{CompiledDefinition, SymbolTable};
pub use error::{CompileError, CompileResult, PassError, PassResult};
pub use kompile::Kompiler;
pub use options::KompileOptions;
pub use pipeline::{LogObserver, Pass, PassObserver, Pipeline};
pub use prelude::{ID_PROGRAM_PARSING, K_TERM, LANGUAGE_PARSING, PRELUDE, SEMANTICS};
pub use stopwatch::Stopwatch;
