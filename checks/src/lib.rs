//! Kompile Checks
//!
//! Structural well-formedness checks run over a parsed definition before
//! compilation. All violations are collected; nothing stops at the first.

mod rhs_variables;
mod validator;
mod violation;

pub use rhs_variables::CheckRhsVariables;
pub use validator::{SentenceCheck, Validator};
pub use violation::{Violation, ViolationSeverity, Violations};
