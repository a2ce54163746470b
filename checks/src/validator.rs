//! The Validator - runs sentence checks over a whole definition.

use crate::{CheckRhsVariables, Violations};
use kompile_definition::{Definition, Module, Sentence};
use log::debug;

/// A structural check over one sentence.
pub trait SentenceCheck: Send + Sync {
    /// Name used in violation reports.
    fn name(&self) -> &'static str;

    /// Append any violations found in `sentence` of `module`.
    fn check(&self, module: &Module, sentence: &Sentence, violations: &mut Violations);
}

/// Applies every registered check to every local sentence of every module.
pub struct Validator {
    checks: Vec<Box<dyn SentenceCheck>>,
}

impl Validator {
    /// A validator with no checks.
    pub fn empty() -> Self {
        Self { checks: Vec::new() }
    }

    /// The checks run before compilation.
    pub fn standard() -> Self {
        Self::empty().with_check(CheckRhsVariables)
    }

    pub fn with_check(mut self, check: impl SentenceCheck + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Collect all violations in the definition.
    pub fn validate(&self, definition: &Definition) -> Violations {
        let mut violations = Violations::new();
        for module in definition.modules() {
            for sentence in &module.sentences {
                for check in &self.checks {
                    check.check(module, sentence, &mut violations);
                }
            }
        }
        debug!(
            "Validated {} modules: {} violations",
            definition.module_count(),
            violations.len()
        );
        violations
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::standard()
    }
}
