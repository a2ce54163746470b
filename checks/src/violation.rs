//! Structural violation types.

use kompile_core::Location;
use std::fmt;

/// Severity of a structural violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationSeverity {
    /// Blocks compilation.
    Error,
    /// Reported only.
    Warning,
}

/// A structural violation found in one sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The check that reported the violation.
    pub check: String,
    /// The severity of the violation.
    pub severity: ViolationSeverity,
    pub message: String,
    /// Module holding the offending sentence.
    pub module: Option<String>,
    /// Where the sentence came from, if known.
    pub source: Option<String>,
    pub location: Option<Location>,
}

impl Violation {
    pub fn new(
        check: impl Into<String>,
        severity: ViolationSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check: check.into(),
            severity,
            message: message.into(),
            module: None,
            source: None,
            location: None,
        }
    }

    /// A violation that blocks compilation.
    pub fn error(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(check, ViolationSeverity::Error, message)
    }

    /// A violation that is only logged.
    pub fn warning(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(check, ViolationSeverity::Warning, message)
    }

    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn at(mut self, source: Option<&str>, location: Option<Location>) -> Self {
        self.source = source.map(str::to_string);
        self.location = location;
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, ViolationSeverity::Error)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.check)?;
        if let Some(module) = &self.module {
            write!(f, " module {}", module)?;
        }
        if let Some(source) = &self.source {
            write!(f, " in {}", source)?;
        }
        if let Some(location) = &self.location {
            write!(f, " at {}", location)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Everything the validator reported for one definition, in the order the
/// sentences were visited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Whether anything reported blocks compilation.
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn all(&self) -> &[Violation] {
        &self.violations
    }

    /// The violations that block compilation.
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_error())
    }

    /// Number of violations of either severity.
    pub fn len(&self) -> usize {
        self.violations.len()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_display() {
        // GIVEN a violation with full context
        let violation = Violation::error("rhs-variables", "unbound variable Y")
            .in_module("IMP")
            .at(Some("imp.k"), Some(Location::new(3, 5)));

        // THEN every part is rendered
        assert_eq!(
            violation.to_string(),
            "[rhs-variables] module IMP in imp.k at line 3, column 5: unbound variable Y"
        );
    }

    #[test]
    fn test_only_errors_block() {
        // GIVEN a collection holding a single warning
        let mut violations = Violations::new();
        violations.push(Violation::warning("shadowing", "X shadows a configuration variable"));

        // THEN nothing blocks compilation yet
        assert!(!violations.has_errors());

        // WHEN an unbound variable is reported
        violations.push(Violation::error("rhs-variables", "unbound variable Y"));

        // THEN one of the two violations blocks
        assert!(violations.has_errors());
        assert_eq!(violations.errors().count(), 1);
        assert_eq!(violations.len(), 2);
    }
}
