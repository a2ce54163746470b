//! Right-hand-side variables must be bound.

use crate::{SentenceCheck, Violation, Violations};
use kompile_definition::{labels, Context, Module, Rule, Sentence};
use std::collections::BTreeSet;

/// Every variable on a rule's right-hand side or in its `ensures` clause
/// must occur in its left-hand side or `requires` clause. Existential (`?`)
/// and fresh (`!`) variables are exempt. For contexts, variables of the
/// `requires` clause must occur in the body.
#[derive(Debug, Default, Clone, Copy)]
pub struct CheckRhsVariables;

pub const CHECK_NAME: &str = "rhs-variables";

fn is_exempt(name: &str) -> bool {
    name.starts_with(labels::EXISTENTIAL_PREFIX) || name.starts_with(labels::FRESH_PREFIX)
}

impl CheckRhsVariables {
    fn check_rule(&self, module: &Module, rule: &Rule, violations: &mut Violations) {
        let mut bound = rule.body.lhs().variables();
        if let Some(requires) = &rule.requires {
            bound.extend(requires.variables());
        }

        let mut used: BTreeSet<String> = rule.body.rhs().variables();
        if let Some(ensures) = &rule.ensures {
            used.extend(ensures.variables());
        }

        for name in used.difference(&bound).filter(|n| !is_exempt(n)) {
            violations.push(
                Violation::error(
                    CHECK_NAME,
                    format!(
                        "Found variable {} on right hand side of rule, not bound on left hand side. Did you mean \"?{}\"?",
                        name,
                        name.trim_start_matches('_')
                    ),
                )
                .in_module(&module.name)
                .at(rule.attributes.source(), rule.attributes.location()),
            );
        }
    }

    fn check_context(&self, module: &Module, context: &Context, violations: &mut Violations) {
        let Some(requires) = &context.requires else {
            return;
        };
        let bound = context.body.variables();
        for name in requires
            .variables()
            .difference(&bound)
            .filter(|n| !is_exempt(n))
        {
            violations.push(
                Violation::error(
                    CHECK_NAME,
                    format!("Found variable {} in side condition of context, not bound in its body", name),
                )
                .in_module(&module.name)
                .at(context.attributes.source(), context.attributes.location()),
            );
        }
    }
}

impl SentenceCheck for CheckRhsVariables {
    fn name(&self) -> &'static str {
        CHECK_NAME
    }

    fn check(&self, module: &Module, sentence: &Sentence, violations: &mut Violations) {
        match sentence {
            Sentence::Rule(rule) => self.check_rule(module, rule, violations),
            Sentence::Context(context) => self.check_context(module, context, violations),
            _ => {}
        }
    }
}
