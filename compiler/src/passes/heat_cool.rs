//! Side conditions of heating and cooling rules.

use super::transform_rules;
use crate::{Pass, PassError, PassResult};
use kompile_definition::{labels, Definition, Rule, Term};

/// Heat rules only fire on non-results, cool rules only on results.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResolveHeatCool;

const NAME: &str = "resolve-heat-cool";

fn is_kresult_hole() -> Term {
    Term::apply(labels::IS_KRESULT, vec![Term::var(labels::HOLE)])
}

fn resolve(rule: &Rule) -> PassResult<Rule> {
    let condition = if rule.is_heat() {
        Term::apply(labels::NOT_BOOL, vec![is_kresult_hole()])
    } else if rule.is_cool() {
        is_kresult_hole()
    } else {
        return Ok(rule.clone());
    };
    if !rule.body.variables().contains(labels::HOLE) {
        return Err(PassError::missing_hole(rule));
    }
    let mut resolved = rule.clone();
    resolved.requires = Some(Term::and_bool(rule.requires.clone(), condition));
    Ok(resolved)
}

impl Pass for ResolveHeatCool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, definition: &Definition) -> PassResult<Definition> {
        transform_rules(definition, |_, rule| resolve(rule))
    }
}
