//! Anonymous variables get names.

use super::{transform_rules_and_contexts, FreshNames};
use crate::{Pass, PassResult};
use kompile_definition::{Context, Definition, Rule, Term, Variable};

/// Prefix of generated variable names.
pub(crate) const GEN_PREFIX: &str = "_Gen";

/// Replaces each `_` in a rule or context with a distinct `_Gen<n>`
/// variable that does not clash with any other name in the sentence.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResolveAnonVars;

const NAME: &str = "resolve-anon-vars";

fn name_anonymous(term: &Term, names: &mut FreshNames) -> Term {
    term.clone().transform(&mut |t| match t {
        Term::Variable(v) if v.is_anonymous() => Term::Variable(Variable {
            name: names.fresh(GEN_PREFIX),
            sort: v.sort,
        }),
        other => other,
    })
}

impl ResolveAnonVars {
    pub fn resolve_rule(rule: &Rule) -> Rule {
        let mut names = FreshNames::avoiding(rule.all_variable_names());
        Rule {
            body: name_anonymous(&rule.body, &mut names),
            requires: rule.requires.as_ref().map(|t| name_anonymous(t, &mut names)),
            ensures: rule.ensures.as_ref().map(|t| name_anonymous(t, &mut names)),
            attributes: rule.attributes.clone(),
        }
    }

    pub fn resolve_context(context: &Context) -> Context {
        let mut taken = context.body.variables();
        if let Some(requires) = &context.requires {
            taken.extend(requires.variables());
        }
        let mut names = FreshNames::avoiding(taken);
        Context {
            body: name_anonymous(&context.body, &mut names),
            requires: context
                .requires
                .as_ref()
                .map(|t| name_anonymous(t, &mut names)),
            attributes: context.attributes.clone(),
        }
    }
}

impl Pass for ResolveAnonVars {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, definition: &Definition) -> PassResult<Definition> {
        transform_rules_and_contexts(
            definition,
            |rule| Ok(Self::resolve_rule(rule)),
            |context| Ok(Self::resolve_context(context)),
        )
    }
}
