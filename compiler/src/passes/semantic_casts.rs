//! Semantic casts become sorted variables and sort-membership conditions.

use super::transform_rules_and_contexts;
use crate::{Pass, PassResult};
use kompile_core::{sorts, Sort};
use kompile_definition::{labels, Context, Definition, Rule, Term, Variable};
use std::collections::BTreeMap;

/// Removes every `#SemanticCastTo<S>(t)`. A cast variable takes sort `S` at
/// all of its occurrences, and each variable cast on a left-hand side adds
/// `is<S>(V)` to the side condition unless sort predicates are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResolveSemanticCasts {
    skip_sort_predicates: bool,
}

const NAME: &str = "resolve-semantic-casts";

fn cast_sort(label: &str) -> Option<Sort> {
    label
        .strip_prefix(labels::SEMANTIC_CAST_PREFIX)
        .map(Sort::new)
}

/// Variable name to cast sort; the first cast of a name wins.
fn cast_variables<'a>(terms: impl IntoIterator<Item = &'a Term>) -> BTreeMap<String, Sort> {
    let mut casts = BTreeMap::new();
    for term in terms {
        term.visit(&mut |t| {
            let Term::Apply(apply) = t else { return };
            if let (Some(sort), [Term::Variable(v)]) = (cast_sort(&apply.label), apply.args.as_slice()) {
                casts.entry(v.name.clone()).or_insert(sort);
            }
        });
    }
    casts
}

fn strip_casts(term: &Term, sorted: &BTreeMap<String, Sort>) -> Term {
    term.clone().transform(&mut |t| match t {
        Term::Variable(v) => match sorted.get(&v.name) {
            Some(sort) => Term::Variable(Variable {
                name: v.name,
                sort: Some(sort.clone()),
            }),
            None => Term::Variable(v),
        },
        Term::Apply(mut apply)
            if apply.args.len() == 1 && cast_sort(&apply.label).is_some() =>
        {
            apply.args.remove(0)
        }
        other => other,
    })
}

fn needs_predicate(sort: &Sort) -> bool {
    sort.name() != sorts::K && sort.name() != sorts::KITEM
}

impl ResolveSemanticCasts {
    pub fn new(skip_sort_predicates: bool) -> Self {
        Self {
            skip_sort_predicates,
        }
    }

    fn side_condition(&self, requires: Option<Term>, lhs: &Term) -> Option<Term> {
        if self.skip_sort_predicates {
            return requires;
        }
        cast_variables([lhs])
            .into_iter()
            .filter(|(_, sort)| needs_predicate(sort))
            .fold(requires, |acc, (name, sort)| {
                let predicate = Term::apply(sort.predicate_label(), vec![Term::sorted_var(name, sort)]);
                Some(Term::and_bool(acc, predicate))
            })
    }

    pub fn resolve_rule(&self, rule: &Rule) -> Rule {
        let sorted = cast_variables(rule.terms());
        let requires = rule.requires.as_ref().map(|t| strip_casts(t, &sorted));
        Rule {
            body: strip_casts(&rule.body, &sorted),
            requires: self.side_condition(requires, &rule.body.lhs()),
            ensures: rule.ensures.as_ref().map(|t| strip_casts(t, &sorted)),
            attributes: rule.attributes.clone(),
        }
    }

    pub fn resolve_context(&self, context: &Context) -> Context {
        let sorted = cast_variables(std::iter::once(&context.body).chain(context.requires.iter()));
        let requires = context.requires.as_ref().map(|t| strip_casts(t, &sorted));
        Context {
            body: strip_casts(&context.body, &sorted),
            requires: self.side_condition(requires, &context.body),
            attributes: context.attributes.clone(),
        }
    }
}

impl Pass for ResolveSemanticCasts {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, definition: &Definition) -> PassResult<Definition> {
        transform_rules_and_contexts(
            definition,
            |rule| Ok(self.resolve_rule(rule)),
            |context| Ok(self.resolve_context(context)),
        )
    }
}
