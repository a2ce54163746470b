//! Contexts become heating and cooling rules.

use super::transform_sentences;
use crate::{Pass, PassError, PassResult};
use kompile_core::{keys, Sort};
use kompile_definition::{labels, Context, Definition, Production, Rule, Sentence, Term};

/// Each context `C[HOLE]` yields
///
/// - a freezer production `#freezer<label><n>(K, ...)` over the context's
///   other variables,
/// - a heat rule `C[HOLE] => HOLE ~> #freezer...(vars)` keeping the
///   context's side condition,
/// - the reverse cool rule.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResolveContexts;

const NAME: &str = "resolve-contexts";

fn hole_count(term: &Term) -> usize {
    term.variable_occurrences()
        .into_iter()
        .filter(|v| v.name == labels::HOLE)
        .count()
}

fn freezer_label(context: &Context, index: usize) -> String {
    format!(
        "{}{}{}",
        labels::FREEZER_PREFIX,
        context.body.top_label().unwrap_or_default(),
        index
    )
}

fn resolve(context: &Context, index: usize) -> PassResult<Vec<Sentence>> {
    let holes = hole_count(&context.body);
    if holes != 1 {
        return Err(PassError::context_holes(&context.body, holes));
    }

    let label = freezer_label(context, index);
    let frozen_vars: Vec<Term> = context
        .body
        .variables()
        .into_iter()
        .filter(|name| name != labels::HOLE)
        .map(Term::var)
        .collect();
    let arity = frozen_vars.len();
    let frozen = Term::apply(&label, frozen_vars);
    let heated = Term::Sequence(vec![Term::var(labels::HOLE), frozen]);

    let mut heat = Rule::new(Term::rewrite(context.body.clone(), heated.clone()))
        .with_attributes(context.attributes.with_marker(keys::HEAT));
    heat.requires = context.requires.clone();
    let cool = Rule::new(Term::rewrite(heated, context.body.clone()))
        .with_attributes(context.attributes.with_marker(keys::COOL));
    let freezer = Production::new(Sort::kitem(), label, vec![Sort::k(); arity]);

    Ok(vec![freezer.into(), heat.into(), cool.into()])
}

impl Pass for ResolveContexts {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, definition: &Definition) -> PassResult<Definition> {
        let mut index = 0;
        transform_sentences(definition, |_, _, sentence| match sentence {
            Sentence::Context(context) => {
                let resolved = resolve(context, index)?;
                index += 1;
                Ok(resolved)
            }
            other => Ok(vec![other.clone()]),
        })
    }
}
