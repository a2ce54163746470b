//! The compilation passes, in pipeline order.

mod anon_vars;
mod concretize_cells;
mod contexts;
mod fresh_constants;
mod heat_cool;
mod implicit_cell;
mod io_streams;
mod semantic_casts;
mod semantics_module;
mod sort_predicates;
mod strategy;
mod strict;

pub use anon_vars::ResolveAnonVars;
pub use concretize_cells::{concretize_rule, ConcretizeCells};
pub use contexts::ResolveContexts;
pub use fresh_constants::ResolveFreshConstants;
pub use heat_cool::ResolveHeatCool;
pub use implicit_cell::AddImplicitComputationCell;
pub use io_streams::ResolveIoStreams;
pub use semantic_casts::ResolveSemanticCasts;
pub use semantics_module::{add_semantics_module, AddSemanticsModule};
pub use sort_predicates::GenerateSortPredicates;
pub use strategy::AddStrategyCell;
pub use strict::ResolveStrict;

use crate::PassResult;
use kompile_definition::{Context, Definition, Module, Rule, Sentence};
use std::collections::{BTreeSet, HashMap};

/// Generates variable names that do not clash with names already in use.
#[derive(Debug, Default)]
pub(crate) struct FreshNames {
    taken: BTreeSet<String>,
    counters: HashMap<String, usize>,
}

impl FreshNames {
    pub(crate) fn avoiding(taken: BTreeSet<String>) -> Self {
        Self {
            taken,
            counters: HashMap::new(),
        }
    }

    /// The first `<prefix><n>` not yet taken. Reserves the result.
    pub(crate) fn fresh(&mut self, prefix: &str) -> String {
        let next = self.counters.entry(prefix.to_string()).or_insert(0);
        loop {
            let candidate = format!("{}{}", prefix, next);
            *next += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// Rewrites every sentence of every module; modules whose sentences are
/// unchanged stay shared with the input.
pub(crate) fn transform_sentences<F>(definition: &Definition, mut f: F) -> PassResult<Definition>
where
    F: FnMut(&Definition, &Module, &Sentence) -> PassResult<Vec<Sentence>>,
{
    definition.map_modules(|definition, module| {
        let rewritten = module.map_sentences(|sentence| f(definition, module, sentence))?;
        Ok((rewritten.sentences != module.sentences).then_some(rewritten))
    })
}

/// Rewrites every rule; other sentences pass through.
pub(crate) fn transform_rules<F>(definition: &Definition, mut f: F) -> PassResult<Definition>
where
    F: FnMut(&Definition, &Rule) -> PassResult<Rule>,
{
    transform_sentences(definition, |definition, _, sentence| match sentence {
        Sentence::Rule(rule) => Ok(vec![Sentence::Rule(f(definition, rule)?)]),
        other => Ok(vec![other.clone()]),
    })
}

/// Rewrites every rule and context; other sentences pass through.
pub(crate) fn transform_rules_and_contexts<R, C>(
    definition: &Definition,
    mut on_rule: R,
    mut on_context: C,
) -> PassResult<Definition>
where
    R: FnMut(&Rule) -> PassResult<Rule>,
    C: FnMut(&Context) -> PassResult<Context>,
{
    transform_sentences(definition, |_, _, sentence| match sentence {
        Sentence::Rule(rule) => Ok(vec![Sentence::Rule(on_rule(rule)?)]),
        Sentence::Context(context) => Ok(vec![Sentence::Context(on_context(context)?)]),
        other => Ok(vec![other.clone()]),
    })
}

/// A rule whose left-hand side is headed by a function symbol.
pub(crate) fn is_function_rule(definition: &Definition, rule: &Rule) -> bool {
    let lhs = rule.body.lhs();
    match lhs.top_label() {
        Some(label) => definition
            .productions_for(label)
            .iter()
            .any(|p| p.is_function()),
        None => false,
    }
}
