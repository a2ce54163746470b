//! `!X` variables become applications of fresh-value generators.

use super::anon_vars::GEN_PREFIX;
use super::{transform_rules, FreshNames};
use crate::{Pass, PassError, PassResult};
use kompile_core::{keys, Sort};
use kompile_definition::{
    default_configuration, labels, Configuration, Definition, Rule, Sentence, Term,
    COMPUTATION_CELL,
};
use log::debug;
use std::collections::BTreeMap;

/// The cell holding the fresh-value counter.
pub const COUNTER_CELL: &str = "generatedCounter";
/// Top cell wrapped around configurations that cannot take another child.
pub const GENERATED_TOP_CELL: &str = "generatedTop";

/// Each `!X` of sort `S` on a right-hand side becomes `gen(C +Int n)`, where
/// `gen` is the `freshGenerator` function of `S` and `C` the counter read
/// from `<generatedCounter>`. The rule advances the counter by the number
/// of fresh values it creates, and the configuration gains the counter
/// cell once any rule needs it. A definition without a configuration gets
/// the default one, built around `computation_cell`.
#[derive(Debug, Clone)]
pub struct ResolveFreshConstants {
    computation_cell: String,
}

impl ResolveFreshConstants {
    pub fn new(computation_cell: impl Into<String>) -> Self {
        Self {
            computation_cell: computation_cell.into(),
        }
    }
}

impl Default for ResolveFreshConstants {
    fn default() -> Self {
        Self::new(COMPUTATION_CELL)
    }
}

const NAME: &str = "resolve-fresh-constants";

/// Fresh variables on the right-hand side, with their sorts. Unsorted
/// ones are `Int`.
fn fresh_variables(rule: &Rule) -> BTreeMap<String, Sort> {
    let mut fresh = BTreeMap::new();
    let rhs = rule.body.rhs();
    for term in std::iter::once(&rhs).chain(rule.ensures.iter()) {
        for v in term.variable_occurrences() {
            if v.is_fresh() {
                fresh
                    .entry(v.name.clone())
                    .or_insert_with(|| v.sort.clone().unwrap_or_else(Sort::int));
            }
        }
    }
    fresh
}

fn generator_for(definition: &Definition, sort: &Sort) -> PassResult<String> {
    definition
        .modules()
        .flat_map(|m| m.local_productions())
        .find(|p| &p.sort == sort && p.attributes.contains(keys::FRESH_GENERATOR))
        .and_then(|p| p.klabel.clone())
        .ok_or_else(|| PassError::missing_fresh_generator(sort))
}

fn plus_int(left: Term, right: Term) -> Term {
    Term::apply(labels::PLUS_INT, vec![left, right])
}

fn resolve(definition: &Definition, rule: &Rule) -> PassResult<Option<Rule>> {
    let fresh = fresh_variables(rule);
    if fresh.is_empty() {
        return Ok(None);
    }

    let mut names = FreshNames::avoiding(rule.all_variable_names());
    let counter = Term::sorted_var(names.fresh(GEN_PREFIX), Sort::int());
    let mut replacements = BTreeMap::new();
    for (offset, (name, sort)) in fresh.iter().enumerate() {
        let generator = generator_for(definition, sort)?;
        let value = Term::apply(
            generator,
            vec![plus_int(counter.clone(), Term::int(offset as i64))],
        );
        replacements.insert(name.clone(), value);
    }

    let mut replace = |t: Term| match t {
        Term::Variable(v) => replacements
            .get(&v.name)
            .cloned()
            .unwrap_or(Term::Variable(v)),
        other => other,
    };
    let counter_cell = Term::cell(
        COUNTER_CELL,
        Term::rewrite(
            counter.clone(),
            plus_int(counter, Term::int(fresh.len() as i64)),
        ),
    );
    let body = match rule.body.clone().transform(&mut replace) {
        Term::Bag(mut items) => {
            items.push(counter_cell);
            Term::Bag(items)
        }
        other => Term::Bag(vec![other, counter_cell]),
    };

    Ok(Some(Rule {
        body,
        requires: rule.requires.clone().map(|t| t.transform(&mut replace)),
        ensures: rule.ensures.clone().map(|t| t.transform(&mut replace)),
        attributes: rule.attributes.clone(),
    }))
}

fn counter_initializer() -> Term {
    Term::cell(COUNTER_CELL, Term::int(0))
}

/// The configuration body with the counter cell added under the top cell.
fn add_counter(body: &Term) -> Term {
    if body.any(&|t| matches!(t, Term::Cell(c) if c.name == COUNTER_CELL)) {
        return body.clone();
    }
    let top = match body {
        Term::Bag(items) if items.len() == 1 => &items[0],
        other => other,
    };
    match top {
        Term::Cell(cell) => {
            let children = match cell.body.as_ref() {
                Term::Bag(items) if !items.is_empty() && items.iter().all(Term::is_cell) => {
                    Some(items.clone())
                }
                inner @ Term::Cell(_) => Some(vec![inner.clone()]),
                _ => None,
            };
            match children {
                Some(mut children) => {
                    children.push(counter_initializer());
                    let mut extended = cell.clone();
                    extended.body = Box::new(Term::Bag(children));
                    Term::Cell(extended)
                }
                None => Term::cell(
                    GENERATED_TOP_CELL,
                    Term::Bag(vec![top.clone(), counter_initializer()]),
                ),
            }
        }
        other => other.clone(),
    }
}

fn with_counter_cell(definition: &Definition, computation_cell: &str) -> PassResult<Definition> {
    let main = definition.main_module_name();
    let holder = definition
        .import_closure(main)
        .into_iter()
        .find(|m| m.sentences.iter().any(|s| s.as_configuration().is_some()));

    let module = match holder {
        Some(module) => {
            let mut done = false;
            module.map_sentences(|sentence| -> PassResult<Vec<Sentence>> {
                match sentence {
                    Sentence::Configuration(c) if !done => {
                        done = true;
                        Ok(vec![Sentence::Configuration(Configuration {
                            body: add_counter(&c.body),
                            attributes: c.attributes.clone(),
                        })])
                    }
                    other => Ok(vec![other.clone()]),
                }
            })?
        }
        None => {
            let generated = Configuration::new(Term::cell(
                GENERATED_TOP_CELL,
                Term::Bag(vec![
                    default_configuration(computation_cell),
                    counter_initializer(),
                ]),
            ));
            definition
                .main_module()
                .with_sentences([Sentence::Configuration(generated)])
        }
    };
    Ok(definition.with_module(module)?)
}

impl Pass for ResolveFreshConstants {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, definition: &Definition) -> PassResult<Definition> {
        let mut rewritten = 0;
        let resolved = transform_rules(definition, |definition, rule| {
            Ok(match resolve(definition, rule)? {
                Some(resolved) => {
                    rewritten += 1;
                    resolved
                }
                None => rule.clone(),
            })
        })?;
        if rewritten == 0 {
            return Ok(resolved);
        }
        debug!("{} rules use fresh constants", rewritten);
        with_counter_cell(&resolved, &self.computation_cell)
    }
}
