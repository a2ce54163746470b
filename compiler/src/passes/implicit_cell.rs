//! Rules without cells act on the computation cell.

use super::{is_function_rule, transform_rules};
use crate::{Pass, PassResult};
use kompile_definition::{
    default_configuration, Configuration, Definition, Rule, Sentence, Term, COMPUTATION_CELL,
};
use log::debug;

/// Wraps the body of a non-function rule mentioning no cell in an open
/// computation cell, `<k> body ...</k>`. In a bag of cells lacking the
/// computation cell, the non-cell items are wrapped the same way. When no
/// configuration is in scope and the computation cell is not `<k>`, the
/// main module declares one holding just that cell.
#[derive(Debug, Clone)]
pub struct AddImplicitComputationCell {
    cell: String,
}

const NAME: &str = "add-implicit-computation-cell";

impl AddImplicitComputationCell {
    pub fn new(cell: impl Into<String>) -> Self {
        Self { cell: cell.into() }
    }

    fn is_computation_cell(&self, term: &Term) -> bool {
        matches!(term, Term::Cell(c) if c.name == self.cell)
    }

    fn wrap(&self, body: &Term) -> Option<Term> {
        if !body.has_cells() {
            return Some(Term::open_cell(&self.cell, body.clone()));
        }
        let Term::Bag(items) = body else {
            return None;
        };
        if items.iter().any(|t| self.is_computation_cell(t)) {
            return None;
        }
        let (mut cells, rest): (Vec<Term>, Vec<Term>) =
            items.iter().cloned().partition(Term::is_cell);
        if rest.is_empty() {
            return None;
        }
        cells.insert(0, Term::open_cell(&self.cell, Term::sequence(rest)));
        Some(Term::Bag(cells))
    }

    fn with_configuration(&self, definition: &Definition) -> PassResult<Definition> {
        let main = definition.main_module_name();
        let declared = definition
            .sentences_of(main)
            .any(|s| s.as_configuration().is_some());
        if declared || self.cell == COMPUTATION_CELL {
            return Ok(definition.clone());
        }
        debug!("Declaring configuration <{}> in {}", self.cell, main);
        let configuration = Configuration::new(default_configuration(&self.cell));
        let module = definition
            .main_module()
            .with_sentences([Sentence::Configuration(configuration)]);
        Ok(definition.with_module(module)?)
    }

    fn add(&self, definition: &Definition, rule: &Rule) -> Rule {
        if is_function_rule(definition, rule) {
            return rule.clone();
        }
        match self.wrap(&rule.body) {
            Some(body) => Rule {
                body,
                ..rule.clone()
            },
            None => rule.clone(),
        }
    }
}

impl Default for AddImplicitComputationCell {
    fn default() -> Self {
        Self::new(COMPUTATION_CELL)
    }
}

impl Pass for AddImplicitComputationCell {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, definition: &Definition) -> PassResult<Definition> {
        let wrapped =
            transform_rules(definition, |definition, rule| Ok(self.add(definition, rule)))?;
        self.with_configuration(&wrapped)
    }
}
