//! The SEMANTICS and LANGUAGE-PARSING modules.

use super::sort_predicates::defined_sorts;
use crate::prelude::{ID_PROGRAM_PARSING, K_TERM, LANGUAGE_PARSING, SEMANTICS};
use crate::{Pass, PassError, PassResult};
use kompile_core::{sorts, Sort};
use kompile_definition::{Definition, Module, Production};
use log::debug;
use std::collections::BTreeSet;

#[derive(Debug, Default, Clone, Copy)]
pub struct AddSemanticsModule;

const NAME: &str = "add-semantics-module";

fn injectable(sort: &Sort) -> bool {
    !sort.is_parser_sort() && sort.name() != sorts::K && sort.name() != sorts::KITEM
}

/// Adds `SEMANTICS`, which imports the main module and injects every sort
/// defined in its closure into `KItem`, and `LANGUAGE-PARSING`, which
/// combines the main module with the term and program-parsing grammars.
/// `SEMANTICS` becomes the main module.
pub fn add_semantics_module(definition: &Definition) -> PassResult<Definition> {
    let main = definition.main_module_name().to_string();
    for required in [K_TERM, ID_PROGRAM_PARSING] {
        if definition.module(required).is_none() {
            return Err(PassError::missing_module(required));
        }
    }

    let injected: BTreeSet<Sort> = definition
        .import_closure(&main)
        .into_iter()
        .flat_map(|m| defined_sorts(m))
        .filter(injectable)
        .collect();
    debug!("{} sorts injected into {}", injected.len(), sorts::KITEM);

    let semantics = injected
        .into_iter()
        .fold(Module::new(SEMANTICS).import(&main), |module, sort| {
            module.sentence(Production::subsort(Sort::kitem(), sort))
        });
    let parsing = Module::new(LANGUAGE_PARSING)
        .import(&main)
        .import(K_TERM)
        .import(ID_PROGRAM_PARSING);

    Ok(definition
        .with_module(semantics)?
        .with_module(parsing)?
        .with_main_module(SEMANTICS)?)
}

impl Pass for AddSemanticsModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, definition: &Definition) -> PassResult<Definition> {
        add_semantics_module(definition)
    }
}
