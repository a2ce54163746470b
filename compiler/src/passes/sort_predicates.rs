//! `is<S>` membership predicates for every sort.

use crate::{Pass, PassResult};
use kompile_core::{keys, Attributes, Sort};
use kompile_definition::{Definition, Module, Production, Sentence};
use log::debug;
use std::collections::BTreeSet;

/// Adds `syntax Bool ::= is<S>(K) [function, predicate(S)]` to the module
/// defining `S`, unless the module already sees such a production. A sort
/// also defined by an imported module gets its predicate there instead.
/// Parser sorts get none.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenerateSortPredicates;

const NAME: &str = "generate-sort-predicates";

fn predicate_production(sort: &Sort) -> Production {
    Production::new(Sort::bool(), sort.predicate_label(), vec![Sort::k()]).with_attributes(
        Attributes::new()
            .with_marker(keys::FUNCTION)
            .with(keys::PREDICATE, sort.name()),
    )
}

/// Sorts the module defines, not counting the result sort of predicates.
pub(crate) fn defined_sorts(module: &Module) -> BTreeSet<Sort> {
    module
        .sentences
        .iter()
        .filter_map(|sentence| match sentence {
            Sentence::SortDecl(decl) => Some(decl.sort.clone()),
            Sentence::Production(p) if !p.attributes.contains(keys::PREDICATE) => {
                Some(p.sort.clone())
            }
            _ => None,
        })
        .collect()
}

fn missing_predicates(definition: &Definition, module: &Module) -> Vec<Sentence> {
    let closure = definition.import_closure(&module.name);
    let visible: BTreeSet<&str> = closure
        .iter()
        .flat_map(|m| m.local_productions())
        .filter_map(|p| p.klabel.as_deref())
        .collect();
    let imported: BTreeSet<Sort> = closure
        .iter()
        .filter(|m| m.name != module.name)
        .flat_map(|m| defined_sorts(m))
        .collect();

    defined_sorts(module)
        .into_iter()
        .filter(|sort| !sort.is_parser_sort())
        .filter(|sort| !imported.contains(sort))
        .filter(|sort| !visible.contains(sort.predicate_label().as_str()))
        .map(|sort| Sentence::Production(predicate_production(&sort)))
        .collect()
}

impl Pass for GenerateSortPredicates {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, definition: &Definition) -> PassResult<Definition> {
        definition.map_modules(|definition, module| {
            let missing = missing_predicates(definition, module);
            if missing.is_empty() {
                return Ok(None);
            }
            debug!("{} sort predicates added to {}", missing.len(), module.name);
            Ok(Some(module.with_sentences(missing)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::parse;
    use super::*;

    fn predicates(definition: &Definition, module: &str) -> Vec<String> {
        definition
            .module(module)
            .unwrap()
            .local_productions()
            .filter(|p| p.attributes.contains(keys::PREDICATE))
            .filter_map(|p| p.klabel.clone())
            .collect()
    }

    #[test]
    fn test_each_sort_gets_a_predicate() {
        // GIVEN a module defining two sorts and a parser sort
        let definition = parse(
            "module M syntax AExp syntax BExp ::= tt syntax #Layout endmodule",
            "M",
        );

        // WHEN predicates are generated
        let out = GenerateSortPredicates.run(&definition).unwrap();

        // THEN both ordinary sorts have one
        assert_eq!(predicates(&out, "M"), vec!["isAExp", "isBExp"]);
        let production = out.productions_for("isAExp")[0];
        assert!(production.is_function());
        assert_eq!(production.params, vec![Sort::k()]);
        assert_eq!(production.attributes.get_str(keys::PREDICATE).unwrap(), Some("AExp"));
    }

    #[test]
    fn test_declared_predicate_is_kept() {
        let definition = parse(
            "module M syntax KResult syntax Bool ::= isKResult(K) [function, predicate(KResult)] endmodule",
            "M",
        );
        let out = GenerateSortPredicates.run(&definition).unwrap();
        assert_eq!(out.productions_for("isKResult").len(), 1);
        assert!(out.productions_for("isBool").is_empty());
    }

    #[test]
    fn test_predicate_lives_in_the_imported_module() {
        // GIVEN a sort extended by an importing module
        let definition = parse(
            r#"
            module BASE syntax Exp ::= zero endmodule
            module EXT imports BASE syntax Exp ::= one endmodule
            "#,
            "EXT",
        );

        // WHEN predicates are generated
        let out = GenerateSortPredicates.run(&definition).unwrap();

        // THEN only the base module declares isExp
        assert_eq!(predicates(&out, "BASE"), vec!["isExp"]);
        assert!(predicates(&out, "EXT").is_empty());
    }

    #[test]
    fn test_generation_is_stable() {
        let definition = parse("module M syntax A endmodule", "M");
        let once = GenerateSortPredicates.run(&definition).unwrap();
        let twice = GenerateSortPredicates.run(&once).unwrap();
        assert_eq!(once, twice);
    }
}
