//! Cell fragments are placed into the full configuration nesting.

use super::{is_function_rule, transform_rules, FreshNames};
use crate::{Pass, PassError, PassResult};
use kompile_definition::{labels, Cell, ConfigurationInfo, Definition, Rule, Term};
use std::collections::BTreeMap;

/// Prefix of variables standing for cell content a rule does not mention.
pub const DOT_VAR_PREFIX: &str = "DotVar";

/// Rebuilds each non-function rule body as a single top cell. Cells the
/// rule mentions keep their content; each parent whose children are not
/// all mentioned gets one `DotVar<n>` for the rest, unless the rule already
/// names the rest with a variable; open leaf cells are closed with a
/// `DotVar<n>` on their open side.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConcretizeCells;

const NAME: &str = "concretize-cells";

struct Concretizer<'a> {
    configuration: &'a ConfigurationInfo,
    fragments: BTreeMap<String, Cell>,
    /// Variables written beside child cells, by parent cell.
    rest: BTreeMap<String, Term>,
    names: FreshNames,
}

impl<'a> Concretizer<'a> {
    fn collect(&mut self, rule: &Rule, term: &Term) -> PassResult<()> {
        let Term::Cell(cell) = term else {
            return Err(PassError::no_cell_structure(rule));
        };
        if !self.configuration.contains(&cell.name) {
            return Err(PassError::unknown_cell(&cell.name));
        }
        let nested = match cell.body.as_ref() {
            Term::Bag(items) if items.iter().any(Term::is_cell) => items.iter().collect(),
            inner @ Term::Cell(_) => vec![inner],
            _ => Vec::new(),
        };
        if self.configuration.is_leaf(&cell.name) || nested.is_empty() {
            if self.fragments.insert(cell.name.clone(), cell.clone()).is_some() {
                return Err(PassError::malformed(format!(
                    "cell <{}> appears twice in rule {}",
                    cell.name, rule
                )));
            }
            return Ok(());
        }
        for item in nested {
            match item {
                Term::Variable(_) => {
                    self.rest.insert(cell.name.clone(), item.clone());
                }
                other => self.collect(rule, other)?,
            }
        }
        Ok(())
    }

    fn mentions(&self, name: &str) -> bool {
        self.fragments.contains_key(name)
            || self
                .configuration
                .children(name)
                .iter()
                .any(|child| self.mentions(child))
    }

    fn dot_var(&mut self) -> Term {
        Term::var(self.names.fresh(DOT_VAR_PREFIX))
    }

    fn close(&mut self, mut cell: Cell) -> Term {
        if !cell.left_open && !cell.right_open {
            return Term::Cell(cell);
        }
        let mut items = Vec::new();
        if cell.left_open {
            items.push(self.dot_var());
        }
        items.push(*cell.body);
        if cell.right_open {
            items.push(self.dot_var());
        }
        cell.body = Box::new(Term::sequence(items));
        cell.left_open = false;
        cell.right_open = false;
        Term::Cell(cell)
    }

    fn build(&mut self, name: &str) -> Term {
        if let Some(fragment) = self.fragments.remove(name) {
            return self.close(fragment);
        }
        let children = self.configuration.children(name).to_vec();
        let mut items: Vec<Term> = Vec::new();
        let mut missing = false;
        for child in &children {
            if self.mentions(child) {
                items.push(self.build(child));
            } else {
                missing = true;
            }
        }
        match self.rest.remove(name) {
            Some(rest) => items.push(rest),
            None if missing => items.push(self.dot_var()),
            None => {}
        }
        let body = if items.len() == 1 {
            items.remove(0)
        } else {
            Term::Bag(items)
        };
        Term::cell(name, body)
    }
}

/// Concretizes one rule against `configuration`. Function rules are
/// returned unchanged.
pub fn concretize_rule(
    rule: &Rule,
    configuration: &ConfigurationInfo,
    definition: &Definition,
) -> PassResult<Rule> {
    if is_function_rule(definition, rule) {
        return Ok(rule.clone());
    }
    let items = match &rule.body {
        Term::Bag(items) => items.iter().collect(),
        cell @ Term::Cell(_) => vec![cell],
        _ => return Err(PassError::no_cell_structure(rule)),
    };
    let mut concretizer = Concretizer {
        configuration,
        fragments: BTreeMap::new(),
        rest: BTreeMap::new(),
        names: FreshNames::avoiding(rule.all_variable_names()),
    };
    for item in items {
        concretizer.collect(rule, item)?;
    }
    if concretizer.fragments.is_empty() {
        return Err(PassError::no_cell_structure(rule));
    }
    let body = concretizer.build(configuration.top_cell());
    if !concretizer.fragments.is_empty() {
        let unplaced: Vec<String> = concretizer
            .fragments
            .keys()
            .map(|name| labels::cell(name))
            .collect();
        return Err(PassError::malformed(format!(
            "{} inside the content of an enclosing cell in rule {}",
            unplaced.join(", "),
            rule
        )));
    }
    Ok(Rule {
        body,
        ..rule.clone()
    })
}

impl Pass for ConcretizeCells {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, definition: &Definition) -> PassResult<Definition> {
        let configuration =
            ConfigurationInfo::for_module(definition, definition.main_module_name())?;
        transform_rules(definition, |definition, rule| {
            concretize_rule(rule, &configuration, definition)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{parse, rules};
    use super::*;
    use pretty_assertions::assert_eq;

    const CONFIG: &str =
        "configuration <T> <k> $PGM:K </k> <env> .Map </env> <store> .Map </store> </T>";

    fn concretize(rule: &str) -> PassResult<Vec<String>> {
        let definition = parse(&format!("module M {} {} endmodule", CONFIG, rule), "M");
        let out = ConcretizeCells.run(&definition)?;
        Ok(rules(&out, "M").iter().map(|r| r.body.to_string()).collect())
    }

    #[test]
    fn test_missing_siblings_become_dot_var() {
        // GIVEN a rule mentioning only <k>
        let found = concretize("rule <k> a => b ...</k>").unwrap();

        // THEN it sits under <T>, with one variable for the other cells
        assert_eq!(
            found,
            vec!["<T> <k> (a => b) ~> DotVar0 </k> DotVar1 </T>"]
        );
    }

    #[test]
    fn test_cells_follow_configuration_order() {
        let found = concretize("rule <store> S </store> <k> a ...</k> <env> E </env>").unwrap();
        assert_eq!(
            found,
            vec!["<T> <k> a ~> DotVar0 </k> <env> E </env> <store> S </store> </T>"]
        );
    }

    #[test]
    fn test_nested_fragments_are_flattened() {
        let found = concretize("rule <T> <env> E </env> </T>").unwrap();
        assert_eq!(found, vec!["<T> <env> E </env> DotVar0 </T>"]);
    }

    #[test]
    fn test_left_open_cell() {
        let found = concretize("rule <k>... a </k>").unwrap();
        assert_eq!(found, vec!["<T> <k> DotVar0 ~> a </k> DotVar1 </T>"]);
    }

    #[test]
    fn test_dot_var_avoids_rule_names() {
        let found = concretize("rule <k> DotVar0 ...</k>").unwrap();
        assert_eq!(found, vec!["<T> <k> DotVar0 ~> DotVar1 </k> DotVar2 </T>"]);
    }

    #[test]
    fn test_concretized_rule_is_stable() {
        // GIVEN a rule that already has the full nesting
        let once = concretize("rule <k> a => b ...</k>").unwrap();
        let rule = format!("rule {}", once[0]);

        // WHEN concretized again
        let twice = concretize(&rule).unwrap();

        // THEN the variable for the other cells is reused
        assert_eq!(twice, once);
    }

    #[test]
    fn test_unknown_cell() {
        let err = concretize("rule <heap> H </heap>").unwrap_err();
        assert!(matches!(err, PassError::UnknownCell { ref cell } if cell == "heap"));
    }

    #[test]
    fn test_rule_without_cells_fails() {
        let err = concretize("rule foo(X) => X").unwrap_err();
        assert!(matches!(err, PassError::NoCellStructure { .. }));
    }

    #[test]
    fn test_function_rules_unchanged() {
        let found =
            concretize("syntax Int ::= inc(Int) [function] rule inc(X) => X").unwrap();
        assert_eq!(found, vec!["(inc(X) => X)"]);
    }

    #[test]
    fn test_duplicate_cell_is_malformed() {
        let err = concretize("rule <k> a </k> <k> b </k>").unwrap_err();
        assert!(matches!(err, PassError::Malformed(_)));
    }

    #[test]
    fn test_cell_under_opaque_parent_is_malformed() {
        // GIVEN a rule giving <T> plain content and also mentioning <k>
        let err = concretize("rule <T> X </T> <k> a => b </k>").unwrap_err();

        // THEN the <k> rewrite is not dropped silently
        match err {
            PassError::Malformed(message) => assert!(message.contains("<k>"), "{}", message),
            other => panic!("expected a malformed rule, got {}", other),
        }
    }
}
