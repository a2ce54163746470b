//! The `<s>` strategy cell.

use super::anon_vars::GEN_PREFIX;
use super::{is_function_rule, transform_rules, FreshNames};
use crate::{Pass, PassResult};
use kompile_definition::{labels, ConfigurationInfo, Definition, Rule, Term};
use log::warn;

/// The strategy cell name.
pub const STRATEGY_CELL: &str = "s";

/// When heat/cool strategies are enabled and the configuration declares an
/// `<s>` cell, every non-function rule also matches on that cell: heat and
/// cool rules on the `#heat` / `#cool` markers, other rules on a fresh
/// variable. Otherwise the definition is returned unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct AddStrategyCell {
    enabled: bool,
}

const NAME: &str = "add-strategy-cell";

fn mentions_strategy(body: &Term) -> bool {
    body.any(&|t| matches!(t, Term::Cell(c) if c.name == STRATEGY_CELL))
}

fn add_strategy(definition: &Definition, rule: &Rule) -> Rule {
    if is_function_rule(definition, rule) || mentions_strategy(&rule.body) {
        return rule.clone();
    }
    let content = if rule.is_heat() {
        Term::constant(labels::HEAT_MARKER)
    } else if rule.is_cool() {
        Term::constant(labels::COOL_MARKER)
    } else {
        let mut names = FreshNames::avoiding(rule.all_variable_names());
        Term::var(names.fresh(GEN_PREFIX))
    };
    let strategy = Term::open_cell(STRATEGY_CELL, content);
    let body = match rule.body.clone() {
        Term::Bag(mut items) => {
            items.push(strategy);
            Term::Bag(items)
        }
        other => Term::Bag(vec![other, strategy]),
    };
    Rule {
        body,
        ..rule.clone()
    }
}

impl AddStrategyCell {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Pass for AddStrategyCell {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, definition: &Definition) -> PassResult<Definition> {
        if !self.enabled {
            return Ok(definition.clone());
        }
        let configuration =
            ConfigurationInfo::for_module(definition, definition.main_module_name())?;
        if !configuration.contains(STRATEGY_CELL) {
            warn!(
                "Heat/cool strategies requested but the configuration has no <{}> cell",
                STRATEGY_CELL
            );
            return Ok(definition.clone());
        }
        transform_rules(definition, |definition, rule| {
            Ok(add_strategy(definition, rule))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{parse, rules};
    use super::*;
    use pretty_assertions::assert_eq;

    const WITH_S: &str = r#"
        module M
          configuration <T> <k> $PGM:K </k> <s> .K </s> </T>
          rule <k> HOLE => a ...</k> [heat]
          rule <k> a => b ...</k>
          rule <k> X ...</k> <s> X </s>
        endmodule
    "#;

    #[test]
    fn test_rules_gain_strategy_cell() {
        // GIVEN strategies enabled and an <s> cell in the configuration
        let out = AddStrategyCell::new(true).run(&parse(WITH_S, "M")).unwrap();

        // THEN heat rules match #heat, others a fresh variable
        let found: Vec<String> = rules(&out, "M").iter().map(|r| r.body.to_string()).collect();
        assert_eq!(
            found,
            vec![
                "<k> (HOLE => a) ...</k> <s> #heat ...</s>",
                "<k> (a => b) ...</k> <s> _Gen0 ...</s>",
                "<k> X ...</k> <s> X </s>",
            ]
        );
    }

    #[test]
    fn test_disabled_is_identity() {
        let definition = parse(WITH_S, "M");
        assert_eq!(AddStrategyCell::new(false).run(&definition).unwrap(), definition);
    }

    #[test]
    fn test_no_strategy_cell_is_identity() {
        let definition = parse("module M rule <k> a => b ...</k> endmodule", "M");
        assert_eq!(AddStrategyCell::new(true).run(&definition).unwrap(), definition);
    }
}
