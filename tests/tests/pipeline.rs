//! Whole-pipeline behavior: ordering, batching, determinism and the
//! structure individual passes leave behind.

use kompile_compiler::passes::{AddImplicitComputationCell, ConcretizeCells, ResolveAnonVars};
use kompile_compiler::{LANGUAGE_PARSING, SEMANTICS};
use kompile_definition::ConfigurationInfo;
use kompile_parser::parse_definition;
use kompile_tests::prelude::*;

const IMP: &str = r#"
    module IMP
      imports K-TERM
      syntax AExp ::= Int
      syntax AExp ::= plus(AExp, AExp) [strict]
      syntax KResult ::= Int
      configuration <T> <k> $PGM:AExp </k> </T>
      rule [plus]: <k> plus(I1:Int, I2:Int) => `_+Int_`(I1, I2) ...</k>
    endmodule
"#;

fn imp() -> Scenario {
    Scenario::new("imp").source(IMP).main("IMP")
}

fn local_rules<'a>(compiled: &'a CompiledDefinition, module: &str) -> Vec<&'a Rule> {
    compiled.compiled.module(module).unwrap().local_rules().collect()
}

mod ordering {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_pass_runs_in_order() {
        let outcome = imp().run();
        let passes = outcome.passes.clone();
        outcome.compiled();

        assert_eq!(
            passes.names(),
            Pipeline::standard(&KompileOptions::default()).names()
        );
    }

    #[test]
    fn test_concretizing_before_implicit_cell_fails() {
        // GIVEN a rule relying on the implicit computation cell
        let definition = parse_definition("module M rule foo(X) => X endmodule", "M").unwrap();

        // WHEN concretization runs before the implicit cell is added
        let swapped = Pipeline::from_passes(vec![
            Box::new(ResolveAnonVars),
            Box::new(ConcretizeCells),
            Box::new(AddImplicitComputationCell::default()),
        ]);
        let err = swapped.run(&definition).unwrap_err();

        // THEN concretization rejects the rule
        assert!(matches!(
            err,
            CompileError::Pass {
                pass: "concretize-cells",
                source: PassError::NoCellStructure { .. },
            }
        ));

        // AND the standard order compiles the same rule
        let compiled = Scenario::new("implicit")
            .source("module M rule foo(X) => X endmodule")
            .main("M")
            .run()
            .compiled();
        let rules = local_rules(&compiled, "M");
        assert_eq!(
            normalize_fresh(&rules[0].body.to_string()),
            "<k> (foo(X) => X) ~> DotVar# </k>"
        );
    }
}

mod validation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_violations_are_batched_before_any_pass() {
        // GIVEN two rules with unbound right-hand-side variables
        let outcome = Scenario::new("unbound")
            .source(
                r#"
                module M
                  imports K-TERM
                  rule <k> a => X ...</k>
                  rule <k> b => c(Y) ...</k>
                endmodule
                "#,
            )
            .main("M")
            .run();

        // THEN both are reported together and no pass ran
        let passes = outcome.passes.clone();
        match outcome.error() {
            CompileError::StructuralErrors { count, violations } => {
                assert_eq!(count, 2);
                assert_eq!(violations.len(), 2);
            }
            other => panic!("expected structural errors, got {}", other),
        }
        assert!(passes.names().is_empty());
    }
}

mod determinism {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compiling_twice_gives_equal_definitions() {
        let scenario = imp();
        let first = scenario.run().compiled();
        let second = scenario.run().compiled();

        assert_eq!(first.parsed, second.parsed);
        assert_eq!(first.compiled, second.compiled);
        assert_eq!(first.top_cell_label, second.top_cell_label);
        assert_eq!(first.program_start_sort, second.program_start_sort);
    }

    #[test]
    fn test_compile_of_parsed_definition_is_repeatable() {
        let scenario = imp();
        let parsed = scenario.run().compiled().parsed;
        let kompiler = scenario.kompiler();

        let first = kompiler.compile(parsed.clone()).unwrap();
        let second = kompiler.compile(parsed).unwrap();
        assert_eq!(first.compiled, second.compiled);
    }
}

mod start_sort {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_start_sort_comes_from_configuration() {
        let compiled = imp().run().compiled();
        assert_eq!(compiled.program_start_sort, Sort::new("AExp"));
        assert_eq!(compiled.top_cell_label, "<T>");
    }

    #[test]
    fn test_explicit_start_sort_overrides_configuration() {
        let compiled = imp().start_sort(Sort::new("Int")).run().compiled();
        assert_eq!(compiled.program_start_sort, Sort::int());
    }
}

mod semantics_module {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_three_sorts_give_three_injections() {
        // GIVEN a main module defining exactly A, B and C
        let compiled = Scenario::new("abc")
            .source("module M syntax A syntax B ::= b syntax C ::= c(A, B) endmodule")
            .main("M")
            .run()
            .compiled();

        // THEN SEMANTICS is the main module and injects exactly those sorts
        assert_eq!(compiled.compiled.main_module_name(), SEMANTICS);
        let semantics = compiled.compiled.module(SEMANTICS).unwrap();
        let injected: Vec<String> = semantics.local_productions().map(|p| p.to_string()).collect();
        assert_eq!(
            injected,
            vec!["syntax KItem ::= A", "syntax KItem ::= B", "syntax KItem ::= C"]
        );

        // AND the parsing module combines the main module with the builtins
        let parsing = compiled.compiled.module(LANGUAGE_PARSING).unwrap();
        assert_eq!(parsing.imports, vec!["M", "K-TERM", "ID-PROGRAM-PARSING"]);
    }
}

mod strictness {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strict_production_round_trips_through_heat_and_cool() {
        // GIVEN a compiled definition with a strict binary production
        let compiled = imp().run().compiled();
        let rules = local_rules(&compiled, "IMP");
        let heats: Vec<&&Rule> = rules.iter().filter(|r| r.is_heat()).collect();
        let cools: Vec<&&Rule> = rules.iter().filter(|r| r.is_cool()).collect();

        // THEN each argument position has one heat and one cool rule
        assert_eq!(heats.len(), 2);
        assert_eq!(cools.len(), 2);

        // AND cooling undoes heating
        for (heat, cool) in heats.iter().zip(&cools) {
            assert_eq!(heat.body.lhs(), cool.body.rhs());
            assert_eq!(heat.body.rhs(), cool.body.lhs());
        }

        // AND heating needs a non-result, cooling a result
        assert_eq!(
            heats[0].requires.as_ref().unwrap().to_string(),
            "notBool(isKResult(HOLE))"
        );
        assert_eq!(
            cools[0].requires.as_ref().unwrap().to_string(),
            "isKResult(HOLE)"
        );
        assert_eq!(
            heats[0].body.to_string(),
            "<T> <k> (plus(HOLE, _Gen0) => HOLE ~> #freezerplus0(_Gen0)) ~> DotVar0 </k> </T>"
        );

        // AND every freezer has a production
        for label in ["#freezerplus0", "#freezerplus1"] {
            let productions = compiled.compiled.productions_for(label);
            assert_eq!(productions.len(), 1, "{}", label);
            assert_eq!(productions[0].sort, Sort::kitem());
        }
    }

    #[test]
    fn test_strict_position_out_of_range() {
        let err = Scenario::new("bad-strict")
            .source("module M imports K-TERM syntax E ::= neg(E) [strict(2)] endmodule")
            .main("M")
            .run()
            .error();
        assert!(matches!(
            err,
            CompileError::Pass {
                pass: "resolve-strict",
                source: PassError::StrictPosition { position: 2, arity: 1, .. },
            }
        ));
    }
}

mod fresh_constants {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_counter_never_collides_with_generated_variables() {
        // GIVEN a rule with an anonymous variable and a fresh constant
        let compiled = Scenario::new("fresh")
            .source(
                r#"
                module M
                  imports K-TERM
                  configuration <T> <k> $PGM:K </k> </T>
                  rule <k> new(_) => !N ...</k>
                endmodule
                "#,
            )
            .main("M")
            .run()
            .compiled();

        // THEN the anonymous variable and the counter have distinct names
        let rule = local_rules(&compiled, "M")[0];
        assert_eq!(
            rule.body.to_string(),
            "<T> <k> (new(_Gen0) => freshInt(`_+Int_`(_Gen1:Int, 0))) ~> DotVar0 </k> \
             <generatedCounter> (_Gen1:Int => `_+Int_`(_Gen1:Int, 1)) </generatedCounter> </T>"
        );

        // AND the configuration declares the counter
        assert!(compiled.configuration.contains("generatedCounter"));
        assert!(compiled.symbol("<generatedCounter>").is_some());
    }
}

mod strategy {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strategy_cell_added_when_enabled() {
        let source = r#"
            module M
              imports K-TERM
              configuration <T> <k> $PGM:K </k> <s> .K </s> </T>
              rule <k> a => b ...</k>
            endmodule
        "#;
        let compiled = Scenario::new("strategy")
            .source(source)
            .main("M")
            .options(KompileOptions::new().with_heat_cool_strategies(true))
            .run()
            .compiled();
        let rule = local_rules(&compiled, "M")[0];
        assert_eq!(
            rule.body.to_string(),
            "<T> <k> (a => b) ~> DotVar0 </k> <s> _Gen0 ~> DotVar1 </s> </T>"
        );
    }
}

mod configuration {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stream_cells_get_stream_items() {
        let compiled = Scenario::new("io")
            .source(
                r#"
                module M
                  imports K-TERM
                  configuration <T> <k> $PGM:K </k> <in stream="stdin"> .List </in> </T>
                endmodule
                "#,
            )
            .main("M")
            .run()
            .compiled();

        let info = ConfigurationInfo::for_module(&compiled.compiled, SEMANTICS).unwrap();
        assert_eq!(
            info.cell("in").unwrap().initializer.as_ref().unwrap().to_string(),
            "`ListItem`(#istream(0))"
        );
        assert_eq!(compiled.compiled.productions_for("#istream").len(), 1);
    }

    #[test]
    fn test_custom_computation_cell_without_configuration() {
        // GIVEN a definition without a configuration, compiled into <thread>
        let compiled = Scenario::new("thread")
            .source("module M imports K-TERM rule a => b endmodule")
            .main("M")
            .options(KompileOptions::new().with_computation_cell("thread"))
            .run()
            .compiled();

        // THEN the rule and the configuration both use <thread>
        let rule = local_rules(&compiled, "M")[0];
        assert_eq!(rule.body.to_string(), "<thread> (a => b) ~> DotVar0 </thread>");
        assert_eq!(compiled.configuration.top_cell(), "thread");
        assert_eq!(compiled.top_cell_label, "<thread>");
    }

    #[test]
    fn test_unknown_cell_in_rule() {
        let err = Scenario::new("unknown-cell")
            .source("module M imports K-TERM rule <heap> a => b </heap> endmodule")
            .main("M")
            .run()
            .error();
        assert!(matches!(
            err,
            CompileError::Pass {
                pass: "concretize-cells",
                source: PassError::UnknownCell { .. },
            }
        ));
    }
}
