//! Rules compiled one at a time agree with the full pipeline.

use kompile_compiler::passes::{ResolveAnonVars, ResolveSemanticCasts};
use kompile_parser::parse_rule;
use kompile_tests::prelude::*;
use pretty_assertions::assert_eq;

const CONFIG: &str = "configuration <T> <k> $PGM:K </k> <env> .Map </env> </T>";
const RULE: &str = "rule <k> foo(_, X:Int) => bar(X) ...</k>";

fn definition(rules: &str) -> String {
    format!("module M imports K-TERM {} {} endmodule", CONFIG, rules)
}

#[test]
fn test_rule_compiler_matches_pipeline() {
    // GIVEN the rule compiled as part of a definition
    let with_rule = Scenario::new("pipeline")
        .source(definition(RULE))
        .main("M")
        .run()
        .compiled();
    let from_pipeline = with_rule
        .compiled
        .module("M")
        .unwrap()
        .local_rules()
        .next()
        .unwrap()
        .clone();

    // WHEN the same rule is compiled against a definition without it
    let scenario = Scenario::new("incremental").source(definition("")).main("M");
    let without_rule = scenario.run().compiled();
    let from_rule_compiler = scenario
        .kompiler()
        .parse_and_compile_rule(&without_rule, RULE, "interactive", None)
        .unwrap();

    // THEN both agree up to generated names
    assert_same_rule(&from_pipeline, &from_rule_compiler);
    assert_eq!(
        normalize_fresh(&from_rule_compiler.body.to_string()),
        "<T> <k> (foo(_Gen#, X:Int) => bar(X:Int)) ~> DotVar# </k> DotVar# </T>"
    );
}

#[test]
fn test_compiling_a_compiled_rule_is_identity() {
    let scenario = Scenario::new("idempotent").source(definition("")).main("M");
    let compiled = scenario.run().compiled();
    let kompiler = scenario.kompiler();

    let once = kompiler
        .parse_and_compile_rule(&compiled, RULE, "interactive", None)
        .unwrap();
    let twice = kompiler.compile_rule(&compiled, once.clone()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_anonymous_variable_resolution_is_idempotent() {
    let rule = parse_rule("rule <k> f(_, _, Y) => Y ...</k>", "t").unwrap();
    let once = ResolveAnonVars::resolve_rule(&rule);
    let twice = ResolveAnonVars::resolve_rule(&once);

    assert_eq!(once, twice);
    assert_eq!(once.body.to_string(), "<k> (f(_Gen0, _Gen1, Y) => Y) ...</k>");
}

#[test]
fn test_cast_resolution_is_idempotent() {
    let rule = parse_rule("rule <k> f(X:Int, Y:Bool) => X ...</k> requires g(Y)", "t").unwrap();
    let casts = ResolveSemanticCasts::new(false);
    let once = casts.resolve_rule(&rule);
    let twice = casts.resolve_rule(&once);

    assert_eq!(once, twice);
    assert_eq!(
        once.requires.unwrap().to_string(),
        "`_andBool_`(`_andBool_`(g(Y:Bool), isInt(X:Int)), isBool(Y:Bool))"
    );
}

#[test]
fn test_rule_text_errors_name_the_source() {
    let scenario = Scenario::new("parse-error").source(definition("")).main("M");
    let compiled = scenario.run().compiled();
    let err = scenario
        .kompiler()
        .parse_and_compile_rule(&compiled, "rule <k> ( </k>", "interactive", None)
        .unwrap_err();

    match err {
        CompileError::Parse(parse) => {
            assert_eq!(parse.source_name.as_deref(), Some("interactive"));
        }
        other => panic!("expected a parse error, got {}", other),
    }
}
