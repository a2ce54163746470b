//! Symbol identity across compilations and persisted symbols.

use kompile_tests::prelude::*;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

const EXP: &str = r#"
    module EXP
      imports K-TERM
      syntax Exp ::= Int
      syntax Exp ::= add(Exp, Exp) [strict]
      syntax KResult ::= Int
      configuration <T> <k> $PGM:Exp </k> </T>
      rule <k> add(I1:Int, I2:Int) => `_+Int_`(I1, I2) ...</k>
    endmodule
"#;

fn scenario(registry: Arc<SymbolRegistry>) -> Scenario {
    Scenario::new("exp").source(EXP).main("EXP").registry(registry)
}

#[test]
fn test_recompilation_reuses_canonical_symbols() {
    // GIVEN a definition compiled once against a shared registry
    let registry = Arc::new(SymbolRegistry::new());
    let first = scenario(Arc::clone(&registry)).run().compiled();
    let size = registry.size();

    // WHEN it is compiled again against the same registry
    let second = scenario(Arc::clone(&registry)).run().compiled();

    // THEN every symbol is the identical instance and no ordinal was issued
    assert_eq!(registry.size(), size);
    assert_eq!(first.symbols.len(), second.symbols.len());
    for symbol in first.symbols.iter() {
        let again = second.symbol(symbol.label()).unwrap();
        assert!(symbol.same(again), "{} was interned twice", symbol.label());
    }
}

#[test]
fn test_separate_registries_are_isolated() {
    let left = Arc::new(SymbolRegistry::new());
    let right = Arc::new(SymbolRegistry::new());
    let a = scenario(Arc::clone(&left)).run().compiled();
    let b = scenario(Arc::clone(&right)).run().compiled();

    let add_a = a.symbol("add").unwrap();
    let add_b = b.symbol("add").unwrap();
    assert!(!add_a.same(add_b));
    assert_eq!(add_a.ordinal(), add_b.ordinal());
}

#[test]
fn test_ordinals_dense_under_concurrency() {
    // GIVEN one registry shared by eight threads interning overlapping labels
    let registry = Arc::new(SymbolRegistry::new());
    let sorts: BTreeSet<Sort> = [Sort::int()].into_iter().collect();
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let registry = Arc::clone(&registry);
            let sorts = sorts.clone();
            thread::spawn(move || {
                (0..100)
                    .map(|i| {
                        let label = format!("op{}", (t * 50 + i) % 400);
                        registry.intern(&label, BTreeSet::new(), Attributes::new(), &sorts)
                    })
                    .collect::<Vec<Symbol>>()
            })
        })
        .collect();
    let symbols: Vec<Symbol> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    // THEN each distinct label got exactly one ordinal, and they are 0..n
    let labels: BTreeSet<&str> = symbols.iter().map(|s| s.label()).collect();
    let mut ordinals: Vec<usize> = symbols.iter().map(|s| s.ordinal()).collect();
    ordinals.sort_unstable();
    ordinals.dedup();
    assert_eq!(registry.size(), labels.len());
    assert_eq!(ordinals, (0..labels.len()).collect::<Vec<_>>());
}

#[test]
fn test_sort_predicate_ignores_attributes() {
    let registry = SymbolRegistry::new();
    let sorts: BTreeSet<Sort> = [Sort::int()].into_iter().collect();
    let symbol = registry.intern(
        "isInt",
        BTreeSet::new(),
        Attributes::new().with_marker(keys::PATTERN),
        &sorts,
    );

    assert!(symbol.is_sort_predicate());
    assert!(symbol.is_function());
    assert!(!symbol.is_pattern());
    assert_eq!(symbol.predicate_sort(), Some(&Sort::int()));
}

#[test]
fn test_persisted_symbols_restore_into_fresh_registry() {
    // GIVEN the symbol table of a compilation written out as JSON
    let compiled = scenario(Arc::new(SymbolRegistry::new())).run().compiled();
    let records: Vec<SymbolRecord> = compiled.symbols.iter().map(Symbol::to_record).collect();
    let json = serde_json::to_string(&records).unwrap();

    // WHEN it is read back into an empty registry
    let restored: Vec<SymbolRecord> = serde_json::from_str(&json).unwrap();
    let registry = SymbolRegistry::new();
    let symbols = registry.canonicalize_all(restored.clone()).unwrap();

    // THEN ordinals and derived flags survive, and a second pass is a no-op
    assert_eq!(registry.size(), records.len());
    let is_exp = symbols.iter().find(|s| s.label() == "isExp").unwrap();
    assert!(is_exp.is_sort_predicate());
    assert_eq!(is_exp.ordinal(), compiled.symbol("isExp").unwrap().ordinal());
    let again = registry.canonicalize_all(restored).unwrap();
    assert!(symbols.iter().zip(&again).all(|(a, b)| a.same(b)));
}

#[test]
fn test_ordinal_mismatch_is_critical() {
    // GIVEN a persisted symbol whose ordinal disagrees with the live registry
    let registry = Arc::new(SymbolRegistry::new());
    let compiled = scenario(Arc::clone(&registry)).run().compiled();
    let mut record = compiled.symbol("add").unwrap().to_record();
    record.ordinal += 1;

    // WHEN it is restored through a compiler sharing that registry
    let err = scenario(Arc::clone(&registry))
        .kompiler()
        .restore_symbols(vec![record])
        .unwrap_err();

    // THEN the compile error is critical
    assert!(matches!(err, CompileError::Registry(_)));
    assert!(err.is_critical());
}
