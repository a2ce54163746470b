//! The result of a compilation.

use kompile_core::{keys, Attributes, Sort, SortSignature};
use kompile_definition::{labels, ConfigurationInfo, Definition};
use kompile_registry::{Symbol, SymbolRegistry};
use std::collections::{BTreeMap, BTreeSet};

/// Canonical symbols of a compiled main module, by label.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<String, Symbol>,
}

/// The sort of the cell named `name`: `k` is `KCell`.
fn cell_sort(name: &str) -> Sort {
    let mut chars = name.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    Sort::new(format!("{}Cell", capitalized))
}

impl SymbolTable {
    /// Interns every production label visible from the main module of
    /// `compiled`, and one symbol per configuration cell.
    pub fn build(
        registry: &SymbolRegistry,
        compiled: &Definition,
        configuration: &ConfigurationInfo,
    ) -> Self {
        let main = compiled.main_module_name();
        let declared: BTreeSet<&str> = compiled
            .visible_productions(main)
            .filter_map(|p| p.klabel.as_deref())
            .collect();

        let mut symbols = BTreeMap::new();
        for label in declared {
            symbols.insert(label.to_string(), registry.intern_from(compiled, label));
        }

        let all_sorts = compiled.all_sorts();
        for cell in configuration.cells() {
            let label = labels::cell(&cell.name);
            let signature = SortSignature::new(vec![Sort::k()], cell_sort(&cell.name));
            let symbol = registry.intern(
                &label,
                BTreeSet::from([signature]),
                Attributes::new().with_marker(keys::CELL),
                &all_sorts,
            );
            symbols.insert(label, symbol);
        }
        Self { symbols }
    }

    pub fn get(&self, label: &str) -> Option<&Symbol> {
        self.symbols.get(label)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }
}

/// A definition before and after the pipeline, with what the rewrite
/// engine needs to start executing programs.
#[derive(Debug, Clone)]
pub struct CompiledDefinition {
    /// The definition as parsed, before any pass.
    pub parsed: Definition,
    /// The definition after every pass; its main module is `SEMANTICS`.
    pub compiled: Definition,
    /// `<T>` for the top configuration cell `T`.
    pub top_cell_label: String,
    /// The sort of `$PGM`.
    pub program_start_sort: Sort,
    pub symbols: SymbolTable,
    pub configuration: ConfigurationInfo,
}

impl CompiledDefinition {
    /// The canonical symbol for `label`, if the compiled main module sees it.
    pub fn symbol(&self, label: &str) -> Option<&Symbol> {
        self.symbols.get(label)
    }
}
