//! Compilation options.

use kompile_core::Sort;
use kompile_definition::COMPUTATION_CELL;
use serde::{Deserialize, Serialize};

/// Knobs of a compilation. Deserializes from partial documents; absent
/// fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KompileOptions {
    /// The main module used by [`crate::Kompiler::run_configured`].
    pub main_module: Option<String>,
    /// Overrides the sort of `$PGM` read from the configuration.
    pub program_start_sort: Option<Sort>,
    /// Adds `<s>` strategy cells to rules when the configuration has one.
    pub heat_cool_strategies: bool,
    /// Drop casts without adding `is<S>` side conditions.
    pub skip_sort_predicates: bool,
    /// The cell rules without cells are placed into.
    pub computation_cell: String,
}

impl Default for KompileOptions {
    fn default() -> Self {
        Self {
            main_module: None,
            program_start_sort: None,
            heat_cool_strategies: false,
            skip_sort_predicates: false,
            computation_cell: COMPUTATION_CELL.to_string(),
        }
    }
}

impl KompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_main_module(mut self, name: impl Into<String>) -> Self {
        self.main_module = Some(name.into());
        self
    }

    pub fn with_program_start_sort(mut self, sort: impl Into<Sort>) -> Self {
        self.program_start_sort = Some(sort.into());
        self
    }

    pub fn with_heat_cool_strategies(mut self, enabled: bool) -> Self {
        self.heat_cool_strategies = enabled;
        self
    }

    pub fn with_skip_sort_predicates(mut self, skip: bool) -> Self {
        self.skip_sort_predicates = skip;
        self
    }

    pub fn with_computation_cell(mut self, name: impl Into<String>) -> Self {
        self.computation_cell = name.into();
        self
    }
}
