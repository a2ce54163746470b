//! The compiler front end.

use crate::passes::{concretize_rule, ResolveAnonVars, ResolveSemanticCasts};
use crate::prelude::PRELUDE;
use crate::stopwatch::Stopwatch;
use crate::{
    CompileError, CompileResult, CompiledDefinition, KompileOptions, PassObserver, Pipeline,
    SymbolTable,
};
use kompile_checks::Validator;
use kompile_core::{Attributes, Sort};
use kompile_definition::{ConfigurationInfo, Definition, Rule};
use kompile_parser::{parse_modules, parse_rule};
use kompile_registry::{Symbol, SymbolRecord, SymbolRegistry};
use log::{debug, warn};
use std::sync::Arc;

const COMPONENT: &str = "kompile";

/// Compiles definitions, and single rules against a compiled definition.
///
/// The registry is shared with whoever interns symbols for the same loaded
/// definition, typically the rewrite engine.
pub struct Kompiler {
    options: KompileOptions,
    registry: Arc<SymbolRegistry>,
    validator: Validator,
    pipeline: Pipeline,
}

impl Kompiler {
    pub fn new(options: KompileOptions, registry: Arc<SymbolRegistry>) -> Self {
        let pipeline = Pipeline::standard(&options);
        Self {
            options,
            registry,
            validator: Validator::standard(),
            pipeline,
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Reports each finished pass to `observer` instead of the log.
    pub fn with_observer(mut self, observer: impl PassObserver + 'static) -> Self {
        self.pipeline = self.pipeline.with_observer(observer);
        self
    }

    pub fn options(&self) -> &KompileOptions {
        &self.options
    }

    pub fn registry(&self) -> &Arc<SymbolRegistry> {
        &self.registry
    }

    // ==================== Definitions ====================

    /// Parses `source` together with the built-in modules and compiles it.
    pub fn run(
        &self,
        source: &str,
        main_module: &str,
        program_start_sort: Option<Sort>,
    ) -> CompileResult<CompiledDefinition> {
        let stopwatch = Stopwatch::start(COMPONENT, "parsing");
        let mut modules = parse_modules(PRELUDE)?;
        modules.extend(parse_modules(source)?);
        let parsed = Definition::new(main_module, modules, Attributes::new())?;
        stopwatch.finish();
        self.compile_with(parsed, program_start_sort)
    }

    /// [`Kompiler::run`] with the main module and start sort from the options.
    pub fn run_configured(&self, source: &str) -> CompileResult<CompiledDefinition> {
        let main = self
            .options
            .main_module
            .as_deref()
            .ok_or(CompileError::MissingMainModule)?;
        self.run(source, main, None)
    }

    /// Validates `parsed`, runs every pass and derives the symbol table.
    ///
    /// Structural violations are reported all at once, before any pass.
    pub fn compile(&self, parsed: Definition) -> CompileResult<CompiledDefinition> {
        self.compile_with(parsed, None)
    }

    fn compile_with(
        &self,
        parsed: Definition,
        program_start_sort: Option<Sort>,
    ) -> CompileResult<CompiledDefinition> {
        let mut stopwatch = Stopwatch::start(COMPONENT, "validation");
        let violations = self.validator.validate(&parsed);
        for warning in violations.all().iter().filter(|v| !v.is_error()) {
            warn!("{}", warning);
        }
        if violations.has_errors() {
            return Err(CompileError::structural(violations));
        }

        stopwatch.start_next("pipeline");
        let compiled = self.pipeline.run(&parsed)?;

        stopwatch.start_next("symbols");
        let configuration = ConfigurationInfo::for_module(&compiled, compiled.main_module_name())?;
        let program_start_sort = program_start_sort
            .or_else(|| self.options.program_start_sort.clone())
            .or_else(|| configuration.program_sort())
            .unwrap_or_else(Sort::k);
        let symbols = SymbolTable::build(&self.registry, &compiled, &configuration);
        debug!(
            "{} symbols, {} interned in total",
            symbols.len(),
            self.registry.size()
        );
        stopwatch.finish();

        Ok(CompiledDefinition {
            top_cell_label: configuration.top_cell_label(),
            parsed,
            compiled,
            program_start_sort,
            symbols,
            configuration,
        })
    }

    // ==================== Rules ====================

    /// Compiles a rule introduced after `compiled` was built: anonymous
    /// variables, then semantic casts, then cell concretization against the
    /// compiled configuration.
    pub fn compile_rule(&self, compiled: &CompiledDefinition, rule: Rule) -> CompileResult<Rule> {
        let named = ResolveAnonVars::resolve_rule(&rule);
        let sorted = ResolveSemanticCasts::new(self.options.skip_sort_predicates).resolve_rule(&named);
        concretize_rule(&sorted, &compiled.configuration, &compiled.compiled)
            .map_err(|e| CompileError::pass("concretize-cells", e))
    }

    /// Parses `text` unless `parsed` already holds the rule, then compiles it.
    pub fn parse_and_compile_rule(
        &self,
        compiled: &CompiledDefinition,
        text: &str,
        source: &str,
        parsed: Option<Rule>,
    ) -> CompileResult<Rule> {
        let rule = match parsed {
            Some(rule) => rule,
            None => parse_rule(text, source)?,
        };
        self.compile_rule(compiled, rule)
    }

    // ==================== Symbols ====================

    /// Replaces persisted symbol records by the registry's live instances,
    /// adopting records the registry has not seen. A record that disagrees
    /// with the registry is a critical error.
    pub fn restore_symbols(
        &self,
        records: impl IntoIterator<Item = SymbolRecord>,
    ) -> CompileResult<Vec<Symbol>> {
        let symbols = self.registry.canonicalize_all(records)?;
        debug!("Restored {} symbols", symbols.len());
        Ok(symbols)
    }
}
