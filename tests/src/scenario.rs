//! Compilation scenarios.

use kompile_compiler::{
    CompileError, CompileResult, CompiledDefinition, KompileOptions, Kompiler, PassObserver,
};
use kompile_core::Sort;
use kompile_registry::SymbolRegistry;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Names of the passes that finished, in order.
#[derive(Debug, Clone, Default)]
pub struct PassLog(Arc<Mutex<Vec<&'static str>>>);

impl PassLog {
    pub fn names(&self) -> Vec<&'static str> {
        match self.0.lock() {
            Ok(names) => names.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl PassObserver for PassLog {
    fn pass_finished(&self, name: &'static str, _elapsed: Duration) {
        if let Ok(mut names) = self.0.lock() {
            names.push(name);
        }
    }
}

/// One definition to compile.
pub struct Scenario {
    name: String,
    source: String,
    main_module: String,
    options: KompileOptions,
    program_start_sort: Option<Sort>,
    registry: Arc<SymbolRegistry>,
}

/// What a compilation produced.
pub struct Outcome {
    scenario: String,
    pub result: CompileResult<CompiledDefinition>,
    pub passes: PassLog,
}

impl Outcome {
    /// The compiled definition; panics with the scenario's error otherwise.
    pub fn compiled(self) -> CompiledDefinition {
        match self.result {
            Ok(compiled) => compiled,
            Err(e) => panic!("scenario '{}' failed: {}", self.scenario, e),
        }
    }

    /// The error; panics if compilation succeeded.
    pub fn error(self) -> CompileError {
        match self.result {
            Ok(_) => panic!("scenario '{}' unexpectedly compiled", self.scenario),
            Err(e) => e,
        }
    }
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: String::new(),
            main_module: String::new(),
            options: KompileOptions::default(),
            program_start_sort: None,
            registry: Arc::new(SymbolRegistry::new()),
        }
    }

    /// Definition text; the built-in modules are added by the compiler.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn main(mut self, module: impl Into<String>) -> Self {
        self.main_module = module.into();
        self
    }

    pub fn options(mut self, options: KompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn start_sort(mut self, sort: impl Into<Sort>) -> Self {
        self.program_start_sort = Some(sort.into());
        self
    }

    /// Compile against `registry` instead of a fresh one.
    pub fn registry(mut self, registry: Arc<SymbolRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn kompiler(&self) -> Kompiler {
        Kompiler::new(self.options.clone(), Arc::clone(&self.registry))
    }

    /// Compiles the definition, recording every finished pass.
    pub fn run(&self) -> Outcome {
        let _ = env_logger::builder().is_test(true).try_init();
        let passes = PassLog::default();
        let kompiler = self.kompiler().with_observer(passes.clone());
        let result = kompiler.run(
            &self.source,
            &self.main_module,
            self.program_start_sort.clone(),
        );
        Outcome {
            scenario: self.name.clone(),
            result,
            passes,
        }
    }
}
