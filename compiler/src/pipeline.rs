//! The ordered list of compilation passes.

use crate::passes::{
    AddImplicitComputationCell, AddSemanticsModule, AddStrategyCell, ConcretizeCells,
    GenerateSortPredicates, ResolveAnonVars, ResolveContexts, ResolveFreshConstants,
    ResolveHeatCool, ResolveIoStreams, ResolveSemanticCasts, ResolveStrict,
};
use crate::{CompileError, CompileResult, KompileOptions, PassResult};
use kompile_definition::Definition;
use log::{debug, info};
use std::time::{Duration, Instant};

/// One `Definition -> Definition` step.
pub trait Pass: Send + Sync {
    /// Stable name used in logs and errors.
    fn name(&self) -> &'static str;

    fn run(&self, definition: &Definition) -> PassResult<Definition>;
}

/// Receives the timing of every pass that finished successfully.
pub trait PassObserver: Send + Sync {
    fn pass_finished(&self, name: &'static str, elapsed: Duration);
}

/// Logs each pass at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl PassObserver for LogObserver {
    fn pass_finished(&self, name: &'static str, elapsed: Duration) {
        info!("{} took {:.3} seconds", name, elapsed.as_secs_f64());
    }
}

/// Runs passes in order; the first failure aborts the run.
pub struct Pipeline {
    passes: Vec<Box<dyn Pass>>,
    observer: Box<dyn PassObserver>,
}

impl Pipeline {
    /// The standard twelve passes.
    pub fn standard(options: &KompileOptions) -> Self {
        Self::from_passes(vec![
            Box::new(ResolveIoStreams),
            Box::new(ResolveStrict),
            Box::new(ResolveAnonVars),
            Box::new(ResolveContexts),
            Box::new(ResolveHeatCool),
            Box::new(ResolveSemanticCasts::new(options.skip_sort_predicates)),
            Box::new(GenerateSortPredicates),
            Box::new(ResolveFreshConstants::new(&options.computation_cell)),
            Box::new(AddImplicitComputationCell::new(&options.computation_cell)),
            Box::new(AddStrategyCell::new(options.heat_cool_strategies)),
            Box::new(ConcretizeCells),
            Box::new(AddSemanticsModule),
        ])
    }

    pub fn from_passes(passes: Vec<Box<dyn Pass>>) -> Self {
        Self {
            passes,
            observer: Box::new(LogObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl PassObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Pass names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn run(&self, definition: &Definition) -> CompileResult<Definition> {
        let mut current = definition.clone();
        for pass in &self.passes {
            debug!("Running {}", pass.name());
            let started = Instant::now();
            current = pass
                .run(&current)
                .map_err(|e| CompileError::pass(pass.name(), e))?;
            self.observer.pass_finished(pass.name(), started.elapsed());
        }
        Ok(current)
    }
}
