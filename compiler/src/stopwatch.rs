//! Wall-clock timing of compilation phases.

use log::info;
use std::time::{Duration, Instant};

/// Times consecutive tasks of one component and logs each as it ends.
///
/// ```ignore
/// let mut stopwatch = Stopwatch::start("kompile", "validation");
/// // ...
/// stopwatch.start_next("pipeline");
/// // ...
/// stopwatch.finish();
/// ```
pub struct Stopwatch {
    component: &'static str,
    task: String,
    started: Instant,
}

impl Stopwatch {
    pub fn start(component: &'static str, task: impl Into<String>) -> Self {
        Self {
            component,
            task: task.into(),
            started: Instant::now(),
        }
    }

    /// Ends the current task and starts timing `task`.
    pub fn start_next(&mut self, task: impl Into<String>) -> Duration {
        let elapsed = self.log_current();
        self.task = task.into();
        self.started = Instant::now();
        elapsed
    }

    /// Ends the current task.
    pub fn finish(self) -> Duration {
        self.log_current()
    }

    fn log_current(&self) -> Duration {
        let elapsed = self.started.elapsed();
        info!(
            "{} ({}) took {:.3} seconds",
            self.task,
            self.component,
            elapsed.as_secs_f64()
        );
        elapsed
    }
}
