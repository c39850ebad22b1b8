//! Sequential probe execution with per-probe isolation.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use fprobe_schema::{Outcome, ProbeResult};

use crate::logger::Logger;
use crate::probe::{Probe, ProbeContext, Verdict};
use crate::registry::ProbeRegistry;

/// Trait for checking if shutdown has been requested.
pub trait ShutdownCheck {
    fn should_stop(&self) -> bool;
}

/// A shutdown check that never requests a stop.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverStop;

impl ShutdownCheck for NeverStop {
    fn should_stop(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Interrupted,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RunError {
    #[error("runner already used (state {0:?})")]
    AlreadyRun(RunState),

    #[error("run interrupted after {completed} of {total} probes")]
    Interrupted { completed: usize, total: usize },
}

/// Runs every probe of a registry once, in registration order.
pub struct Runner<'a> {
    registry: &'a ProbeRegistry,
    logger: &'a dyn Logger,
    state: RunState,
}

impl<'a> Runner<'a> {
    pub fn new(registry: &'a ProbeRegistry, logger: &'a dyn Logger) -> Self {
        Self {
            registry,
            logger,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute the registry. One result per probe, in order.
    ///
    /// The shutdown check is consulted before and after each probe. A stop
    /// requested while a probe ran discards that probe's result too, since
    /// the interrupt may have caused it; every partial run is discarded.
    pub fn run(
        &mut self,
        ctx: &ProbeContext,
        shutdown: &dyn ShutdownCheck,
    ) -> Result<Vec<ProbeResult>, RunError> {
        if self.state != RunState::Idle {
            return Err(RunError::AlreadyRun(self.state));
        }
        self.state = RunState::Running;

        let registry = self.registry;
        let total = registry.len();
        let mut results = Vec::with_capacity(total);

        for (index, probe) in registry.iter().enumerate() {
            let d = probe.descriptor();
            if shutdown.should_stop() {
                return Err(self.interrupt("before", &d.feature_id, results.len(), total));
            }

            self.logger.info(&format!(
                "[{}/{}] Testing {} ({})...",
                index + 1,
                total,
                d.display_name,
                d.spec_track
            ));

            let result = run_probe(probe, ctx);
            if shutdown.should_stop() {
                return Err(self.interrupt("during", &d.feature_id, results.len(), total));
            }
            self.logger.info(&format!(
                "  {}: {}",
                result.outcome.as_str().to_uppercase(),
                result.explanation
            ));
            results.push(result);
        }

        self.state = RunState::Completed;
        self.logger.verbose(&format!("completed {} probe(s)", results.len()));
        Ok(results)
    }

    fn interrupt(&mut self, when: &str, feature_id: &str, completed: usize, total: usize) -> RunError {
        self.state = RunState::Interrupted;
        self.logger.warn(&format!(
            "interrupted {} {}, discarding {} completed result(s)",
            when, feature_id, completed
        ));
        RunError::Interrupted { completed, total }
    }
}

/// Run one probe behind a panic boundary and stamp its identity on the result.
pub fn run_probe(probe: &dyn Probe, ctx: &ProbeContext) -> ProbeResult {
    let verdict = catch_unwind(AssertUnwindSafe(|| probe.run(ctx))).unwrap_or_else(|payload| {
        Verdict::new(
            Outcome::Error,
            format!("probe panicked: {}", panic_message(payload.as_ref())),
        )
    });

    let d = probe.descriptor();
    ProbeResult::new(
        &d.feature_id,
        &d.display_name,
        d.spec_track,
        verdict.outcome,
        &verdict.explanation,
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
