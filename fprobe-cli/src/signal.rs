//! Signal handling for interrupting a run.
//!
//! The first SIGINT (Ctrl+C) asks the runner to stop. Probe commands lead
//! their own process group, so a terminal Ctrl+C does not reach them: the
//! probe in flight runs to completion or its timeout, then the run ends
//! without publishing anything. A second SIGINT exits immediately with the
//! interrupt code, leaving the work root behind.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fprobe_harness::ShutdownCheck;

use crate::exit::codes;

/// Counts interrupts received since the flag was created.
#[derive(Debug, Clone)]
pub struct ShutdownFlag {
    interrupts: Arc<AtomicUsize>,
}

impl Default for ShutdownFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownFlag {
    /// Create a new shutdown flag and register the SIGINT handler.
    ///
    /// If the handler cannot be registered (e.g., already registered), the
    /// flag is still valid and can be triggered manually.
    pub fn new() -> Self {
        let flag = Self::manual();
        let interrupts = flag.interrupts.clone();

        // ctrlc runs the handler on its own thread, so printing is fine here
        let _ = ctrlc::set_handler(move || {
            if interrupts.fetch_add(1, Ordering::SeqCst) == 0 {
                eprintln!("interrupt: stopping after the current probe, no report will be written (Ctrl+C again to abort)");
            } else {
                std::process::exit(codes::SIGINT);
            }
        });

        flag
    }

    /// Create a shutdown flag without registering a handler.
    pub fn manual() -> Self {
        Self {
            interrupts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Record one interrupt, as the handler would.
    pub fn trigger(&self) {
        self.interrupts.fetch_add(1, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.interrupts.store(0, Ordering::SeqCst);
    }

    pub fn interrupts(&self) -> usize {
        self.interrupts.load(Ordering::SeqCst)
    }
}

impl ShutdownCheck for ShutdownFlag {
    fn should_stop(&self) -> bool {
        self.interrupts() > 0
    }
}
