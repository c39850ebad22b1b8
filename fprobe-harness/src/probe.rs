//! The probe contract.
//!
//! A probe exercises one feature against one engine and always produces a
//! `Verdict`. Probe bodies that want `?` can return
//! `Result<Verdict, ProbeError>` internally and convert once with
//! `Verdict::settle`, which maps the fault taxonomy onto outcomes:
//!
//! | `ProbeError`          | Outcome |
//! |-----------------------|---------|
//! | `PrerequisiteMissing` | skip    |
//! | `AssertionFailed`     | fail    |
//! | `BehaviorRejected`    | fail    |
//! | `Timeout` diagnostic  | fail    |
//! | `Timeout` otherwise   | error   |
//! | `Unhandled`           | error   |

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fprobe_schema::{single_line, EngineIdentity, Outcome, SpecTrack};

/// Identity of a probe: the feature it exercises and the track it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeDescriptor {
    pub feature_id: String,
    pub display_name: String,
    pub spec_track: SpecTrack,
}

impl ProbeDescriptor {
    /// A descriptor on the primary track. The display name is kept to one line.
    pub fn new(feature_id: &str, display_name: &str) -> Self {
        Self {
            feature_id: feature_id.to_string(),
            display_name: single_line(display_name),
            spec_track: SpecTrack::primary(),
        }
    }

    /// Builder: target a different spec track.
    pub fn on_track(mut self, spec_track: SpecTrack) -> Self {
        self.spec_track = spec_track;
        self
    }
}

/// What a probe body concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub outcome: Outcome,
    pub explanation: String,
}

impl Verdict {
    pub fn new(outcome: Outcome, explanation: impl Into<String>) -> Self {
        Self {
            outcome,
            explanation: explanation.into(),
        }
    }

    pub fn pass(explanation: impl Into<String>) -> Self {
        Self::new(Outcome::Pass, explanation)
    }

    pub fn fail(explanation: impl Into<String>) -> Self {
        Self::new(Outcome::Fail, explanation)
    }

    pub fn skip(explanation: impl Into<String>) -> Self {
        Self::new(Outcome::Skip, explanation)
    }

    pub fn error(explanation: impl Into<String>) -> Self {
        Self::new(Outcome::Error, explanation)
    }

    pub fn partial(explanation: impl Into<String>) -> Self {
        Self::new(Outcome::Partial, explanation)
    }

    /// Collapse a fallible probe body into a verdict.
    pub fn settle(result: Result<Verdict, ProbeError>) -> Verdict {
        result.unwrap_or_else(Verdict::from)
    }
}

/// Faults a probe body can hit.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("prerequisite missing: {0}")]
    PrerequisiteMissing(String),

    #[error("assertion failed: {0}")]
    AssertionFailed(String),

    #[error("rejected by engine: {0}")]
    BehaviorRejected(String),

    #[error("timed out after {}", format_timeout(.after))]
    Timeout {
        after: Duration,
        /// The timeout itself shows the feature is absent.
        diagnostic: bool,
    },

    #[error("{0}")]
    Unhandled(String),
}

impl ProbeError {
    /// The outcome this fault maps to.
    pub fn outcome(&self) -> Outcome {
        match self {
            ProbeError::PrerequisiteMissing(_) => Outcome::Skip,
            ProbeError::AssertionFailed(_) | ProbeError::BehaviorRejected(_) => Outcome::Fail,
            ProbeError::Timeout { diagnostic: true, .. } => Outcome::Fail,
            ProbeError::Timeout { diagnostic: false, .. } => Outcome::Error,
            ProbeError::Unhandled(_) => Outcome::Error,
        }
    }
}

/// Whole seconds as `30s`, anything finer as `300ms`.
fn format_timeout(after: &Duration) -> String {
    if after.subsec_nanos() == 0 {
        format!("{}s", after.as_secs())
    } else {
        format!("{}ms", after.as_millis())
    }
}

impl From<ProbeError> for Verdict {
    fn from(err: ProbeError) -> Self {
        Verdict::new(err.outcome(), err.to_string())
    }
}

impl From<io::Error> for ProbeError {
    fn from(err: io::Error) -> Self {
        ProbeError::Unhandled(err.to_string())
    }
}

/// Explicit context handed to every probe of a run.
///
/// Owns the run's work root: a fresh directory under which probes create
/// their own scratch space. The directory is removed by `close`, or on drop
/// if the run unwinds before `close` is reached.
#[derive(Debug)]
pub struct ProbeContext {
    engine: EngineIdentity,
    work_root: tempfile::TempDir,
}

impl ProbeContext {
    /// Open a context with a fresh work root under `base` (or the system temp dir).
    pub fn open(engine: EngineIdentity, base: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("fprobe-run-");
        let work_root = match base {
            Some(base) => {
                std::fs::create_dir_all(base)?;
                builder.tempdir_in(base)?
            }
            None => builder.tempdir()?,
        };
        Ok(Self { engine, work_root })
    }

    /// Release the work root and everything probes left in it.
    pub fn close(self) -> io::Result<()> {
        self.work_root.close()
    }

    pub fn engine(&self) -> &EngineIdentity {
        &self.engine
    }

    pub fn work_root(&self) -> &Path {
        self.work_root.path()
    }

    /// Environment describing the run to an external probe process.
    pub fn probe_env(&self, descriptor: &ProbeDescriptor, scratch: &Path) -> Vec<(String, String)> {
        vec![
            ("FPROBE_ENGINE".to_string(), self.engine.id.clone()),
            ("FPROBE_ENGINE_VERSION".to_string(), self.engine.version.clone()),
            ("FPROBE_FEATURE_ID".to_string(), descriptor.feature_id.clone()),
            ("FPROBE_SPEC_TRACK".to_string(), descriptor.spec_track.to_string()),
            (
                "FPROBE_SCRATCH_DIR".to_string(),
                path_string(scratch),
            ),
        ]
    }
}

fn path_string(path: &Path) -> String {
    PathBuf::from(path).to_string_lossy().into_owned()
}

/// A feature probe.
///
/// `run` must not panic and must release anything it provisioned before
/// returning. The runner still isolates panics, but a probe that panics is
/// reported as `error` with only the panic message to go on.
pub trait Probe {
    fn descriptor(&self) -> &ProbeDescriptor;

    fn run(&self, ctx: &ProbeContext) -> Verdict;

    /// Short label for listings (`command`, `declared`, ...).
    fn kind(&self) -> &'static str {
        "custom"
    }
}

/// A probe backed by a closure. Handy for Rust-side probes and tests.
pub struct FnProbe<F> {
    descriptor: ProbeDescriptor,
    body: F,
}

impl<F> FnProbe<F>
where
    F: Fn(&ProbeContext) -> Verdict,
{
    pub fn new(descriptor: ProbeDescriptor, body: F) -> Self {
        Self { descriptor, body }
    }
}

impl<F> Probe for FnProbe<F>
where
    F: Fn(&ProbeContext) -> Verdict,
{
    fn descriptor(&self) -> &ProbeDescriptor {
        &self.descriptor
    }

    fn run(&self, ctx: &ProbeContext) -> Verdict {
        (self.body)(ctx)
    }
}
