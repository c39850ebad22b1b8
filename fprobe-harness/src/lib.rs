//! fprobe Harness Core
//!
//! Runs isolated feature probes against an engine and reconciles the
//! observed outcomes with a declared support catalog:
//! - `registry` / `runner` - ordered probes, executed one at a time with fault isolation
//! - `policy` / `reconcile` - outcome-vs-claim matching and discrepancy flagging
//! - `report` / `markdown` - structured JSON report and human-readable view
//! - `exit_policy` - clean/dirty verdict for automation gating
//!
//! Probes come from Rust code (`Probe` implementations) or from a JSON
//! manifest describing command and declared probes.

pub mod catalog;
pub mod command;
pub mod declared;
pub mod exit_policy;
pub mod logger;
pub mod manifest;
pub mod markdown;
pub mod policy;
pub mod probe;
mod process;
pub mod reconcile;
pub mod registry;
pub mod report;
pub mod runner;
pub mod summary;
pub mod version;

pub use catalog::{CatalogError, FeatureCatalog};
pub use command::{CommandProbe, ExitCodeMap, TimeoutPolicy};
pub use declared::DeclaredProbe;
pub use exit_policy::RunVerdict;
pub use logger::{Logger, MockLogger, NullLogger, StderrLogger, Verbosity};
pub use manifest::{manifest_dir, Manifest, ManifestError, ProbeSpec};
pub use markdown::render_markdown;
pub use policy::{matches, MatchPolicy, PartialClaims};
pub use probe::{FnProbe, Probe, ProbeContext, ProbeDescriptor, ProbeError, Verdict};
pub use reconcile::{ReconciledResult, Reconciler};
pub use registry::{ProbeRegistry, RegistryError};
pub use report::{Report, ReportError, REPORT_VERSION};
pub use runner::{NeverStop, RunError, RunState, Runner, ShutdownCheck};
pub use summary::Summary;
pub use version::{detect_version, resolve_engine_version};
