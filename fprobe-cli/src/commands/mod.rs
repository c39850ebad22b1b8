//! Command orchestration for CLI subcommands.
//!
//! Provides execute functions for:
//! - `run` - Probe an engine, reconcile, write reports
//! - `render` - Markdown from a JSON report
//! - `list` - Probes registered by a manifest

pub mod list;
pub mod render;
pub mod run;

pub use list::{execute_list, ListEntry};
pub use render::execute_render;
pub use run::{execute_run, RunOutcome};

use crate::cli::CliError;
use crate::io::OutputWriterError;
use fprobe_fs::FsError;
use fprobe_harness::{CatalogError, ManifestError, RegistryError, ReportError, RunError};
use thiserror::Error;

/// Errors from command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] CliError),

    #[error("filesystem error: {0}")]
    Filesystem(#[from] FsError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("run error: {0}")]
    Run(#[from] RunError),

    #[error("report error: {0}")]
    Report(#[from] ReportError),

    #[error("failed to prepare work directory: {0}")]
    WorkDir(#[source] std::io::Error),

    #[error("output error: {0}")]
    Output(#[from] OutputWriterError),
}

/// Result of command execution.
pub type CommandResult<T> = Result<T, CommandError>;
