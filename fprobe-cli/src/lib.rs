//! fprobe CLI.
//!
//! This crate provides the command-line interface for the feature probe
//! harness: argument parsing, command orchestration, report output and exit
//! codes.

pub mod cli;
pub mod commands;
pub mod exit;
pub mod io;
pub mod signal;

pub use cli::{
    parse_from, Cli, CliError, Command, ListArgs, PartialClaimsArg, RenderArgs, RunArgs,
    DEFAULT_REPORT_DIR,
};
pub use commands::{
    execute_list, execute_render, execute_run, CommandError, CommandResult, ListEntry, RunOutcome,
};
pub use signal::ShutdownFlag;
