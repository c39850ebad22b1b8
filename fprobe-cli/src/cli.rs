//! CLI argument parsing for fprobe.
//!
//! Provides the `fprobe` binary's `run`, `render` and `list` subcommands.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use fprobe_harness::{MatchPolicy, PartialClaims, Verbosity};
use thiserror::Error;

/// Default output directory for report artifacts.
pub const DEFAULT_REPORT_DIR: &str = "test-reports";

/// Errors from CLI argument validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("catalog not found: {}", .0.display())]
    CatalogNotFound(PathBuf),

    #[error("report not found: {}", .0.display())]
    ReportNotFound(PathBuf),

    #[error("timeout-sec must be at least 1, got {0}")]
    InvalidTimeout(u64),

    #[error("--quiet cannot be combined with --verbose")]
    QuietAndVerbose,
}

/// fprobe - probe data engines for feature support and reconcile against the declared catalog.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "fprobe")]
#[command(version, about, long_about = None)]
#[command(long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run every probe in a manifest, reconcile, and write reports.
    Run(RunArgs),
    /// Re-render the Markdown view of a JSON report to stdout.
    Render(RenderArgs),
    /// List the probes a manifest registers, in run order.
    List(ListArgs),
}

/// How declared `partial` claims are matched.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialClaimsArg {
    /// Declared partial counts as supported.
    Lenient,
    /// Pass needs full; a partial outcome needs partial.
    Strict,
}

impl From<PartialClaimsArg> for PartialClaims {
    fn from(arg: PartialClaimsArg) -> Self {
        match arg {
            PartialClaimsArg::Lenient => PartialClaims::Lenient,
            PartialClaimsArg::Strict => PartialClaims::Strict,
        }
    }
}

/// Arguments for the run command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    /// Probe manifest describing the engine and its probes (required).
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Feature catalog JSON with declared support levels (required).
    #[arg(short, long, env = "FPROBE_CATALOG")]
    pub catalog: PathBuf,

    /// Output directory for report artifacts.
    #[arg(short, long, env = "REPORT_DIR", default_value = DEFAULT_REPORT_DIR)]
    pub out_dir: PathBuf,

    /// Directory under which the run's scratch space is created.
    /// Defaults to the system temp directory.
    #[arg(long, env = "FPROBE_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Engine version to report instead of auto-detecting it.
    #[arg(long, env = "FPROBE_ENGINE_VERSION")]
    pub engine_version: Option<String>,

    /// File to append the Markdown report to (CI job summary).
    #[arg(long, env = "GITHUB_STEP_SUMMARY")]
    pub step_summary: Option<PathBuf>,

    /// Treat a failing probe as matching a declared `unknown`.
    #[arg(long)]
    pub fail_matches_unknown: bool,

    /// How declared `partial` claims are matched.
    #[arg(long, value_enum, default_value_t = PartialClaimsArg::Lenient)]
    pub partial_claims: PartialClaimsArg,

    /// Override the timeout of every command probe, in seconds.
    #[arg(long)]
    pub timeout_sec: Option<u64>,

    /// Only print warnings and the final summary.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase logging (-v, -vv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl RunArgs {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        if let Some(0) = self.timeout_sec {
            return Err(CliError::InvalidTimeout(0));
        }
        if self.quiet && self.verbose > 0 {
            return Err(CliError::QuietAndVerbose);
        }
        Ok(())
    }

    pub fn policy(&self) -> MatchPolicy {
        MatchPolicy {
            fail_matches_unknown: self.fail_matches_unknown,
            partial_claims: self.partial_claims.into(),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::from_count(self.verbose)
        }
    }
}

/// Arguments for the render command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct RenderArgs {
    /// JSON report written by `fprobe run` (required).
    #[arg(short, long)]
    pub report: PathBuf,
}

/// Arguments for the list command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct ListArgs {
    /// Probe manifest (required).
    #[arg(short, long)]
    pub manifest: PathBuf,
}

/// Parse CLI arguments from an iterator of strings.
/// Useful for testing.
pub fn parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["fprobe", "run", "--manifest", "m.json", "--catalog", "oss.json"];
        argv.extend_from_slice(extra);
        match parse_from(argv).expect("parse").command {
            Command::Run(args) => args,
            other => panic!("expected run, got {:?}", other),
        }
    }

    // ===========================================
    // Run command
    // ===========================================

    #[test]
    fn test_run_requires_manifest() {
        let err = parse_from(["fprobe", "run", "--catalog", "oss.json"]).unwrap_err();
        assert!(err.to_string().contains("--manifest"));
    }

    #[test]
    fn test_run_defaults() {
        let args = run_args(&[]);
        assert_eq!(args.manifest, PathBuf::from("m.json"));
        assert_eq!(args.catalog, PathBuf::from("oss.json"));
        if std::env::var_os("REPORT_DIR").is_none() {
            assert_eq!(args.out_dir, PathBuf::from(DEFAULT_REPORT_DIR));
        }
        assert!(!args.fail_matches_unknown);
        assert_eq!(args.partial_claims, PartialClaimsArg::Lenient);
        assert_eq!(args.timeout_sec, None);
        assert_eq!(args.policy(), MatchPolicy::default());
        assert_eq!(args.verbosity(), Verbosity::Normal);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_run_short_flags() {
        let cli = parse_from([
            "fprobe", "run", "-m", "m.json", "-c", "oss.json", "-o", "out", "-vv",
        ])
        .unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.out_dir, PathBuf::from("out"));
                assert_eq!(args.verbose, 2);
                assert_eq!(args.verbosity(), Verbosity::Debug);
            }
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn test_run_policy_flags() {
        let args = run_args(&["--fail-matches-unknown", "--partial-claims", "strict"]);
        let policy = args.policy();
        assert!(policy.fail_matches_unknown);
        assert_eq!(policy.partial_claims, PartialClaims::Strict);
    }

    #[test]
    fn test_run_rejects_unknown_partial_claims() {
        let argv = ["fprobe", "run", "-m", "m.json", "-c", "c.json", "--partial-claims", "loose"];
        assert!(parse_from(argv).is_err());
    }

    #[test]
    fn test_run_optional_paths() {
        let args = run_args(&[
            "--work-dir",
            "/scratch",
            "--engine-version",
            "1.4.1",
            "--step-summary",
            "/ci/summary.md",
        ]);
        assert_eq!(args.work_dir, Some(PathBuf::from("/scratch")));
        assert_eq!(args.engine_version.as_deref(), Some("1.4.1"));
        assert_eq!(args.step_summary, Some(PathBuf::from("/ci/summary.md")));
    }

    // ===========================================
    // Validation
    // ===========================================

    #[test]
    fn test_validate_zero_timeout() {
        let args = run_args(&["--timeout-sec", "0"]);
        assert_eq!(args.validate(), Err(CliError::InvalidTimeout(0)));
        assert!(run_args(&["--timeout-sec", "5"]).validate().is_ok());
    }

    #[test]
    fn test_validate_quiet_and_verbose() {
        let args = run_args(&["--quiet", "-v"]);
        assert_eq!(args.validate(), Err(CliError::QuietAndVerbose));
    }

    #[test]
    fn test_quiet_verbosity() {
        assert_eq!(run_args(&["-q"]).verbosity(), Verbosity::Quiet);
    }

    // ===========================================
    // Render / list
    // ===========================================

    #[test]
    fn test_render_args() {
        let cli = parse_from(["fprobe", "render", "--report", "r.json"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Render(RenderArgs { report: PathBuf::from("r.json") })
        );
    }

    #[test]
    fn test_list_args() {
        let cli = parse_from(["fprobe", "list", "-m", "m.json"]).unwrap();
        assert_eq!(
            cli.command,
            Command::List(ListArgs { manifest: PathBuf::from("m.json") })
        );
    }

    #[test]
    fn test_version_flag() {
        let err = parse_from(["fprobe", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_unknown_subcommand() {
        assert!(parse_from(["fprobe", "collect"]).is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CliError::ManifestNotFound(PathBuf::from("/x/m.json")).to_string(),
            "manifest not found: /x/m.json"
        );
        assert_eq!(
            CliError::InvalidTimeout(0).to_string(),
            "timeout-sec must be at least 1, got 0"
        );
    }
}
