//! Run command orchestration.
//!
//! Loads the manifest and catalog, runs every probe, reconciles the
//! outcomes and publishes the report. An interrupted run publishes nothing.

use std::path::PathBuf;

use fprobe_clock::Clock;
use fprobe_fs::Filesystem;
use fprobe_harness::{
    manifest_dir, render_markdown, resolve_engine_version, FeatureCatalog, Logger, Manifest,
    ProbeContext, Reconciler, Report, RunVerdict, Runner, ShutdownCheck,
};

use crate::cli::{CliError, RunArgs};
use crate::io::{OutputWriter, StepSummary, WrittenFiles};

use super::{CommandError, CommandResult};

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: Report,
    pub verdict: RunVerdict,
    pub written: WrittenFiles,
    /// Where the Markdown was appended for CI, if it was.
    pub step_summary: Option<PathBuf>,
}

/// Execute the run command.
pub fn execute_run<F, C>(
    args: &RunArgs,
    fs: &F,
    clock: &C,
    logger: &dyn Logger,
    shutdown: &dyn ShutdownCheck,
) -> CommandResult<RunOutcome>
where
    F: Filesystem,
    C: Clock,
{
    args.validate()?;
    if !fs.exists(&args.manifest) {
        return Err(CliError::ManifestNotFound(args.manifest.clone()).into());
    }
    if !fs.exists(&args.catalog) {
        return Err(CliError::CatalogNotFound(args.catalog.clone()).into());
    }

    let mut manifest = Manifest::load(fs, &args.manifest)?;
    if let Some(timeout_sec) = args.timeout_sec {
        manifest.override_timeout(timeout_sec);
    }
    let catalog = load_catalog(fs, args, &manifest.engine.id, logger)?;

    let base_dir = manifest_dir(&args.manifest);
    let registry = manifest.build_registry(&base_dir)?;

    let version =
        resolve_engine_version(args.engine_version.as_deref(), &manifest.engine, &base_dir, logger);
    let engine = manifest.engine_identity(&version);

    logger.info(&format!("{} feature probes", engine.name));
    logger.info(&format!("{} version: {}", engine.name, engine.version));
    logger.info(&format!("Probes: {}", registry.len()));

    let ctx = ProbeContext::open(engine.clone(), args.work_dir.as_deref())
        .map_err(CommandError::WorkDir)?;
    logger.debug(&format!("work root {}", ctx.work_root().display()));

    // On interrupt `ctx` is dropped here and the work root goes with it.
    let results = Runner::new(&registry, logger).run(&ctx, shutdown)?;
    if let Err(e) = ctx.close() {
        logger.warn(&format!("failed to remove work root: {}", e));
    }

    let policy = args.policy();
    let reconciled = Reconciler::new(&catalog, &engine.id, policy).reconcile_all(&results);
    let report = Report::build(clock, engine, policy, catalog.sha256(), reconciled);
    let markdown = render_markdown(&report);

    let written = OutputWriter::new(fs, &args.out_dir).write_all(&report, &markdown)?;

    let step_summary = match &args.step_summary {
        Some(path) => match StepSummary::new(fs, path).append(&markdown) {
            Ok(()) => Some(path.clone()),
            Err(e) => {
                logger.warn(&format!("could not append to {}: {}", path.display(), e));
                None
            }
        },
        None => None,
    };

    let verdict = report.verdict();
    Ok(RunOutcome {
        report,
        verdict,
        written,
        step_summary,
    })
}

fn load_catalog<F: Filesystem>(
    fs: &F,
    args: &RunArgs,
    engine_id: &str,
    logger: &dyn Logger,
) -> CommandResult<FeatureCatalog> {
    let catalog = FeatureCatalog::load(fs, &args.catalog)?;
    if !catalog.ignored_keys().is_empty() {
        logger.verbose(&format!(
            "ignored {} catalog key(s) not of the form <engine>:<feature>:v<N>",
            catalog.ignored_keys().len()
        ));
    }
    if catalog.claims_for(engine_id) == 0 {
        logger.warn(&format!(
            "catalog has no claims for {}; every result is judged against unknown",
            engine_id
        ));
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::PartialClaimsArg;
    use crate::signal::ShutdownFlag;
    use fprobe_clock::MockClock;
    use fprobe_fs::MockFilesystem;
    use fprobe_harness::{MockLogger, NeverStop, RunError};
    use fprobe_schema::{Outcome, UNKNOWN_VERSION};
    use std::path::Path;

    const MANIFEST: &str = r#"{
        "engine": {"id": "engineX", "name": "Engine X"},
        "probes": [
            {"kind": "declared", "feature_id": "read-support", "display_name": "Read Support",
             "outcome": "pass", "explanation": "read 3 rows"},
            {"kind": "declared", "feature_id": "bloom-filters", "display_name": "Bloom Filters",
             "outcome": "pass", "explanation": "filter used"},
            {"kind": "declared", "feature_id": "new-feature", "display_name": "New Feature",
             "spec_track": "v3", "outcome": "skip", "explanation": "needs v3 tables"}
        ]
    }"#;

    const CATALOG: &str = r#"{"support": {
        "engineX:read-support:v2": {"level": "full"},
        "engineX:bloom-filters:v2": {"level": "none"}
    }}"#;

    const CLEAN_CATALOG: &str = r#"{"support": {
        "engineX:read-support:v2": {"level": "full"},
        "engineX:bloom-filters:v2": {"level": "partial"}
    }}"#;

    fn setup(catalog: &str) -> MockFilesystem {
        let fs = MockFilesystem::new();
        fs.add_file(PathBuf::from("/site/engineX.json"), MANIFEST.as_bytes().to_vec());
        fs.add_file(PathBuf::from("/site/oss.json"), catalog.as_bytes().to_vec());
        fs
    }

    fn args() -> RunArgs {
        RunArgs {
            manifest: PathBuf::from("/site/engineX.json"),
            catalog: PathBuf::from("/site/oss.json"),
            out_dir: PathBuf::from("/out"),
            work_dir: None,
            engine_version: Some("1.2.3".to_string()),
            step_summary: None,
            fail_matches_unknown: false,
            partial_claims: PartialClaimsArg::Lenient,
            timeout_sec: None,
            quiet: false,
            verbose: 0,
        }
    }

    // ===========================================
    // Happy path
    // ===========================================

    #[test]
    fn test_run_writes_both_artifacts() {
        let fs = setup(CATALOG);
        let logger = MockLogger::new();

        let outcome = execute_run(&args(), &fs, &MockClock::new(1_700_000_000), &logger, &NeverStop).unwrap();

        assert_eq!(outcome.written.json, PathBuf::from("/out/engineX-feature-report.json"));
        assert_eq!(outcome.written.markdown, PathBuf::from("/out/engineX-feature-report.md"));

        let json = fs.get_text(&outcome.written.json).unwrap();
        assert_eq!(Report::from_json(&json).unwrap(), outcome.report);
        let md = fs.get_text(&outcome.written.markdown).unwrap();
        assert!(md.starts_with("# Engine X Feature Probe Report"));
    }

    #[test]
    fn test_run_reconciles_against_catalog() {
        let fs = setup(CATALOG);
        let logger = MockLogger::new();

        let outcome = execute_run(&args(), &fs, &MockClock::new(0), &logger, &NeverStop).unwrap();
        let report = &outcome.report;

        assert_eq!(report.results.len(), 3);
        assert!(!report.results[0].is_discrepancy);
        assert!(report.results[1].is_discrepancy);
        assert_eq!(report.results[2].result.outcome, Outcome::Skip);
        assert!(!report.results[2].is_discrepancy);
        assert_eq!(report.summary.discrepancies, 1);
        assert_eq!(outcome.verdict, RunVerdict::Dirty { discrepancies: 1, errors: 0 });
        assert_eq!(report.engine.version, "1.2.3");
        assert_eq!(report.catalog_sha256.len(), 64);
    }

    #[test]
    fn test_clean_run() {
        let fs = setup(CLEAN_CATALOG);
        let logger = MockLogger::new();
        let outcome = execute_run(&args(), &fs, &MockClock::new(0), &logger, &NeverStop).unwrap();
        assert!(outcome.verdict.is_clean());
    }

    #[test]
    fn test_strict_policy_changes_verdict() {
        let fs = setup(CLEAN_CATALOG);
        let logger = MockLogger::new();
        let mut args = args();
        args.partial_claims = PartialClaimsArg::Strict;

        let outcome = execute_run(&args, &fs, &MockClock::new(0), &logger, &NeverStop).unwrap();
        assert!(!outcome.verdict.is_clean());
        assert_eq!(outcome.report.policy, args.policy());
    }

    #[test]
    fn test_version_unknown_without_override_or_command() {
        let fs = setup(CATALOG);
        let logger = MockLogger::new();
        let mut args = args();
        args.engine_version = None;

        let outcome = execute_run(&args, &fs, &MockClock::new(0), &logger, &NeverStop).unwrap();
        assert_eq!(outcome.report.engine.version, UNKNOWN_VERSION);
    }

    #[test]
    fn test_run_logs_progress() {
        let fs = setup(CATALOG);
        let logger = MockLogger::new();
        execute_run(&args(), &fs, &MockClock::new(0), &logger, &NeverStop).unwrap();

        assert!(logger.contains("Engine X version: 1.2.3"));
        assert!(logger.contains("[2/3] Testing Bloom Filters (v2)..."));
    }

    // ===========================================
    // CI summary sink
    // ===========================================

    #[test]
    fn test_step_summary_appended() {
        let fs = setup(CATALOG);
        fs.add_file(PathBuf::from("/ci/summary.md"), b"previous step\n".to_vec());
        let logger = MockLogger::new();
        let mut args = args();
        args.step_summary = Some(PathBuf::from("/ci/summary.md"));

        let outcome = execute_run(&args, &fs, &MockClock::new(0), &logger, &NeverStop).unwrap();

        assert_eq!(outcome.step_summary, Some(PathBuf::from("/ci/summary.md")));
        let summary = fs.get_text(Path::new("/ci/summary.md")).unwrap();
        assert!(summary.starts_with("previous step\n# Engine X Feature Probe Report"));
    }

    #[test]
    fn test_step_summary_failure_is_warning() {
        let fs = setup(CATALOG);
        fs.deny_writes_under(PathBuf::from("/ci"));
        let logger = MockLogger::new();
        let mut args = args();
        args.step_summary = Some(PathBuf::from("/ci/summary.md"));

        let outcome = execute_run(&args, &fs, &MockClock::new(0), &logger, &NeverStop).unwrap();

        assert_eq!(outcome.step_summary, None);
        assert!(logger.contains("warning: could not append to /ci/summary.md"));
        assert!(fs.exists(&outcome.written.json));
    }

    // ===========================================
    // Failures
    // ===========================================

    #[test]
    fn test_missing_manifest() {
        let fs = MockFilesystem::new();
        let logger = MockLogger::new();
        let err = execute_run(&args(), &fs, &MockClock::new(0), &logger, &NeverStop).unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument(CliError::ManifestNotFound(_))));
    }

    #[test]
    fn test_missing_catalog() {
        let fs = MockFilesystem::new();
        fs.add_file(PathBuf::from("/site/engineX.json"), MANIFEST.as_bytes().to_vec());
        let logger = MockLogger::new();
        let err = execute_run(&args(), &fs, &MockClock::new(0), &logger, &NeverStop).unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument(CliError::CatalogNotFound(_))));
    }

    #[test]
    fn test_bad_catalog_aborts_before_writing() {
        let fs = setup(r#"{"engineX:read-support:v2": {"level": "maybe"}}"#);
        let logger = MockLogger::new();
        let err = execute_run(&args(), &fs, &MockClock::new(0), &logger, &NeverStop).unwrap_err();
        assert!(matches!(err, CommandError::Catalog(_)));
        assert!(!fs.exists(Path::new("/out/engineX-feature-report.json")));
    }

    #[test]
    fn test_duplicate_probe_is_registry_error() {
        let fs = setup(CATALOG);
        fs.add_file(
            PathBuf::from("/site/engineX.json"),
            br#"{"engine": {"id": "engineX", "name": "Engine X"}, "probes": [
                {"kind": "declared", "feature_id": "a", "display_name": "A", "outcome": "pass"},
                {"kind": "declared", "feature_id": "a", "display_name": "A", "outcome": "pass"}
            ]}"#
            .to_vec(),
        );
        let logger = MockLogger::new();
        let err = execute_run(&args(), &fs, &MockClock::new(0), &logger, &NeverStop).unwrap_err();
        assert!(matches!(err, CommandError::Registry(_)));
    }

    #[test]
    fn test_interrupt_publishes_nothing() {
        let fs = setup(CATALOG);
        let logger = MockLogger::new();
        let shutdown = ShutdownFlag::manual();
        shutdown.trigger();

        let err = execute_run(&args(), &fs, &MockClock::new(0), &logger, &shutdown).unwrap_err();

        assert!(matches!(err, CommandError::Run(RunError::Interrupted { completed: 0, total: 3 })));
        assert!(!fs.exists(Path::new("/out/engineX-feature-report.json")));
        assert!(!fs.exists(Path::new("/out/engineX-feature-report.md")));
    }

    #[test]
    fn test_unwritable_output_is_output_error() {
        let fs = setup(CATALOG);
        fs.deny_writes_under(PathBuf::from("/out"));
        let logger = MockLogger::new();
        let err = execute_run(&args(), &fs, &MockClock::new(0), &logger, &NeverStop).unwrap_err();
        assert!(matches!(err, CommandError::Output(_)));
    }

    #[test]
    fn test_warns_when_catalog_has_no_claims_for_engine() {
        let fs = setup(r#"{"support": {"other:read-support:v2": {"level": "full"}}}"#);
        let logger = MockLogger::new();
        execute_run(&args(), &fs, &MockClock::new(0), &logger, &NeverStop).unwrap();
        assert!(logger.contains("catalog has no claims for engineX"));
    }

    #[test]
    fn test_work_dir_is_cleaned_up() {
        let fs = setup(CATALOG);
        let logger = MockLogger::new();
        let work = tempfile::tempdir().unwrap();
        let mut args = args();
        args.work_dir = Some(work.path().to_path_buf());

        execute_run(&args, &fs, &MockClock::new(0), &logger, &NeverStop).unwrap();

        assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
    }
}
