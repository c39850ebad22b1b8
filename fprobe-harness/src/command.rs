//! Probes backed by an external executable.
//!
//! The child's exit status is the verdict (`0` pass, `1` fail, `3` partial,
//! `77` skip by default; anything else is an error) and its last line of
//! output is the explanation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use fprobe_schema::Outcome;
use serde::{Deserialize, Serialize};

use crate::probe::{Probe, ProbeContext, ProbeDescriptor, ProbeError, Verdict};
use crate::process::{last_line, run_captured, Captured};

/// Default per-probe timeout in seconds.
pub const DEFAULT_TIMEOUT_SEC: u64 = 300;

/// Exit codes that map to verdicts. Any other code is `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExitCodeMap {
    pub pass: i32,
    pub fail: i32,
    pub partial: i32,
    pub skip: i32,
}

impl Default for ExitCodeMap {
    fn default() -> Self {
        Self {
            pass: 0,
            fail: 1,
            partial: 3,
            skip: 77,
        }
    }
}

impl ExitCodeMap {
    pub fn outcome(&self, code: i32) -> Outcome {
        if code == self.pass {
            Outcome::Pass
        } else if code == self.fail {
            Outcome::Fail
        } else if code == self.partial {
            Outcome::Partial
        } else if code == self.skip {
            Outcome::Skip
        } else {
            Outcome::Error
        }
    }

    /// Every mapped code must be distinct.
    pub fn is_distinct(&self) -> bool {
        let codes = [self.pass, self.fail, self.partial, self.skip];
        codes
            .iter()
            .enumerate()
            .all(|(i, c)| !codes[i + 1..].contains(c))
    }
}

/// What a timeout means for the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// The probe malfunctioned.
    #[default]
    Error,
    /// Hanging is how the feature's absence shows.
    Fail,
}

#[derive(Debug, Clone)]
pub struct CommandProbe {
    descriptor: ProbeDescriptor,
    argv: Vec<String>,
    base_dir: PathBuf,
    requires: Vec<String>,
    requires_env: Vec<String>,
    timeout: Duration,
    on_timeout: TimeoutPolicy,
    exit_codes: ExitCodeMap,
}

impl CommandProbe {
    /// `argv[0]` is the program; relative paths resolve against `base_dir`,
    /// which is also the child's working directory.
    pub fn new(descriptor: ProbeDescriptor, argv: Vec<String>, base_dir: &Path) -> Self {
        Self {
            descriptor,
            argv,
            base_dir: base_dir.to_path_buf(),
            requires: Vec::new(),
            requires_env: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SEC),
            on_timeout: TimeoutPolicy::default(),
            exit_codes: ExitCodeMap::default(),
        }
    }

    pub fn requires(mut self, executables: Vec<String>) -> Self {
        self.requires = executables;
        self
    }

    pub fn requires_env(mut self, vars: Vec<String>) -> Self {
        self.requires_env = vars;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn on_timeout(mut self, policy: TimeoutPolicy) -> Self {
        self.on_timeout = policy;
        self
    }

    pub fn exit_codes(mut self, exit_codes: ExitCodeMap) -> Self {
        self.exit_codes = exit_codes;
        self
    }

    fn check_prerequisites(&self) -> Result<(), ProbeError> {
        for name in &self.requires {
            if resolve_executable(name, &self.base_dir, std::env::var_os("PATH")).is_none() {
                return Err(ProbeError::PrerequisiteMissing(format!(
                    "executable not found: {}",
                    name
                )));
            }
        }
        for var in &self.requires_env {
            let set = std::env::var_os(var).map_or(false, |v| !v.is_empty());
            if !set {
                return Err(ProbeError::PrerequisiteMissing(format!(
                    "environment variable not set: {}",
                    var
                )));
            }
        }
        Ok(())
    }

    fn execute(&self, ctx: &ProbeContext) -> Result<Verdict, ProbeError> {
        self.check_prerequisites()?;

        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| ProbeError::Unhandled("empty command".to_string()))?;

        // Released on every path when this scope ends.
        let scratch = tempfile::Builder::new()
            .prefix(&format!("{}-", self.descriptor.feature_id))
            .tempdir_in(ctx.work_root())?;

        let mut cmd = Command::new(program_path(program, &self.base_dir));
        cmd.args(args)
            .current_dir(&self.base_dir)
            .envs(ctx.probe_env(&self.descriptor, scratch.path()));

        let captured = run_captured(&mut cmd, scratch.path(), self.timeout)
            .map_err(|e| ProbeError::Unhandled(format!("failed to run {}: {}", program, e)))?;

        if captured.timed_out {
            return Err(ProbeError::Timeout {
                after: self.timeout,
                diagnostic: self.on_timeout == TimeoutPolicy::Fail,
            });
        }

        let outcome = match captured.status.code() {
            Some(code) => self.exit_codes.outcome(code),
            None => Outcome::Error,
        };
        Ok(Verdict::new(outcome, explain(&captured)))
    }
}

impl Probe for CommandProbe {
    fn descriptor(&self) -> &ProbeDescriptor {
        &self.descriptor
    }

    fn run(&self, ctx: &ProbeContext) -> Verdict {
        Verdict::settle(self.execute(ctx))
    }

    fn kind(&self) -> &'static str {
        "command"
    }
}

fn explain(captured: &Captured) -> String {
    last_line(&captured.stdout)
        .or_else(|| last_line(&captured.stderr))
        .map(str::to_string)
        .unwrap_or_else(|| format!("no output, {}", captured.status))
}

/// Relative programs containing a separator are taken from `base_dir`.
fn program_path(program: &str, base_dir: &Path) -> PathBuf {
    let path = Path::new(program);
    if path.is_relative() && program.contains('/') {
        base_dir.join(path)
    } else {
        path.to_path_buf()
    }
}

/// Find an executable: a path (relative to `base_dir`) when `name` contains
/// a separator, otherwise a `PATH` lookup.
pub fn resolve_executable(name: &str, base_dir: &Path, path_var: Option<OsString>) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    if name.contains('/') {
        let candidate = base_dir.join(name);
        return candidate.is_file().then_some(candidate);
    }
    let path_var = path_var?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fprobe_schema::EngineIdentity;

    fn ctx() -> ProbeContext {
        ProbeContext::open(EngineIdentity::new("engineX", "Engine X", "2.0"), None).unwrap()
    }

    fn sh(script: &str, base: &Path) -> CommandProbe {
        CommandProbe::new(
            ProbeDescriptor::new("read-support", "Read Support"),
            vec!["sh".to_string(), "-c".to_string(), script.to_string()],
            base,
        )
    }

    // ===========================================
    // Exit code mapping
    // ===========================================

    #[test]
    fn test_default_exit_codes() {
        let map = ExitCodeMap::default();
        assert_eq!(map.outcome(0), Outcome::Pass);
        assert_eq!(map.outcome(1), Outcome::Fail);
        assert_eq!(map.outcome(3), Outcome::Partial);
        assert_eq!(map.outcome(77), Outcome::Skip);
        assert_eq!(map.outcome(2), Outcome::Error);
        assert_eq!(map.outcome(-1), Outcome::Error);
        assert!(map.is_distinct());
    }

    #[test]
    fn test_exit_code_map_partial_override() {
        let map: ExitCodeMap = serde_json::from_str(r#"{"skip": 4}"#).unwrap();
        assert_eq!(map.skip, 4);
        assert_eq!(map.pass, 0);
        assert!(serde_json::from_str::<ExitCodeMap>(r#"{"passs": 0}"#).is_err());
    }

    #[test]
    fn test_exit_code_map_duplicates() {
        let map = ExitCodeMap { skip: 1, ..ExitCodeMap::default() };
        assert!(!map.is_distinct());
    }

    // ===========================================
    // Executable resolution
    // ===========================================

    #[test]
    fn test_resolve_relative_path_against_base() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("probes")).unwrap();
        std::fs::write(dir.path().join("probes/run.sh"), "exit 0").unwrap();

        assert!(resolve_executable("probes/run.sh", dir.path(), None).is_some());
        assert!(resolve_executable("probes/missing.sh", dir.path(), None).is_none());
    }

    #[test]
    fn test_resolve_on_path() {
        let bin = tempfile::tempdir().unwrap();
        std::fs::write(bin.path().join("fake-engine"), "").unwrap();
        let path_var = std::env::join_paths([bin.path()]).unwrap();

        let found = resolve_executable("fake-engine", Path::new("/"), Some(path_var.clone()));
        assert_eq!(found, Some(bin.path().join("fake-engine")));
        assert!(resolve_executable("other-engine", Path::new("/"), Some(path_var)).is_none());
        assert!(resolve_executable("fake-engine", Path::new("/"), None).is_none());
    }

    // ===========================================
    // Prerequisites
    // ===========================================

    #[test]
    fn test_missing_executable_skips() {
        let dir = tempfile::tempdir().unwrap();
        let probe = sh("exit 0", dir.path()).requires(vec!["fprobe-no-such-engine".to_string()]);
        let verdict = probe.run(&ctx());
        assert_eq!(verdict.outcome, Outcome::Skip);
        assert!(verdict.explanation.contains("fprobe-no-such-engine"));
    }

    #[test]
    fn test_missing_env_skips() {
        let dir = tempfile::tempdir().unwrap();
        let probe = sh("exit 0", dir.path()).requires_env(vec!["FPROBE_TEST_UNSET_VAR_1234".to_string()]);
        let verdict = probe.run(&ctx());
        assert_eq!(verdict.outcome, Outcome::Skip);
        assert_eq!(
            verdict.explanation,
            "prerequisite missing: environment variable not set: FPROBE_TEST_UNSET_VAR_1234"
        );
    }

    #[test]
    fn test_empty_command_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let probe = CommandProbe::new(ProbeDescriptor::new("x", "X"), vec![], dir.path());
        assert_eq!(probe.run(&ctx()), Verdict::error("empty command"));
    }

    #[test]
    fn test_spawn_failure_is_error_not_skip() {
        let dir = tempfile::tempdir().unwrap();
        let probe = CommandProbe::new(
            ProbeDescriptor::new("x", "X"),
            vec!["/definitely/not/a/program/fprobe".to_string()],
            dir.path(),
        );
        let verdict = probe.run(&ctx());
        assert_eq!(verdict.outcome, Outcome::Error);
        assert!(verdict.explanation.starts_with("failed to run"));
    }

    // ===========================================
    // Execution (unix shells)
    // ===========================================

    #[cfg(unix)]
    #[test]
    fn test_exit_status_maps_to_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx();
        let cases = [
            ("echo 'read 3 rows'; exit 0", Outcome::Pass, "read 3 rows"),
            ("echo 'Binder Error: not supported'; exit 1", Outcome::Fail, "Binder Error: not supported"),
            ("echo 'v2 only'; exit 3", Outcome::Partial, "v2 only"),
            ("echo 'no REST catalog'; exit 77", Outcome::Skip, "no REST catalog"),
            ("echo 'segfault' >&2; exit 139", Outcome::Error, "segfault"),
        ];
        for (script, outcome, explanation) in cases {
            let verdict = sh(script, dir.path()).run(&ctx);
            assert_eq!(verdict, Verdict::new(outcome, explanation), "script {script:?}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_explanation_prefers_stdout_last_line() {
        let dir = tempfile::tempdir().unwrap();
        let verdict = sh("echo first; echo last; echo noise >&2; echo; exit 0", dir.path()).run(&ctx());
        assert_eq!(verdict.explanation, "last");
    }

    #[cfg(unix)]
    #[test]
    fn test_silent_exit_describes_status() {
        let dir = tempfile::tempdir().unwrap();
        let verdict = sh("exit 5", dir.path()).run(&ctx());
        assert_eq!(verdict.outcome, Outcome::Error);
        assert!(verdict.explanation.starts_with("no output, "));
        assert!(verdict.explanation.contains('5'));
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_env_and_scratch_visible_to_child() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx();
        let script = r#"test -d "$FPROBE_SCRATCH_DIR" && echo "$FPROBE_ENGINE $FPROBE_ENGINE_VERSION $FPROBE_FEATURE_ID $FPROBE_SPEC_TRACK""#;
        let verdict = sh(script, dir.path()).run(&ctx);
        assert_eq!(verdict, Verdict::pass("engineX 2.0 read-support v2"));
    }

    #[cfg(unix)]
    #[test]
    fn test_scratch_released_after_run() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx();
        let verdict = sh(r#"touch "$FPROBE_SCRATCH_DIR/table.parquet"; exit 1"#, dir.path()).run(&ctx);
        assert_eq!(verdict.outcome, Outcome::Fail);
        assert_eq!(std::fs::read_dir(ctx.work_root()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_in_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("probes")).unwrap();
        std::fs::write(dir.path().join("probes/check.sh"), "echo from script; exit 0\n").unwrap();

        let probe = CommandProbe::new(
            ProbeDescriptor::new("read-support", "Read Support"),
            vec!["sh".to_string(), "probes/check.sh".to_string()],
            dir.path(),
        )
        .requires(vec!["probes/check.sh".to_string()]);

        assert_eq!(probe.run(&ctx()), Verdict::pass("from script"));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_policy() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx();
        let hanging = || sh("sleep 30", dir.path()).timeout(Duration::from_millis(200));

        let as_error = hanging().run(&ctx);
        assert_eq!(as_error.outcome, Outcome::Error);
        assert_eq!(as_error.explanation, "timed out after 200ms");

        let as_fail = hanging().on_timeout(TimeoutPolicy::Fail).run(&ctx);
        assert_eq!(as_fail.outcome, Outcome::Fail);
    }

    #[cfg(unix)]
    #[test]
    fn test_custom_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let probe = sh("echo unsupported; exit 2", dir.path())
            .exit_codes(ExitCodeMap { fail: 2, ..ExitCodeMap::default() });
        assert_eq!(probe.run(&ctx()).outcome, Outcome::Fail);
    }
}
