//! Best-effort engine version detection.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use fprobe_schema::UNKNOWN_VERSION;
use regex::Regex;

use crate::logger::Logger;
use crate::manifest::EngineSpec;
use crate::process::run_captured;

/// How long a version command may run.
pub const VERSION_TIMEOUT: Duration = Duration::from_secs(10);

/// Run `command` and pull a version out of its output.
///
/// With a pattern, the first capture group (or the whole match) of the first
/// match in stdout then stderr. Without one, the first non-empty stdout line.
/// `None` on any failure, including a non-zero exit.
pub fn detect_version(
    command: &[String],
    pattern: Option<&str>,
    base_dir: &Path,
    timeout: Duration,
) -> Option<String> {
    let (program, args) = command.split_first()?;
    let capture = tempfile::Builder::new().prefix("fprobe-version-").tempdir().ok()?;

    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(base_dir);
    let captured = run_captured(&mut cmd, capture.path(), timeout).ok()?;
    if captured.timed_out || !captured.status.success() {
        return None;
    }

    match pattern {
        Some(pattern) => {
            let re = Regex::new(pattern).ok()?;
            [captured.stdout.as_str(), captured.stderr.as_str()]
                .into_iter()
                .find_map(|text| {
                    let caps = re.captures(text)?;
                    caps.get(1).or_else(|| caps.get(0)).map(|m| m.as_str().to_string())
                })
        }
        None => captured
            .stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string),
    }
}

/// The version to report: a non-empty override, else detection, else `unknown`.
pub fn resolve_engine_version(
    override_version: Option<&str>,
    engine: &EngineSpec,
    base_dir: &Path,
    logger: &dyn Logger,
) -> String {
    if let Some(v) = override_version.map(str::trim).filter(|v| !v.is_empty()) {
        logger.debug(&format!("using engine version override {}", v));
        return v.to_string();
    }
    if engine.version_command.is_empty() {
        logger.debug("no version_command; engine version unknown");
        return UNKNOWN_VERSION.to_string();
    }
    match detect_version(
        &engine.version_command,
        engine.version_pattern.as_deref(),
        base_dir,
        VERSION_TIMEOUT,
    ) {
        Some(v) => {
            logger.verbose(&format!("detected {} version {}", engine.name, v));
            v
        }
        None => {
            logger.warn(&format!(
                "could not detect {} version from {:?}",
                engine.name, engine.version_command
            ));
            UNKNOWN_VERSION.to_string()
        }
    }
}
