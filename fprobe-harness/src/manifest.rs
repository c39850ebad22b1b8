//! Probe manifests: one engine, its identity and its probes, as JSON.
//!
//! Adding an engine means writing a manifest; the runner is untouched.

use std::path::{Path, PathBuf};
use std::time::Duration;

use fprobe_fs::{Filesystem, FsError};
use fprobe_schema::{EngineIdentity, Outcome, SpecTrack, UNKNOWN_VERSION};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::command::{CommandProbe, ExitCodeMap, TimeoutPolicy, DEFAULT_TIMEOUT_SEC};
use crate::declared::DeclaredProbe;
use crate::probe::{ProbeDescriptor, Verdict};
use crate::registry::{ProbeRegistry, RegistryError};

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: FsError,
    },

    #[error("invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid manifest: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub engine: EngineSpec,
    #[serde(default)]
    pub probes: Vec<ProbeSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSpec {
    /// Catalog slug.
    pub id: String,
    pub name: String,
    /// Prints the engine version, e.g. `["duckdb", "--version"]`.
    #[serde(default)]
    pub version_command: Vec<String>,
    /// First capture group is the version. Without one, the first output line is used.
    #[serde(default)]
    pub version_pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeSpec {
    Command(CommandSpec),
    Declared(DeclaredSpec),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSpec {
    pub feature_id: String,
    pub display_name: String,
    #[serde(default)]
    pub spec_track: SpecTrack,
    pub command: Vec<String>,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub requires_env: Vec<String>,
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
    #[serde(default)]
    pub on_timeout: TimeoutPolicy,
    #[serde(default)]
    pub exit_codes: ExitCodeMap,
}

fn default_timeout_sec() -> u64 {
    DEFAULT_TIMEOUT_SEC
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclaredSpec {
    pub feature_id: String,
    pub display_name: String,
    #[serde(default)]
    pub spec_track: SpecTrack,
    pub outcome: Outcome,
    #[serde(default)]
    pub explanation: String,
}

impl ProbeSpec {
    pub fn descriptor(&self) -> ProbeDescriptor {
        let (feature_id, display_name, spec_track) = match self {
            ProbeSpec::Command(c) => (&c.feature_id, &c.display_name, c.spec_track),
            ProbeSpec::Declared(d) => (&d.feature_id, &d.display_name, d.spec_track),
        };
        ProbeDescriptor::new(feature_id, display_name).on_track(spec_track)
    }
}

impl Manifest {
    /// Parse and validate.
    pub fn parse(json: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn load<F: Filesystem>(fs: &F, path: &Path) -> Result<Self, ManifestError> {
        let json = fs.read_file(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&json)
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        let invalid = |msg: String| Err(ManifestError::Invalid(msg));

        if !is_slug(&self.engine.id) {
            return invalid(format!("engine id {:?} must be non-empty without ':'", self.engine.id));
        }
        if self.engine.name.trim().is_empty() {
            return invalid("engine name must be non-empty".to_string());
        }
        if let Some(pattern) = &self.engine.version_pattern {
            if let Err(e) = Regex::new(pattern) {
                return invalid(format!("version_pattern does not compile: {}", e));
            }
        }

        for spec in &self.probes {
            let d = spec.descriptor();
            if !is_slug(&d.feature_id) {
                return invalid(format!("feature_id {:?} must be non-empty without ':'", d.feature_id));
            }
            if d.display_name.is_empty() {
                return invalid(format!("{}: display_name must be non-empty", d.feature_id));
            }
            if let ProbeSpec::Command(c) = spec {
                if c.command.is_empty() || c.command[0].is_empty() {
                    return invalid(format!("{}: command must name a program", c.feature_id));
                }
                if c.timeout_sec == 0 {
                    return invalid(format!("{}: timeout_sec must be positive", c.feature_id));
                }
                if !c.exit_codes.is_distinct() {
                    return invalid(format!("{}: exit_codes must be distinct", c.feature_id));
                }
            }
        }
        Ok(())
    }

    /// Register every probe in manifest order. Relative commands resolve against `base_dir`.
    pub fn build_registry(&self, base_dir: &Path) -> Result<ProbeRegistry, RegistryError> {
        let mut registry = ProbeRegistry::new(&self.engine.id);
        for spec in &self.probes {
            let descriptor = spec.descriptor();
            match spec {
                ProbeSpec::Command(c) => registry.register(Box::new(
                    CommandProbe::new(descriptor, c.command.clone(), base_dir)
                        .requires(c.requires.clone())
                        .requires_env(c.requires_env.clone())
                        .timeout(Duration::from_secs(c.timeout_sec))
                        .on_timeout(c.on_timeout)
                        .exit_codes(c.exit_codes),
                ))?,
                ProbeSpec::Declared(d) => registry.register(Box::new(DeclaredProbe::new(
                    descriptor,
                    Verdict::new(d.outcome, d.explanation.clone()),
                )))?,
            }
        }
        Ok(registry)
    }

    /// Replace the timeout of every command probe.
    pub fn override_timeout(&mut self, timeout_sec: u64) {
        for spec in &mut self.probes {
            if let ProbeSpec::Command(c) = spec {
                c.timeout_sec = timeout_sec;
            }
        }
    }

    /// Engine identity with the given version (`unknown` when empty).
    pub fn engine_identity(&self, version: &str) -> EngineIdentity {
        let version = if version.trim().is_empty() { UNKNOWN_VERSION } else { version.trim() };
        EngineIdentity::new(&self.engine.id, &self.engine.name, version)
    }
}

fn is_slug(s: &str) -> bool {
    !s.trim().is_empty() && !s.contains(':')
}

/// Directory relative manifest paths resolve against.
pub fn manifest_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
