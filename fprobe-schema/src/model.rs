//! Outcome, support level, spec track and probe result types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::text::{single_line, truncate_chars};

/// Upper bound on a probe explanation, in characters.
pub const MAX_EXPLANATION_CHARS: usize = 300;

/// Version string used when an engine version cannot be determined.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Errors from parsing schema values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("invalid spec track {0:?}: expected v<N> with N >= 1")]
    InvalidTrack(String),

    #[error("invalid outcome {0:?}: expected pass, fail, skip, error or partial")]
    InvalidOutcome(String),

    #[error("invalid support level {0:?}: expected full, partial, none or unknown")]
    InvalidLevel(String),

    #[error("invalid claim key {0:?}: expected <engine>:<feature_id>:<spec_track>")]
    InvalidClaimKey(String),
}

/// Classification of a single probe execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Feature observed working.
    Pass,
    /// Feature observed broken or rejected by the engine.
    Fail,
    /// Prerequisites absent; nothing was verified.
    Skip,
    /// The probe itself malfunctioned; nothing was verified.
    Error,
    /// Feature positively confirmed as partially supported.
    Partial,
}

impl Outcome {
    /// Every outcome, in report order.
    pub const ALL: [Outcome; 5] = [
        Outcome::Pass,
        Outcome::Fail,
        Outcome::Skip,
        Outcome::Error,
        Outcome::Partial,
    ];

    /// Whether this outcome carries evidence about the feature.
    ///
    /// `skip` and `error` say nothing about the system under test.
    pub fn is_verifiable(self) -> bool {
        match self {
            Outcome::Pass | Outcome::Fail | Outcome::Partial => true,
            Outcome::Skip | Outcome::Error => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Pass => "pass",
            Outcome::Fail => "fail",
            Outcome::Skip => "skip",
            Outcome::Error => "error",
            Outcome::Partial => "partial",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Outcome::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| SchemaError::InvalidOutcome(s.to_string()))
    }
}

/// Declared support level from the feature catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportLevel {
    Full,
    Partial,
    None,
    Unknown,
}

impl SupportLevel {
    /// Every level, in catalog order.
    pub const ALL: [SupportLevel; 4] = [
        SupportLevel::Full,
        SupportLevel::Partial,
        SupportLevel::None,
        SupportLevel::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SupportLevel::Full => "full",
            SupportLevel::Partial => "partial",
            SupportLevel::None => "none",
            SupportLevel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SupportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupportLevel {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SupportLevel::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| SchemaError::InvalidLevel(s.to_string()))
    }
}

/// Version lineage of the table specification a feature belongs to (`v2`, `v3`, ...).
///
/// Serialized as its string form. Orders numerically, so `v10` sorts after `v9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SpecTrack(u32);

impl SpecTrack {
    /// The catalog's primary track.
    pub const fn primary() -> Self {
        SpecTrack(2)
    }

    /// Build a track from its number. Zero is not a valid track.
    pub fn new(number: u32) -> Result<Self, SchemaError> {
        if number == 0 {
            return Err(SchemaError::InvalidTrack("v0".to_string()));
        }
        Ok(SpecTrack(number))
    }

    pub fn number(self) -> u32 {
        self.0
    }
}

impl Default for SpecTrack {
    fn default() -> Self {
        SpecTrack::primary()
    }
}

impl fmt::Display for SpecTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl FromStr for SpecTrack {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SchemaError::InvalidTrack(s.to_string());
        let digits = s.strip_prefix('v').ok_or_else(invalid)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let number: u32 = digits.parse().map_err(|_| invalid())?;
        SpecTrack::new(number).map_err(|_| invalid())
    }
}

impl TryFrom<String> for SpecTrack {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SpecTrack> for String {
    fn from(track: SpecTrack) -> Self {
        track.to_string()
    }
}

/// Composite catalog key `<engine>:<feature_id>:<spec_track>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClaimKey {
    pub engine: String,
    pub feature_id: String,
    pub spec_track: SpecTrack,
}

impl ClaimKey {
    pub fn new(engine: &str, feature_id: &str, spec_track: SpecTrack) -> Self {
        Self {
            engine: engine.to_string(),
            feature_id: feature_id.to_string(),
            spec_track,
        }
    }
}

impl fmt::Display for ClaimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.engine, self.feature_id, self.spec_track)
    }
}

impl FromStr for ClaimKey {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [engine, feature_id, track]
                if !engine.is_empty() && !feature_id.is_empty() =>
            {
                let spec_track = track
                    .parse()
                    .map_err(|_| SchemaError::InvalidClaimKey(s.to_string()))?;
                Ok(ClaimKey::new(engine, feature_id, spec_track))
            }
            _ => Err(SchemaError::InvalidClaimKey(s.to_string())),
        }
    }
}

/// Identity of the engine under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineIdentity {
    /// Catalog slug, the first component of every claim key (e.g. `duckdb`).
    pub id: String,
    /// Display name (e.g. `DuckDB`).
    pub name: String,
    /// Reported version, or `unknown`.
    pub version: String,
}

impl EngineIdentity {
    pub fn new(id: &str, name: &str, version: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    /// Replace the version, keeping id and name.
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }
}

/// The recorded result of running one probe.
///
/// Identity fields are copied from the probe's descriptor by the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub feature_id: String,
    pub display_name: String,
    pub spec_track: SpecTrack,
    pub outcome: Outcome,
    /// Single-line, at most `MAX_EXPLANATION_CHARS` characters.
    pub explanation: String,
}

impl ProbeResult {
    /// Create a result, bounding the explanation.
    pub fn new(
        feature_id: &str,
        display_name: &str,
        spec_track: SpecTrack,
        outcome: Outcome,
        explanation: &str,
    ) -> Self {
        Self {
            feature_id: feature_id.to_string(),
            display_name: display_name.to_string(),
            spec_track,
            outcome,
            explanation: bound_explanation(explanation),
        }
    }

    /// The catalog key this result is judged against.
    pub fn claim_key(&self, engine: &str) -> ClaimKey {
        ClaimKey::new(engine, &self.feature_id, self.spec_track)
    }
}

/// Normalize free text into a bounded single-line explanation.
fn bound_explanation(text: &str) -> String {
    truncate_chars(&single_line(text), MAX_EXPLANATION_CHARS)
}
