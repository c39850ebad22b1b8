//! Read-only feature catalog: declared support levels keyed by claim.
//!
//! The catalog file maps `"<engine>:<feature_id>:<spec_track>"` to an object
//! carrying a `level`. The mapping is either the whole document or nested
//! under a top-level `"support"` key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use fprobe_fs::{Filesystem, FsError};
use fprobe_schema::{ClaimKey, SpecTrack, SupportLevel};
use serde_json::Value;
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: FsError,
    },

    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog must be a JSON object of claims")]
    NotAnObject,

    #[error("catalog entry {key} must be an object")]
    InvalidEntry { key: String },

    #[error("catalog entry {key} has invalid level {level}")]
    InvalidLevel { key: String, level: String },
}

/// Immutable claim lookup, loaded once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureCatalog {
    claims: BTreeMap<ClaimKey, SupportLevel>,
    ignored_keys: Vec<String>,
    sha256: String,
}

impl FeatureCatalog {
    /// Parse catalog bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, CatalogError> {
        let doc: Value = serde_json::from_slice(bytes)?;
        let root = doc.as_object().ok_or(CatalogError::NotAnObject)?;
        let mapping = match root.get("support") {
            Some(Value::Object(support)) => support,
            Some(_) => return Err(CatalogError::NotAnObject),
            None => root,
        };

        let mut claims = BTreeMap::new();
        let mut ignored_keys = Vec::new();
        for (raw_key, value) in mapping {
            let key: ClaimKey = match raw_key.parse() {
                Ok(key) => key,
                Err(_) => {
                    ignored_keys.push(raw_key.clone());
                    continue;
                }
            };
            let entry = value.as_object().ok_or_else(|| CatalogError::InvalidEntry {
                key: raw_key.clone(),
            })?;
            let level = match entry.get("level") {
                None | Some(Value::Null) => SupportLevel::Unknown,
                Some(Value::String(s)) => s.parse().map_err(|_| CatalogError::InvalidLevel {
                    key: raw_key.clone(),
                    level: s.clone(),
                })?,
                Some(other) => {
                    return Err(CatalogError::InvalidLevel {
                        key: raw_key.clone(),
                        level: other.to_string(),
                    })
                }
            };
            claims.insert(key, level);
        }

        Ok(Self {
            claims,
            ignored_keys,
            sha256: hex::encode(Sha256::digest(bytes)),
        })
    }

    /// Read and parse a catalog file.
    pub fn load<F: Filesystem>(fs: &F, path: &Path) -> Result<Self, CatalogError> {
        let bytes = fs.read_bytes(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&bytes)
    }

    /// Build a catalog in memory. The digest is empty.
    pub fn from_claims<I>(claims: I) -> Self
    where
        I: IntoIterator<Item = (ClaimKey, SupportLevel)>,
    {
        Self {
            claims: claims.into_iter().collect(),
            ignored_keys: Vec::new(),
            sha256: String::new(),
        }
    }

    /// Declared level for a claim, if present.
    pub fn level(&self, key: &ClaimKey) -> Option<SupportLevel> {
        self.claims.get(key).copied()
    }

    /// Declared level, `unknown` when the catalog has no claim.
    pub fn declared_level(&self, engine: &str, feature_id: &str, spec_track: SpecTrack) -> SupportLevel {
        self.level(&ClaimKey::new(engine, feature_id, spec_track))
            .unwrap_or(SupportLevel::Unknown)
    }

    /// Number of claims for one engine.
    pub fn claims_for(&self, engine: &str) -> usize {
        self.claims.keys().filter(|k| k.engine == engine).count()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Keys skipped because they were not `<engine>:<feature>:v<N>`.
    pub fn ignored_keys(&self) -> &[String] {
        &self.ignored_keys
    }

    /// Hex SHA-256 of the bytes the catalog was parsed from.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }
}
