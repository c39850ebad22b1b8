//! fprobe Schema
//!
//! Defines the value types shared by probes, the feature catalog and reports:
//! outcomes, declared support levels, spec tracks, engine identity and the
//! per-probe result record.

mod model;
mod text;

pub use model::{
    ClaimKey, EngineIdentity, Outcome, ProbeResult, SchemaError, SpecTrack, SupportLevel,
    MAX_EXPLANATION_CHARS, UNKNOWN_VERSION,
};
pub use text::{single_line, truncate_chars};
