//! Matching policy between an observed outcome and a declared support level.

use fprobe_schema::{Outcome, SupportLevel};
use serde::{Deserialize, Serialize};

/// How a declared `partial` level is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialClaims {
    /// Declared `partial` counts as supported.
    #[default]
    Lenient,
    /// Declared `partial` is its own claim: `pass` needs `full`, `partial` needs `partial`.
    Strict,
}

impl PartialClaims {
    pub fn as_str(self) -> &'static str {
        match self {
            PartialClaims::Lenient => "lenient",
            PartialClaims::Strict => "strict",
        }
    }
}

/// Decides whether an outcome agrees with a declared level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// A `fail` outcome also agrees with a declared `unknown`.
    #[serde(default)]
    pub fail_matches_unknown: bool,
    #[serde(default)]
    pub partial_claims: PartialClaims,
}

impl MatchPolicy {
    /// True when `outcome` agrees with `declared`.
    ///
    /// `skip` and `error` verify nothing, so they always agree.
    pub fn matches(&self, outcome: Outcome, declared: SupportLevel) -> bool {
        match outcome {
            Outcome::Skip | Outcome::Error => true,
            Outcome::Pass => match declared {
                SupportLevel::Full => true,
                SupportLevel::Partial => self.partial_claims == PartialClaims::Lenient,
                SupportLevel::None | SupportLevel::Unknown => false,
            },
            Outcome::Partial => match declared {
                SupportLevel::Partial => true,
                SupportLevel::Full => self.partial_claims == PartialClaims::Lenient,
                SupportLevel::None | SupportLevel::Unknown => false,
            },
            Outcome::Fail => match declared {
                SupportLevel::None => true,
                SupportLevel::Unknown => self.fail_matches_unknown,
                SupportLevel::Full | SupportLevel::Partial => false,
            },
        }
    }

    /// One-line description for report headers.
    pub fn describe(&self) -> String {
        format!(
            "partial claims {}, fail vs unknown {}",
            self.partial_claims.as_str(),
            if self.fail_matches_unknown { "match" } else { "discrepancy" }
        )
    }
}

/// Match under the default policy.
pub fn matches(outcome: Outcome, declared: SupportLevel) -> bool {
    MatchPolicy::default().matches(outcome, declared)
}
