//! The run report: one value rendered into every artifact.

use fprobe_clock::Clock;
use fprobe_schema::EngineIdentity;
use serde::{Deserialize, Serialize};

use crate::exit_policy::RunVerdict;
use crate::policy::MatchPolicy;
use crate::reconcile::ReconciledResult;
use crate::summary::Summary;

/// Schema version of the JSON artifact.
pub const REPORT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("invalid report JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported report version {found} (expected {})", REPORT_VERSION)]
    UnsupportedVersion { found: u32 },

    #[error("report summary does not match its results")]
    SummaryMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub report_version: u32,
    /// RFC 3339 UTC.
    pub timestamp: String,
    pub engine: EngineIdentity,
    pub policy: MatchPolicy,
    /// Digest of the catalog the results were judged against. Empty for in-memory catalogs.
    pub catalog_sha256: String,
    pub results: Vec<ReconciledResult>,
    pub summary: Summary,
}

impl Report {
    /// Build the report, stamping the time and counting the summary.
    pub fn build<C: Clock>(
        clock: &C,
        engine: EngineIdentity,
        policy: MatchPolicy,
        catalog_sha256: &str,
        results: Vec<ReconciledResult>,
    ) -> Self {
        let summary = Summary::from_results(&results);
        Self {
            report_version: REPORT_VERSION,
            timestamp: clock.now_rfc3339(),
            engine,
            policy,
            catalog_sha256: catalog_sha256.to_string(),
            results,
            summary,
        }
    }

    pub fn discrepancies(&self) -> impl Iterator<Item = &ReconciledResult> {
        self.results.iter().filter(|r| r.is_discrepancy)
    }

    pub fn verdict(&self) -> RunVerdict {
        RunVerdict::from_summary(&self.summary)
    }

    /// `<engine-id>-feature-report.json`
    pub fn json_file_name(&self) -> String {
        format!("{}-feature-report.json", self.engine.id)
    }

    /// `<engine-id>-feature-report.md`
    pub fn markdown_file_name(&self) -> String {
        format!("{}-feature-report.md", self.engine.id)
    }

    /// Serialize to JSON string (pretty-printed for readability).
    /// Output always ends with a newline for proper file termination.
    pub fn to_json(&self) -> String {
        let mut json = serde_json::to_string_pretty(self).expect("Report serialization cannot fail");
        json.push('\n');
        json
    }

    /// Read a report back, checking its version and summary.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        let report: Report = serde_json::from_str(json)?;
        if report.report_version != REPORT_VERSION {
            return Err(ReportError::UnsupportedVersion {
                found: report.report_version,
            });
        }
        if Summary::from_results(&report.results) != report.summary {
            return Err(ReportError::SummaryMismatch);
        }
        Ok(report)
    }
}
