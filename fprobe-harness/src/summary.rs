//! Aggregate counts over reconciled results.

use fprobe_schema::Outcome;
use serde::{Deserialize, Serialize};

use crate::reconcile::ReconciledResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub partial: usize,
    pub discrepancies: usize,
}

impl Summary {
    /// Count in a single pass.
    pub fn from_results(results: &[ReconciledResult]) -> Self {
        let mut summary = Summary::default();
        for r in results {
            summary.total += 1;
            match r.result.outcome {
                Outcome::Pass => summary.passed += 1,
                Outcome::Fail => summary.failed += 1,
                Outcome::Skip => summary.skipped += 1,
                Outcome::Error => summary.errors += 1,
                Outcome::Partial => summary.partial += 1,
            }
            if r.is_discrepancy {
                summary.discrepancies += 1;
            }
        }
        summary
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Pass => self.passed,
            Outcome::Fail => self.failed,
            Outcome::Skip => self.skipped,
            Outcome::Error => self.errors,
            Outcome::Partial => self.partial,
        }
    }
}
