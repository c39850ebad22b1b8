//! Pairs probe results with declared claims.

use fprobe_schema::{ProbeResult, SupportLevel};
use serde::{Deserialize, Serialize};

use crate::catalog::FeatureCatalog;
use crate::policy::MatchPolicy;

/// A probe result judged against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledResult {
    #[serde(flatten)]
    pub result: ProbeResult,
    /// `unknown` when the catalog has no claim.
    pub declared_level: SupportLevel,
    pub is_discrepancy: bool,
}

/// Stateless projection from results to reconciled results.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    catalog: &'a FeatureCatalog,
    engine_id: &'a str,
    policy: MatchPolicy,
}

impl<'a> Reconciler<'a> {
    pub fn new(catalog: &'a FeatureCatalog, engine_id: &'a str, policy: MatchPolicy) -> Self {
        Self {
            catalog,
            engine_id,
            policy,
        }
    }

    pub fn reconcile(&self, result: &ProbeResult) -> ReconciledResult {
        let declared_level =
            self.catalog
                .declared_level(self.engine_id, &result.feature_id, result.spec_track);
        ReconciledResult {
            result: result.clone(),
            declared_level,
            is_discrepancy: !self.policy.matches(result.outcome, declared_level),
        }
    }

    /// Reconcile every result, preserving order.
    pub fn reconcile_all(&self, results: &[ProbeResult]) -> Vec<ReconciledResult> {
        results.iter().map(|r| self.reconcile(r)).collect()
    }
}
