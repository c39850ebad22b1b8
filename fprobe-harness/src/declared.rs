//! Probes whose outcome is known up front.

use crate::probe::{Probe, ProbeContext, ProbeDescriptor, Verdict};

/// Returns a fixed verdict, e.g. for an engine that documents it has no
/// bloom filter support.
#[derive(Debug, Clone)]
pub struct DeclaredProbe {
    descriptor: ProbeDescriptor,
    verdict: Verdict,
}

impl DeclaredProbe {
    pub fn new(descriptor: ProbeDescriptor, verdict: Verdict) -> Self {
        Self { descriptor, verdict }
    }
}

impl Probe for DeclaredProbe {
    fn descriptor(&self) -> &ProbeDescriptor {
        &self.descriptor
    }

    fn run(&self, _ctx: &ProbeContext) -> Verdict {
        self.verdict.clone()
    }

    fn kind(&self) -> &'static str {
        "declared"
    }
}
