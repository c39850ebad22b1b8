//! Ordered probe collection for one engine.

use fprobe_schema::SpecTrack;

use crate::probe::{Probe, ProbeDescriptor};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate probe for {feature_id} on {spec_track}")]
    Duplicate {
        feature_id: String,
        spec_track: SpecTrack,
    },
}

/// Probes in registration order. Each (feature_id, spec_track) appears once.
pub struct ProbeRegistry {
    engine_id: String,
    probes: Vec<Box<dyn Probe>>,
}

impl ProbeRegistry {
    pub fn new(engine_id: &str) -> Self {
        Self {
            engine_id: engine_id.to_string(),
            probes: Vec::new(),
        }
    }

    pub fn engine_id(&self) -> &str {
        &self.engine_id
    }

    /// Append a probe. Rejects a second probe for the same feature and track.
    pub fn register(&mut self, probe: Box<dyn Probe>) -> Result<(), RegistryError> {
        let new = probe.descriptor();
        let clash = self.probes.iter().any(|p| {
            let d = p.descriptor();
            d.feature_id == new.feature_id && d.spec_track == new.spec_track
        });
        if clash {
            return Err(RegistryError::Duplicate {
                feature_id: new.feature_id.clone(),
                spec_track: new.spec_track,
            });
        }
        self.probes.push(probe);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Probe> {
        self.probes.iter().map(|p| p.as_ref())
    }

    pub fn descriptors(&self) -> Vec<&ProbeDescriptor> {
        self.iter().map(|p| p.descriptor()).collect()
    }
}
