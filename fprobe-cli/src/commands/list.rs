//! List command: the probes a manifest registers, in run order.

use fprobe_fs::Filesystem;
use fprobe_harness::{manifest_dir, Manifest};
use fprobe_schema::SpecTrack;

use crate::cli::{CliError, ListArgs};

use super::CommandResult;

/// One registered probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub feature_id: String,
    pub display_name: String,
    pub spec_track: SpecTrack,
    pub kind: &'static str,
}

impl ListEntry {
    /// `feature-id  v2  command  Display Name`
    pub fn line(&self) -> String {
        format!(
            "{:<28} {:<4} {:<9} {}",
            self.feature_id,
            self.spec_track.to_string(),
            self.kind,
            self.display_name
        )
    }
}

/// Execute the list command.
///
/// Builds the registry so duplicates are reported exactly as `run` would.
pub fn execute_list<F: Filesystem>(args: &ListArgs, fs: &F) -> CommandResult<Vec<ListEntry>> {
    if !fs.exists(&args.manifest) {
        return Err(CliError::ManifestNotFound(args.manifest.clone()).into());
    }
    let manifest = Manifest::load(fs, &args.manifest)?;
    let registry = manifest.build_registry(&manifest_dir(&args.manifest))?;

    Ok(registry
        .iter()
        .map(|probe| {
            let d = probe.descriptor();
            ListEntry {
                feature_id: d.feature_id.clone(),
                display_name: d.display_name.clone(),
                spec_track: d.spec_track,
                kind: probe.kind(),
            }
        })
        .collect())
}
