//! Artifact fusion: legacy script ahead of the entry chunk.

use super::artifact::{ArtifactStage, SourceArtifact};
use super::manifest::BundleManifest;
use super::warning::{Outcome, StageWarning};

/// Join legacy content ahead of the entry code.
///
/// The result is exactly `legacy + "\n" + entry`; neither side is escaped
/// or otherwise altered.
pub fn fuse(legacy: &SourceArtifact, entry: &SourceArtifact) -> SourceArtifact {
    let mut content = String::with_capacity(legacy.len() + 1 + entry.len());
    content.push_str(legacy.content());
    content.push('\n');
    content.push_str(entry.content());
    entry.derive(ArtifactStage::Fused, content)
}

/// Fuse `legacy` into the manifest's entry chunk.
///
/// Without an entry chunk the manifest comes back unchanged, with a warning.
pub fn merge(manifest: BundleManifest, legacy: &SourceArtifact) -> Outcome<BundleManifest> {
    let Some(index) = manifest.entry_index() else {
        let warning = no_entry_chunk(&manifest);
        return Outcome::degraded(manifest, warning);
    };

    let Some(entry) = manifest.entries()[index].code() else {
        return Outcome::clean(manifest);
    };
    let fused = fuse(legacy, entry);
    Outcome::clean(manifest.with_code(index, fused))
}

/// Warning for a manifest with nothing to fuse into.
pub fn no_entry_chunk(manifest: &BundleManifest) -> StageWarning {
    let detail = format!("none of {} bundle outputs is an entry chunk", manifest.len());
    StageWarning::missing("entry chunk", detail)
}
