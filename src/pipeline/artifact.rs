//! Script artifacts and the legacy script loader.

use super::warning::{StageResult, StageWarning};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Pipeline step that produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStage {
    /// Read from disk or emitted by the bundler as-is.
    Raw,
    /// Output of the minifier.
    Minified,
    /// Legacy content selected for fusion.
    PreFusion,
    /// Legacy content joined ahead of the entry chunk.
    Fused,
}

impl fmt::Display for ArtifactStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Raw => "raw",
            Self::Minified => "minified",
            Self::PreFusion => "pre-fusion",
            Self::Fused => "fused",
        })
    }
}

/// Named, immutable script text.
///
/// Stages never edit an artifact; they derive a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArtifact {
    name: String,
    stage: ArtifactStage,
    content: String,
}

impl SourceArtifact {
    pub fn new(name: impl Into<String>, stage: ArtifactStage, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stage,
            content: content.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn stage(&self) -> ArtifactStage {
        self.stage
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Same name, new stage and content.
    pub fn derive(&self, stage: ArtifactStage, content: impl Into<String>) -> Self {
        Self::new(self.name.clone(), stage, content)
    }

    /// Same name and content, tagged with a new stage.
    pub fn restage(&self, stage: ArtifactStage) -> Self {
        self.derive(stage, self.content.clone())
    }
}

/// Read the hand-authored legacy script as raw text.
pub fn load_legacy(path: &Path) -> StageResult<SourceArtifact> {
    let content = fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => StageWarning::missing("legacy script", path.display().to_string()),
        _ => StageWarning::io(path, err),
    })?;

    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(SourceArtifact::new(name, ArtifactStage::Raw, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_legacy() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("game.js");
        fs::write(&path, "var x=1;").unwrap();

        let artifact = load_legacy(&path).unwrap();
        assert_eq!(artifact.name(), "game.js");
        assert_eq!(artifact.stage(), ArtifactStage::Raw);
        assert_eq!(artifact.content(), "var x=1;");
    }

    #[test]
    fn test_load_legacy_missing() {
        let dir = TempDir::new().unwrap();
        let err = load_legacy(&dir.path().join("game.js")).unwrap_err();
        assert!(matches!(err, StageWarning::MissingArtifact { what: "legacy script", .. }));
    }

    #[test]
    fn test_derive_leaves_original() {
        let raw = SourceArtifact::new("game.js", ArtifactStage::Raw, "var  x = 1;");
        let minified = raw.derive(ArtifactStage::Minified, "var x=1;");

        assert_eq!(raw.content(), "var  x = 1;");
        assert_eq!(minified.name(), "game.js");
        assert_eq!(minified.stage(), ArtifactStage::Minified);
        assert_eq!(raw.restage(ArtifactStage::PreFusion).content(), raw.content());
    }
}
