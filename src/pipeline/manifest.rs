//! Bundle manifest: the bundler's outputs, in emission order.
//!
//! Built from an esbuild-style metafile:
//!
//! ```json
//! { "outputs": {
//!     "dist/main.js":     { "entryPoint": "ts/main.ts", "bytes": 1024 },
//!     "dist/main.js.map": { "bytes": 2048 }
//! } }
//! ```
//!
//! Output keys are relative to the directory the bundler ran in. Key order
//! is kept (`serde_json` with `preserve_order`), so "first entry chunk" is
//! deterministic.

use super::artifact::{ArtifactStage, SourceArtifact};
use super::warning::{Outcome, StageWarning};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions the bundler emits code under.
const CHUNK_EXTENSIONS: [&str; 3] = ["js", "mjs", "cjs"];

/// Whether an output file name denotes a code chunk.
pub fn is_chunk_name(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CHUNK_EXTENSIONS.contains(&ext))
}

/// Output payload: code chunks carry text, everything else raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputBody {
    Code(SourceArtifact),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Path relative to the output directory.
    pub file_name: String,
    /// The bundler marked this output as an entry point.
    pub is_entry: bool,
    pub body: OutputBody,
}

impl ManifestEntry {
    pub fn chunk(file_name: impl Into<String>, is_entry: bool, code: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let artifact = SourceArtifact::new(file_name.clone(), ArtifactStage::Raw, code);
        Self {
            file_name,
            is_entry,
            body: OutputBody::Code(artifact),
        }
    }

    pub fn asset(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            is_entry: false,
            body: OutputBody::Bytes(bytes.into()),
        }
    }

    pub const fn is_chunk(&self) -> bool {
        matches!(self.body, OutputBody::Code(_))
    }

    pub const fn code(&self) -> Option<&SourceArtifact> {
        match &self.body {
            OutputBody::Code(artifact) => Some(artifact),
            OutputBody::Bytes(_) => None,
        }
    }

    fn bytes(&self) -> &[u8] {
        match &self.body {
            OutputBody::Code(artifact) => artifact.content().as_bytes(),
            OutputBody::Bytes(bytes) => bytes,
        }
    }
}

/// Ordered bundler outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleManifest {
    entries: Vec<ManifestEntry>,
}

#[derive(Deserialize)]
struct Metafile {
    #[serde(default)]
    outputs: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct OutputMeta {
    #[serde(rename = "entryPoint")]
    entry_point: Option<String>,
}

impl BundleManifest {
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Index of the fusion target: the first chunk flagged as an entry point.
    pub fn entry_index(&self) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.is_entry && entry.is_chunk())
    }

    /// The fusion target's code, if any.
    pub fn entry_code(&self) -> Option<&SourceArtifact> {
        self.entry_index().and_then(|i| self.entries[i].code())
    }

    /// Replace one entry's code, leaving every other entry untouched.
    pub fn with_code(mut self, index: usize, artifact: SourceArtifact) -> Self {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.body = OutputBody::Code(artifact);
        }
        self
    }

    /// Parse a metafile and load every listed output from disk.
    ///
    /// `cwd` is the directory the bundler ran in; names are stored relative
    /// to `output_dir`.
    pub fn from_metafile(json: &str, cwd: &Path, output_dir: &Path) -> Result<Self> {
        let metafile: Metafile = serde_json::from_str(json).context("Invalid bundler metafile")?;

        let mut entries = Vec::with_capacity(metafile.outputs.len());
        for (key, meta) in metafile.outputs {
            let meta: OutputMeta = serde_json::from_value(meta)
                .with_context(|| format!("Invalid metafile output `{key}`"))?;
            let path = cwd.join(&key);
            let file_name = relative_name(&path, output_dir);

            let bytes = fs::read(&path)
                .with_context(|| format!("Failed to read bundler output `{}`", path.display()))?;

            let entry = if is_chunk_name(&file_name) {
                match String::from_utf8(bytes) {
                    Ok(code) => ManifestEntry::chunk(file_name, meta.entry_point.is_some(), code),
                    Err(err) => ManifestEntry::asset(file_name, err.into_bytes()),
                }
            } else {
                ManifestEntry::asset(file_name, bytes)
            };
            entries.push(entry);
        }

        Ok(Self::new(entries))
    }

    /// Write every entry under `output_dir`.
    ///
    /// The fusion target goes to `entry_name`; the rest keep their own names.
    /// Returns the written paths.
    pub fn emit(&self, output_dir: &Path, entry_name: &str) -> Outcome<Vec<PathBuf>> {
        let target = self.entry_index();
        let mut outcome = Outcome::clean(Vec::with_capacity(self.entries.len()));

        for (index, entry) in self.entries.iter().enumerate() {
            let name = if Some(index) == target {
                entry_name
            } else {
                entry.file_name.as_str()
            };
            let path = output_dir.join(name);

            match write_file(&path, entry.bytes()) {
                Ok(()) => outcome.value.push(path),
                Err(err) => outcome.warn(StageWarning::io(path, err)),
            }
        }

        outcome
    }
}

fn relative_name(path: &Path, output_dir: &Path) -> String {
    let relative = path
        .strip_prefix(output_dir)
        .ok()
        .or_else(|| path.file_name().map(Path::new))
        .unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)
}
