//! `[paths]` section configuration.
//!
//! The fixed set of inputs the pipeline works over, plus the output directory.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! entry = "ts/main.ts"      # Typed entry point handed to the bundler
//! legacy = "game.js"        # Hand-authored script fused ahead of the entry bundle
//! html = "index.html"       # HTML shell rewritten for production
//! output = "dist"           # Build output directory
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Input and output locations, relative to the project root until normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Typed script entry point.
    pub entry: PathBuf,

    /// Legacy script fused into the entry bundle.
    pub legacy: PathBuf,

    /// HTML shell.
    pub html: PathBuf,

    /// Output directory.
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            entry: "ts/main.ts".into(),
            legacy: "game.js".into(),
            html: "index.html".into(),
            output: "dist".into(),
        }
    }
}

impl PathsConfig {
    /// Resolve every path against `root`.
    pub fn normalize(&mut self, root: &Path) {
        use crate::utils::path::normalize_path;

        self.entry = normalize_path(&root.join(&self.entry));
        self.legacy = normalize_path(&root.join(&self.legacy));
        self.html = normalize_path(&root.join(&self.html));
        self.output = normalize_path(&root.join(&self.output));
    }

    /// Report missing inputs.
    ///
    /// Missing inputs degrade the build instead of failing it, so these are hints.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let inputs = [
            (FieldPath::new("paths.entry"), &self.entry),
            (FieldPath::new("paths.legacy"), &self.legacy),
            (FieldPath::new("paths.html"), &self.html),
        ];
        for (field, path) in inputs {
            if !path.is_file() {
                diag.hint(field, format!("file not found: {}", path.display()));
            }
        }
    }
}
