//! `[cleanup]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [cleanup]
//! files = ["bundle.js", "main.js", "main.js.map"]   # Relative to the output directory
//! ```

use super::escapes;
use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Intermediate outputs superseded by fusion.
    pub files: Vec<PathBuf>,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            files: [
                "bundle.js",
                "main.js",
                "main.js.map",
                "mobileUtils.js",
                "mobileUtils.js.map",
            ]
            .map(PathBuf::from)
            .to_vec(),
        }
    }
}

impl CleanupConfig {
    /// Cleanup targets resolved inside `output_dir`.
    pub fn targets(&self, output_dir: &Path) -> Vec<PathBuf> {
        self.files.iter().map(|f| output_dir.join(f)).collect()
    }

    /// Targets must stay inside the output directory.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for file in &self.files {
            if escapes(file) {
                diag.error_with_hint(
                    FieldPath::new("cleanup.files"),
                    format!("`{}` points outside the output directory", file.display()),
                    "list paths relative to `paths.output`",
                );
            }
        }
    }
}
