//! `[html]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [html]
//! pattern = '<script type="module" src="/dist/main.js"></script>'
//! replacement = '<script type="text/javascript" src="./$WELD_ENTRY_NAME"></script>'
//! output = "index.html"     # Relative to the output directory
//! ```

use super::escapes;
use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    /// Literal script tag to replace.
    pub pattern: String,

    /// Replacement tag; `$WELD_ENTRY_NAME` expands to the fused artifact name.
    pub replacement: String,

    /// Rewritten document location, relative to the output directory.
    pub output: PathBuf,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            pattern: r#"<script type="module" src="/dist/main.js"></script>"#.into(),
            replacement: r#"<script type="text/javascript" src="./$WELD_ENTRY_NAME"></script>"#
                .into(),
            output: "index.html".into(),
        }
    }
}

impl HtmlConfig {
    /// Replacement tag pointing at `entry_name`.
    pub fn replacement_for(&self, entry_name: &str) -> String {
        self.replacement.replace("$WELD_ENTRY_NAME", entry_name)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.pattern.is_empty() {
            diag.error(FieldPath::new("html.pattern"), "pattern must not be empty");
        }
        if self.output.as_os_str().is_empty() || escapes(&self.output) {
            diag.error_with_hint(
                FieldPath::new("html.output"),
                format!("`{}` points outside the output directory", self.output.display()),
                "the path is resolved inside `paths.output`",
            );
        }
    }
}
