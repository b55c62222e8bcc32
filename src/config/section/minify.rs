//! `[minify]` section configuration.
//!
//! Controls how the legacy script is minified before fusion (production only).
//!
//! # Example
//!
//! ```toml
//! [minify]
//! enable = true
//! backend = "command"       # command | builtin
//! command = ["npx", "terser", "$WELD_INPUT", "--output", "$WELD_OUTPUT", "--compress", "--mangle", "--comments", "false"]
//! timeout = 60              # Seconds, 0 = no limit
//! temp_dir = "~/.cache/weld" # Where scoped temp files are created (default: system temp)
//! ```

use super::{to_timeout, validate_command};
use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Minifier implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinifyBackend {
    /// External minifier subprocess.
    #[default]
    Command,
    /// In-process oxc minifier.
    Builtin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinifyConfig {
    /// Minify the legacy script in production.
    pub enable: bool,

    pub backend: MinifyBackend,

    /// Minifier command, reading `$WELD_INPUT` and writing `$WELD_OUTPUT`.
    pub command: Vec<String>,

    /// Run time limit in seconds (0 disables).
    pub timeout: u64,

    /// Directory for scoped temp files.
    pub temp_dir: Option<PathBuf>,
}

impl Default for MinifyConfig {
    fn default() -> Self {
        Self {
            enable: true,
            backend: MinifyBackend::Command,
            command: [
                "npx",
                "terser",
                "$WELD_INPUT",
                "--output",
                "$WELD_OUTPUT",
                "--compress",
                "--mangle",
                "--comments",
                "false",
            ]
            .map(String::from)
            .to_vec(),
            timeout: 60,
            temp_dir: None,
        }
    }
}

impl MinifyConfig {
    pub fn timeout(&self) -> Option<Duration> {
        to_timeout(self.timeout)
    }

    /// Expand `~` and resolve a relative temp dir against `root`.
    pub fn normalize(&mut self, root: &Path) {
        if let Some(dir) = self.temp_dir.take() {
            let expanded = shellexpand::tilde(&dir.to_string_lossy()).into_owned();
            let dir = PathBuf::from(expanded);
            self.temp_dir = Some(if dir.is_relative() { root.join(dir) } else { dir });
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.enable || self.backend == MinifyBackend::Builtin {
            return;
        }
        let field = FieldPath::new("minify.command");
        validate_command(field, &self.command, diag);

        let wired = |var: &str| self.command.iter().any(|arg| arg.contains(var));
        if !self.command.is_empty() && !(wired("$WELD_INPUT") && wired("$WELD_OUTPUT")) {
            diag.error_with_hint(
                field,
                "minifier command must reference both $WELD_INPUT and $WELD_OUTPUT",
                "e.g. [\"terser\", \"$WELD_INPUT\", \"--output\", \"$WELD_OUTPUT\"]",
            );
        }
    }
}
