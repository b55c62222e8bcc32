//! `[bundle]` section configuration.
//!
//! The primary bundler run by the Bundle stage.
//!
//! # Example
//!
//! ```toml
//! [bundle]
//! command = ["esbuild", "$WELD_ENTRY", "--bundle", "--outdir=$WELD_OUTPUT_DIR", "--metafile=$WELD_METAFILE"]
//! build_args = ["--minify", "--drop:console", "--drop:debugger"]
//! entry_name = "bundle.min.js"  # File name the fused entry chunk is written under
//! timeout = 120                 # Seconds, 0 = no limit
//! ```
//!
//! The command must write its outputs under `$WELD_OUTPUT_DIR` and an
//! esbuild-style metafile to `$WELD_METAFILE`. The bundler only runs for
//! production builds; the defaults emit no source maps, since fusion shifts
//! every offset in the entry chunk.

use super::{validate_command, to_timeout};
use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Bundler command and arguments, with `$WELD_*` substitution.
    pub command: Vec<String>,

    /// Extra arguments appended after `command`.
    pub build_args: Vec<String>,

    /// Output file name of the fused entry chunk.
    pub entry_name: String,

    /// Run time limit in seconds (0 disables).
    pub timeout: u64,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            command: [
                "esbuild",
                "$WELD_ENTRY",
                "--bundle",
                "--outdir=$WELD_OUTPUT_DIR",
                "--metafile=$WELD_METAFILE",
                "--target=es2015",
            ]
            .map(String::from)
            .to_vec(),
            build_args: ["--minify", "--drop:console", "--drop:debugger"]
                .map(String::from)
                .to_vec(),
            entry_name: "bundle.min.js".into(),
            timeout: 120,
        }
    }
}

impl BundleConfig {
    pub fn timeout(&self) -> Option<Duration> {
        to_timeout(self.timeout)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        validate_command(FieldPath::new("bundle.command"), &self.command, diag);

        if self.entry_name.is_empty() || self.entry_name.contains(['/', '\\']) {
            diag.error_with_hint(
                FieldPath::new("bundle.entry_name"),
                format!("invalid file name `{}`", self.entry_name),
                "use a plain file name such as `bundle.min.js`",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};
    use std::time::Duration;

    #[test]
    fn test_bundle_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.bundle.command[0], "esbuild");
        assert!(config.bundle.command.iter().any(|a| a.contains("$WELD_METAFILE")));
        assert!(!config.bundle.command.iter().any(|a| a.starts_with("--sourcemap")));
        assert_eq!(
            config.bundle.build_args,
            ["--minify", "--drop:console", "--drop:debugger"]
        );
        assert_eq!(config.bundle.entry_name, "bundle.min.js");
        assert_eq!(config.bundle.timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_bundle_timeout_zero_disables() {
        let config = test_parse_config("[bundle]\ntimeout = 0");
        assert_eq!(config.bundle.timeout(), None);
    }

    #[test]
    fn test_bundle_entry_name_rejects_paths() {
        let config = test_parse_config("[bundle]\nentry_name = \"js/app.js\"\ncommand = [\"sh\"]");
        let mut diag = ConfigDiagnostics::new();
        config.bundle.validate(&mut diag);
        assert!(diag.has_errors());
    }
}
