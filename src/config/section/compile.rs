//! `[compile]` section configuration.
//!
//! The source compiler run by the dev server.
//!
//! # Example
//!
//! ```toml
//! [compile]
//! command = ["tsc", "--project", "tsconfig.build.json"]
//! trigger = "/dist/main.js"   # Request path that triggers a compile
//! timeout = 60                # Seconds, 0 = no limit
//! ```

use super::{to_timeout, validate_command};
use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    pub command: Vec<String>,

    /// Request path served from the compiler's output.
    pub trigger: String,

    /// Run time limit in seconds (0 disables).
    pub timeout: u64,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            command: ["tsc", "--project", "tsconfig.build.json"]
                .map(String::from)
                .to_vec(),
            trigger: "/dist/main.js".into(),
            timeout: 60,
        }
    }
}

impl CompileConfig {
    pub fn timeout(&self) -> Option<Duration> {
        to_timeout(self.timeout)
    }

    /// Whether a request path should trigger compilation (query string ignored).
    pub fn is_trigger(&self, url: &str) -> bool {
        url.split('?').next() == Some(self.trigger.as_str())
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        validate_command(FieldPath::new("compile.command"), &self.command, diag);
        if !self.trigger.starts_with('/') {
            diag.error(
                FieldPath::new("compile.trigger"),
                format!("`{}` must start with `/`", self.trigger),
            );
        }
    }
}
