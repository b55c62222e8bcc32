//! Configuration section definitions.
//!
//! Each module corresponds to a section in `weld.toml`:
//!
//! | Module    | TOML Section  | Purpose                                 |
//! |-----------|---------------|-----------------------------------------|
//! | `paths`   | `[paths]`     | Entry, legacy script, HTML shell, output |
//! | `bundle`  | `[bundle]`    | Primary bundler (Bundle stage)          |
//! | `minify`  | `[minify]`    | Legacy script minifier (Merge stage)    |
//! | `html`    | `[html]`      | Script tag substitution (Rewrite stage) |
//! | `cleanup` | `[cleanup]`   | Superseded outputs (Cleanup stage)      |
//! | `compile` | `[compile]`   | Source compiler (dev server)            |
//! | `serve`   | `[serve]`     | Development server                      |

mod bundle;
mod cleanup;
mod compile;
mod html;
mod minify;
mod paths;
mod serve;

pub use bundle::BundleConfig;
pub use cleanup::CleanupConfig;
pub use compile::CompileConfig;
pub use html::HtmlConfig;
pub use minify::{MinifyBackend, MinifyConfig};
pub use paths::PathsConfig;
pub use serve::ServeConfig;

use crate::config::{ConfigDiagnostics, FieldPath};
use std::path::{Component, Path};
use std::time::Duration;

/// Package runners fetch tools on demand, so a missing package is only detectable at run time.
const PACKAGE_RUNNERS: [&str; 5] = ["npx", "bunx", "pnpx", "yarn", "dlx"];

/// Seconds from config to an optional deadline (`0` = unbounded).
fn to_timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Whether a path meant to live inside the output directory can leave it.
fn escapes(path: &Path) -> bool {
    path.is_absolute() || path.components().any(|c| matches!(c, Component::ParentDir))
}

/// Check a tool command is non-empty and installed.
///
/// Tools are best-effort, so a missing binary is a hint rather than an error.
fn validate_command(field: FieldPath, command: &[String], diag: &mut ConfigDiagnostics) {
    let Some(cmd) = command.first() else {
        diag.error(field, format!("`{}` is empty", field.as_str()));
        return;
    };

    if which::which(cmd).is_ok() {
        return;
    }

    if PACKAGE_RUNNERS.contains(&cmd.as_str()) {
        if let Some(package) = command.get(1) {
            diag.hint(
                field,
                format!("`{package}` via `{cmd}`, ensure the package is installed"),
            );
        }
    } else {
        diag.hint(field, format!("`{cmd}` not found, the stage will degrade"));
    }
}
