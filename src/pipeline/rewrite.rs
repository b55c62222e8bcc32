//! HTML shell rewriting.
//!
//! Swaps the development module-script tag for a classic-script tag that
//! loads the fused bundle. The HTML is treated as opaque text: one literal
//! substitution, nothing parsed.

use super::warning::{Outcome, StageResult, StageWarning};
use std::fs;
use std::path::Path;

/// Replace the first occurrence of `pattern` with `replacement`.
///
/// A missing pattern is template drift, reported with the document left
/// untouched so the caller can still ship it.
pub fn rewrite(html: &str, pattern: &str, replacement: &str) -> StageResult<String> {
    if pattern.is_empty() || !html.contains(pattern) {
        return Err(StageWarning::TemplateDrift {
            path: Default::default(),
            pattern: pattern.to_string(),
        });
    }
    Ok(html.replacen(pattern, replacement, 1))
}

/// Read the shell at `source`, rewrite it, and write the result to `target`.
///
/// On template drift the unchanged document is still written. Returns
/// `Some(target)` when a file was written.
pub fn rewrite_file(
    source: &Path,
    target: &Path,
    pattern: &str,
    replacement: &str,
) -> Outcome<Option<std::path::PathBuf>> {
    let html = match fs::read_to_string(source) {
        Ok(html) => html,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let warning = StageWarning::missing("HTML shell", source.display().to_string());
            return Outcome::degraded(None, warning);
        }
        Err(err) => return Outcome::degraded(None, StageWarning::io(source, err)),
    };

    let mut outcome = Outcome::clean(None);
    let rewritten = match rewrite(&html, pattern, replacement) {
        Ok(rewritten) => rewritten,
        Err(StageWarning::TemplateDrift { pattern, .. }) => {
            outcome.warn(StageWarning::TemplateDrift {
                path: source.to_path_buf(),
                pattern,
            });
            html
        }
        Err(other) => {
            outcome.warn(other);
            html
        }
    };

    let written = target
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| fs::write(target, rewritten));
    match written {
        Ok(()) => outcome.value = Some(target.to_path_buf()),
        Err(err) => outcome.warn(StageWarning::io(target, err)),
    }
    outcome
}
