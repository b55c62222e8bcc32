//! Removal of intermediate outputs superseded by fusion.

use super::warning::{Outcome, StageWarning};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Delete each of `targets`, never touching `protected`.
///
/// Missing files are notices, not failures, so running twice is harmless.
/// Returns the paths actually removed.
pub fn cleanup(targets: &[PathBuf], protected: &[&Path]) -> Outcome<Vec<PathBuf>> {
    let mut outcome = Outcome::clean(Vec::new());

    for target in targets {
        if protected.iter().any(|keep| same_file(keep, target)) {
            crate::debug!("cleanup"; "keeping {}", target.display());
            continue;
        }

        match fs::remove_file(target) {
            Ok(()) => outcome.value.push(target.clone()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                outcome.warn(StageWarning::StaleFileAbsent(target.clone()));
            }
            Err(err) => outcome.warn(StageWarning::io(target, err)),
        }
    }

    outcome
}

/// Path equality that sees through `.`/`..` and symlinks when the files exist.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
