//! Stage warnings and best-effort outcomes.
//!
//! Stages never fail the build. A stage either returns a value, a value plus
//! warnings ([`Outcome`]), or a warning in place of the value
//! ([`StageResult`]) that the caller degrades around.

use std::path::PathBuf;
use thiserror::Error;

/// Why a stage degraded.
#[derive(Debug, Error)]
pub enum StageWarning {
    /// Subprocess (bundler, compiler, minifier) failed, timed out, or produced unusable output.
    #[error("`{tool}` failed: {detail}")]
    ExternalTool { tool: String, detail: String },

    /// An expected input or output is missing.
    #[error("missing {what}: {detail}")]
    MissingArtifact { what: &'static str, detail: String },

    /// The HTML shell no longer contains the tag to substitute.
    #[error("pattern `{pattern}` not found in {}", path.display())]
    TemplateDrift { path: PathBuf, pattern: String },

    /// A cleanup target was already gone.
    #[error("{} already absent", .0.display())]
    StaleFileAbsent(PathBuf),

    #[error("cannot access `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
}

impl StageWarning {
    /// Wrap a tool failure, keeping the full error chain as detail.
    pub fn external(tool: impl Into<String>, err: impl Into<anyhow::Error>) -> Self {
        Self::ExternalTool {
            tool: tool.into(),
            detail: format!("{:#}", err.into()),
        }
    }

    pub fn missing(what: &'static str, detail: impl Into<String>) -> Self {
        Self::MissingArtifact {
            what,
            detail: detail.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io(path.into(), err)
    }

    /// Notices are expected conditions, only shown with `--verbose`.
    pub const fn is_notice(&self) -> bool {
        matches!(self, Self::StaleFileAbsent(_))
    }

    /// Message including the source chain.
    pub fn detail(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }

    /// Log under the stage that raised it.
    pub fn report(&self, stage: &str) {
        if self.is_notice() {
            crate::debug!(stage; "{}", self.detail());
        } else {
            crate::warn!(stage; "{}", self.detail());
        }
    }
}

/// Result of a stage step that degrades instead of failing.
pub type StageResult<T> = Result<T, StageWarning>;

/// Best-available output of a stage plus what went wrong producing it.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<StageWarning>,
}

impl<T> Outcome<T> {
    pub const fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn degraded(value: T, warning: StageWarning) -> Self {
        Self {
            value,
            warnings: vec![warning],
        }
    }

    pub fn warn(&mut self, warning: StageWarning) {
        self.warnings.push(warning);
    }

    /// True when nothing but notices were raised.
    pub fn is_clean(&self) -> bool {
        self.warnings.iter().all(StageWarning::is_notice)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    /// Move the warnings into `sink`, keeping the value.
    pub fn drain_into(self, sink: &mut Vec<StageWarning>) -> T {
        sink.extend(self.warnings);
        self.value
    }
}
