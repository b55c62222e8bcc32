//! Source compiler adapter (development only).
//!
//! Compiles the typed entry point to plain script on every request for the
//! compiled output. Nothing is cached; the dev server serves whatever the
//! compiler left on disk, stale or not.

use super::warning::{StageResult, StageWarning};
use crate::config::PipelineConfig;
use crate::core::BuildMode;
use crate::utils::exec::{Cmd, EMPTY_FILTER};
use crate::utils::vars::{build_weld_vars, resolve_args};
use std::time::{Duration, Instant};

/// Run `compile.command` in the project root, returning how long it took.
pub fn compile_entry(config: &PipelineConfig) -> StageResult<Duration> {
    let compile = &config.compile;
    let tool = compile
        .command
        .first()
        .cloned()
        .unwrap_or_else(|| "compiler".into());

    let vars = build_weld_vars(config, BuildMode::Development);
    let started = Instant::now();

    Cmd::from_slice(&resolve_args(&compile.command, &vars))
        .cwd(config.get_root())
        .envs(&vars)
        .timeout(compile.timeout())
        .filter(&EMPTY_FILTER)
        .run()
        .map_err(|err| StageWarning::external(tool, err))?;

    Ok(started.elapsed())
}
