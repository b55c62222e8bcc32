//! Pipeline run for the `build` and `run` commands.

use crate::{
    config::PipelineConfig,
    core::BuildMode,
    log,
    pipeline::{CommandBundler, Orchestrator, PipelineReport},
    utils::path::display_relative,
};
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Run every stage `mode` plans with the configured bundler.
///
/// Stage failures are reported, never returned; only `--clean` can fail here.
pub fn run_pipeline(config: &PipelineConfig, mode: BuildMode) -> Result<PipelineReport> {
    if config.clean {
        clean_output(config.output_dir(), config.get_root())?;
    }

    let started = Instant::now();
    let report = Orchestrator::new(config, CommandBundler::new(config, mode)).run(mode);

    if !mode.is_dev() {
        log_summary(&report, config, started);
    }
    Ok(report)
}

fn log_summary(report: &PipelineReport, config: &PipelineConfig, started: Instant) {
    let elapsed = started.elapsed().as_millis();
    let output = display_relative(config.output_dir(), config.get_root());
    let degraded: Vec<_> = report.degraded().map(|r| r.stage.name()).collect();

    if degraded.is_empty() {
        log!("build"; "{} build in {}ms → {}", report.mode, elapsed, output);
    } else {
        log!("build"; "{} build in {}ms → {} (degraded: {})",
            report.mode, elapsed, output, degraded.join(", "));
    }
}

/// Empty the output directory, refusing to touch the project root or above.
fn clean_output(output_dir: &Path, root: &Path) -> Result<()> {
    if root.starts_with(output_dir) {
        bail!(
            "refusing to clean `{}`: it contains the project root",
            output_dir.display()
        );
    }
    if !output_dir.exists() {
        return Ok(());
    }

    for entry in fs::read_dir(output_dir)
        .with_context(|| format!("Failed to read `{}`", output_dir.display()))?
    {
        let path = entry?.path();
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.with_context(|| format!("Failed to remove `{}`", path.display()))?;
    }

    crate::debug!("build"; "cleaned {}", output_dir.display());
    Ok(())
}
