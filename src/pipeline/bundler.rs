//! Primary bundler capability.
//!
//! The orchestrator drives the bundler, not the other way round: a bundler
//! only has to turn the entry point into a [`BundleManifest`].

use super::manifest::BundleManifest;
use crate::config::PipelineConfig;
use crate::core::BuildMode;
use crate::utils::exec::{Cmd, EMPTY_FILTER};
use crate::utils::vars::{self, build_weld_vars, resolve_args};
use crate::debug;
use anyhow::{Context, Result, bail};
use std::fs;

/// Produces the bundle the rest of the pipeline works on.
pub trait Bundler {
    /// Tool name for log lines and warnings.
    fn name(&self) -> &str;

    /// Bundle the entry point, returning outputs in emission order.
    fn run_bundle(&self) -> Result<BundleManifest>;
}

/// Runs `bundle.command` and reads back its metafile.
pub struct CommandBundler<'a> {
    config: &'a PipelineConfig,
    mode: BuildMode,
}

impl<'a> CommandBundler<'a> {
    pub const fn new(config: &'a PipelineConfig, mode: BuildMode) -> Self {
        Self { config, mode }
    }

    /// Resolved command line: `command` followed by `build_args`.
    fn command_line(&self, vars: &vars::Vars) -> Vec<String> {
        let bundle = &self.config.bundle;
        let mut args = resolve_args(&bundle.command, vars);
        args.extend(resolve_args(&bundle.build_args, vars));
        args
    }
}

impl Bundler for CommandBundler<'_> {
    fn name(&self) -> &str {
        self.config
            .bundle
            .command
            .first()
            .map_or("bundler", String::as_str)
    }

    fn run_bundle(&self) -> Result<BundleManifest> {
        let config = self.config;
        let output_dir = config.output_dir();
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create `{}`", output_dir.display()))?;

        let metafile = tempfile::Builder::new()
            .prefix("weld-meta-")
            .suffix(".json")
            .tempfile()
            .context("Failed to create metafile")?
            .into_temp_path();

        let mut vars = build_weld_vars(config, self.mode);
        vars::insert_path(&mut vars, "WELD_METAFILE", &metafile);

        let args = self.command_line(&vars);
        debug!("bundle"; "running `{}`", args.join(" "));

        Cmd::from_slice(&args)
            .cwd(config.get_root())
            .envs(&vars)
            .timeout(config.bundle.timeout())
            .filter(&EMPTY_FILTER)
            .run()?;

        let json = fs::read_to_string(&metafile).context("Failed to read bundler metafile")?;
        if json.trim().is_empty() {
            bail!("`{}` wrote no metafile to $WELD_METAFILE", self.name());
        }

        BundleManifest::from_metafile(&json, config.get_root(), output_dir)
    }
}
