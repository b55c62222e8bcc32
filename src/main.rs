//! Weld - fuses a legacy script into the entry bundle and rewrites the HTML shell.

mod cli;
mod config;
mod core;
mod logger;
mod pipeline;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::PipelineConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = PipelineConfig::load(&cli)?;
    let mode = cli.mode();
    debug!("weld"; "{} mode, root {}", mode, config.get_root().display());

    cli::build::run_pipeline(&config, mode)?;
    if mode.is_dev() {
        cli::serve::serve(&config)?;
    }
    Ok(())
}
