//! Command-line interface definitions.

use crate::core::BuildMode;
use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Weld: fuse a bundled entry point and a legacy script into one deployable build
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: weld.toml)
    #[arg(short = 'C', long, global = true, default_value = "weld.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the production pipeline (bundle, merge, rewrite, cleanup)
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Start the development server, compiling the entry point on request
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable verbose output for debugging
        #[arg(short = 'V', long)]
        verbose: bool,
    },

    /// Run in the mode named by `--mode` or `WELD_MODE`
    #[command(visible_alias = "r")]
    Run {
        /// Build mode
        #[arg(short = 'M', long, env = "WELD_MODE", value_enum)]
        mode: BuildMode,

        #[command(flatten)]
        build_args: BuildArgs,
    },
}

/// Arguments for the production pipeline
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Empty the output directory before bundling
    #[arg(short, long)]
    pub clean: bool,

    /// Minify the legacy script before fusion
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    /// The build mode this invocation runs in.
    pub const fn mode(&self) -> BuildMode {
        match &self.command {
            Commands::Build { .. } => BuildMode::Production,
            Commands::Serve { .. } => BuildMode::Development,
            Commands::Run { mode, .. } => *mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_is_production() {
        let cli = Cli::try_parse_from(["weld", "build", "--minify=false"]).unwrap();
        assert_eq!(cli.mode(), BuildMode::Production);
        let Commands::Build { build_args } = &cli.command else {
            panic!("expected build");
        };
        assert_eq!(build_args.minify, Some(false));
    }

    #[test]
    fn test_serve_is_development() {
        let cli = Cli::try_parse_from(["weld", "serve", "--port", "8080"]).unwrap();
        assert_eq!(cli.mode(), BuildMode::Development);
    }

    #[test]
    fn test_run_mode_flag() {
        let cli = Cli::try_parse_from(["weld", "run", "--mode", "production", "--clean"]).unwrap();
        assert_eq!(cli.mode(), BuildMode::Production);

        let cli = Cli::try_parse_from(["weld", "run", "-M", "dev"]).unwrap();
        assert_eq!(cli.mode(), BuildMode::Development);
    }

    #[test]
    fn test_config_flag_default() {
        let cli = Cli::try_parse_from(["weld", "build"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("weld.toml"));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
