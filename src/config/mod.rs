//! Pipeline configuration management for `weld.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # One module per TOML section
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # Config file discovery
//! └── mod.rs         # PipelineConfig (this file)
//! ```
//!
//! A missing `weld.toml` is not an error: every section has defaults that
//! describe the conventional layout (`ts/main.ts`, `game.js`, `index.html`,
//! `dist/`).

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    BundleConfig, CleanupConfig, CompileConfig, HtmlConfig, MinifyBackend, MinifyConfig,
    PathsConfig, ServeConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{BuildArgs, Cli, Commands},
    debug, log,
    utils::path::normalize_path,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing weld.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Empty the output directory before bundling (CLI only)
    #[serde(skip)]
    pub clean: bool,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub bundle: BundleConfig,

    #[serde(default)]
    pub minify: MinifyConfig,

    #[serde(default)]
    pub html: HtmlConfig,

    #[serde(default)]
    pub cleanup: CleanupConfig,

    #[serde(default)]
    pub compile: CompileConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl PipelineConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file; the project root is the
    /// config file's parent directory, or cwd when no file exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config.config_path = path;
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self {
                    root: cwd.clone(),
                    config_path: cwd.join(&cli.config),
                    ..Self::default()
                }
            }
        };

        config.finalize(cli);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Unknown fields are reported and ignored; a build tool must not block on a prompt.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        crate::warn!("config"; "ignoring unknown fields in {}: {}", display_path, fields.join(", "));
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, cli: &Cli) {
        let root = normalize_path(&self.root);
        self.root = root.clone();

        self.paths.normalize(&root);
        self.minify.normalize(&root);
        self.apply_command_options(cli);
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Output directory (absolute after loading).
    pub fn output_dir(&self) -> &Path {
        &self.paths.output
    }

    /// Where the fused entry chunk is written.
    pub fn fused_output(&self) -> PathBuf {
        self.paths.output.join(&self.bundle.entry_name)
    }

    /// Where the rewritten HTML shell is written.
    pub fn html_output(&self) -> PathBuf {
        self.paths.output.join(&self.html.output)
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } => self.apply_build_args(build_args),
            Commands::Run { build_args, .. } => self.apply_build_args(build_args),
            Commands::Serve {
                interface,
                port,
                verbose,
            } => {
                crate::logger::set_verbose(*verbose);
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
            }
        }
    }

    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);
        Self::update_option(&mut self.minify.enable, args.minify.as_ref());
        self.clean = args.clean;
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting all errors at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.paths.validate(&mut diag);
        self.bundle.validate(&mut diag);
        self.minify.validate(&mut diag);
        self.html.validate(&mut diag);
        self.cleanup.validate(&mut diag);
        self.compile.validate(&mut diag);

        let html_output = normalize_path(&self.html_output());
        if html_output == normalize_path(&self.paths.html) {
            diag.error_with_hint(
                FieldPath::new("html.output"),
                format!("`{}` would overwrite the HTML shell", html_output.display()),
                "point `paths.output` or `html.output` somewhere else",
            );
        }

        if diag.has_errors() {
            log!("error"; "invalid {}", self.config_path.display());
        }
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from TOML.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PipelineConfig {
    let (parsed, ignored) = PipelineConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Config rooted at `root` with every path normalized, as `load` leaves it.
#[cfg(test)]
pub fn test_config_at(root: &Path, content: &str) -> PipelineConfig {
    let mut config = test_parse_config(content);
    config.root = root.to_path_buf();
    config.config_path = root.join("weld.toml");
    config.paths.normalize(root);
    config.minify.normalize(root);
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_invalid_toml() {
        let result: Result<PipelineConfig, _> = toml::from_str("[paths\nentry = \"main.ts\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_str_empty_is_default() {
        let (config, _) = PipelineConfig::parse_with_ignored("").unwrap();
        assert_eq!(config.bundle.entry_name, "bundle.min.js");
        assert_eq!(config.serve.port, 3000);
        assert!(config.minify.enable);
        assert!(!config.clean);
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[paths]\nentry = \"src/app.ts\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = PipelineConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.paths.entry, PathBuf::from("src/app.ts"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let content = "[minify]\nenable = false";
        let (_, ignored) = PipelineConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_output_locations() {
        let config = test_config_at(Path::new("/site"), "[html]\noutput = \"app.html\"");
        assert_eq!(config.output_dir(), Path::new("/site/dist"));
        assert_eq!(config.fused_output(), PathBuf::from("/site/dist/bundle.min.js"));
        assert_eq!(config.html_output(), PathBuf::from("/site/dist/app.html"));
    }

    #[test]
    fn test_validate_rejects_bad_sections() {
        let config = test_config_at(
            Path::new("/site"),
            "[cleanup]\nfiles = [\"/etc/passwd\"]\n[html]\npattern = \"\"",
        );
        let err = config.validate().unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_validate_rejects_html_output_outside_output_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "[html]\noutput = \"../index.html\"");
        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("html.output"));
    }

    #[test]
    fn test_validate_rejects_html_output_over_shell() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "[paths]\noutput = \".\"");
        assert_eq!(config.html_output(), dir.path().join("index.html"));

        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("would overwrite the HTML shell"));
    }
}
