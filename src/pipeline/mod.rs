//! Build pipeline orchestration.
//!
//! The orchestrator owns the stage sequence and drives the bundler through
//! the [`Bundler`] capability.
//!
//! # Stages
//!
//! ```text
//! development:  (none, the dev server compiles on request)
//!
//! production:   Bundle ──► Merge ──► Rewrite ──► Cleanup
//!               │          │         │           │
//!               │          │         │           └─ delete superseded outputs
//!               │          │         └─ module tag → classic tag, write HTML
//!               │          └─ minify legacy, fuse into entry chunk, emit
//!               └─ run bundler, read manifest
//! ```
//!
//! Every stage runs exactly once, in order. A stage that fails degrades to
//! warnings and the next stage runs against whatever output exists; the run
//! always completes.

pub mod artifact;
pub mod bundler;
pub mod cleanup;
pub mod compile;
pub mod manifest;
pub mod merge;
pub mod minify;
pub mod rewrite;
pub mod warning;

pub use bundler::{Bundler, CommandBundler};
pub use warning::{Outcome, StageWarning};

use crate::config::PipelineConfig;
use crate::core::BuildMode;
use crate::utils::path::display_relative;
use crate::utils::vars::build_weld_vars;
use crate::{debug, done};
use artifact::{ArtifactStage, SourceArtifact};
use manifest::BundleManifest;
use std::fmt;

// =============================================================================
// Stages and reports
// =============================================================================

/// A named production stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Bundle,
    Merge,
    Rewrite,
    Cleanup,
}

impl Stage {
    /// Production order.
    pub const PRODUCTION: [Self; 4] = [Self::Bundle, Self::Merge, Self::Rewrite, Self::Cleanup];

    /// Stages a mode runs, in order.
    pub const fn plan(mode: BuildMode) -> &'static [Self] {
        match mode {
            BuildMode::Development => &[],
            BuildMode::Production => &Self::PRODUCTION,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bundle => "bundle",
            Self::Merge => "merge",
            Self::Rewrite => "rewrite",
            Self::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What one stage raised.
#[derive(Debug)]
pub struct StageReport {
    pub stage: Stage,
    pub warnings: Vec<StageWarning>,
}

impl StageReport {
    /// Completed without anything beyond notices.
    pub fn is_clean(&self) -> bool {
        self.warnings.iter().all(StageWarning::is_notice)
    }
}

/// Result of a pipeline run: one report per executed stage, in order.
#[derive(Debug)]
pub struct PipelineReport {
    pub mode: BuildMode,
    pub stages: Vec<StageReport>,
}

#[cfg(test)]
impl PipelineReport {
    fn executed(&self) -> Vec<Stage> {
        self.stages.iter().map(|report| report.stage).collect()
    }

    fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }
}

impl PipelineReport {
    /// Stages that raised real warnings.
    pub fn degraded(&self) -> impl Iterator<Item = &StageReport> {
        self.stages.iter().filter(|report| !report.is_clean())
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Drives the stage sequence for one run.
pub struct Orchestrator<'a, B: Bundler> {
    config: &'a PipelineConfig,
    bundler: B,
}

/// Values handed from one stage to the next.
#[derive(Default)]
struct RunState {
    manifest: Option<BundleManifest>,
}

impl<'a, B: Bundler> Orchestrator<'a, B> {
    pub const fn new(config: &'a PipelineConfig, bundler: B) -> Self {
        Self { config, bundler }
    }

    /// Run every stage `mode` plans. Never fails; see the report for warnings.
    pub fn run(&self, mode: BuildMode) -> PipelineReport {
        let mut state = RunState::default();
        let mut report = PipelineReport {
            mode,
            stages: Vec::new(),
        };

        for &stage in Stage::plan(mode) {
            debug!(stage.name(); "starting");
            let outcome = match stage {
                Stage::Bundle => self.bundle(&mut state),
                Stage::Merge => self.merge(&mut state, mode),
                Stage::Rewrite => self.rewrite(),
                Stage::Cleanup => self.cleanup(),
            };

            for warning in &outcome.warnings {
                warning.report(stage.name());
            }
            if outcome.is_clean() {
                done!(stage.name(); "{}", outcome.value);
            }

            report.stages.push(StageReport {
                stage,
                warnings: outcome.warnings,
            });
        }

        report
    }

    fn bundle(&self, state: &mut RunState) -> Outcome<String> {
        let name = self.bundler.name();
        match self.bundler.run_bundle() {
            Ok(manifest) => {
                let summary = format!("{} outputs from `{name}`", manifest.len());
                state.manifest = Some(manifest);
                Outcome::clean(summary)
            }
            Err(err) => Outcome::degraded(String::new(), StageWarning::external(name, err)),
        }
    }

    fn merge(&self, state: &mut RunState, mode: BuildMode) -> Outcome<String> {
        let config = self.config;
        let Some(manifest) = state.manifest.take() else {
            let warning = StageWarning::missing("bundle manifest", "bundle stage produced no outputs");
            return Outcome::degraded(String::new(), warning);
        };

        let mut warnings = Vec::new();
        let manifest = if manifest.entry_index().is_none() {
            warnings.push(merge::no_entry_chunk(&manifest));
            manifest
        } else {
            match self.prepare_legacy(mode, &mut warnings) {
                Some(legacy) => merge::merge(manifest, &legacy).drain_into(&mut warnings),
                None => manifest,
            }
        };

        let written = manifest
            .emit(config.output_dir(), &config.bundle.entry_name)
            .drain_into(&mut warnings);

        let target = config.fused_output();
        let summary = match manifest.entry_code() {
            Some(entry) if written.contains(&target) => format!(
                "{} {} ({} bytes)",
                entry.stage(),
                display_relative(&target, config.get_root()),
                entry.len()
            ),
            _ => format!("emitted {} outputs", written.len()),
        };

        Outcome {
            value: summary,
            warnings,
        }
    }

    /// Legacy script as it should be fused: minified in production when enabled.
    fn prepare_legacy(
        &self,
        mode: BuildMode,
        warnings: &mut Vec<StageWarning>,
    ) -> Option<SourceArtifact> {
        let config = self.config;
        let raw = match artifact::load_legacy(&config.paths.legacy) {
            Ok(raw) => raw,
            Err(warning) => {
                warnings.push(warning);
                return None;
            }
        };

        let legacy = if mode == BuildMode::Production && config.minify.enable {
            let vars = build_weld_vars(config, mode);
            minify::minify(&raw, &config.minify, &vars, config.get_root()).drain_into(warnings)
        } else {
            raw
        };

        debug!("merge"; "{} {} ({} bytes)", legacy.stage(), legacy.name(), legacy.len());
        Some(legacy.restage(ArtifactStage::PreFusion))
    }

    fn rewrite(&self) -> Outcome<String> {
        let config = self.config;
        let replacement = config.html.replacement_for(&config.bundle.entry_name);

        rewrite::rewrite_file(
            &config.paths.html,
            &config.html_output(),
            &config.html.pattern,
            &replacement,
        )
        .map(|written| match written {
            Some(path) => format!("generated {}", display_relative(&path, config.get_root())),
            None => String::new(),
        })
    }

    fn cleanup(&self) -> Outcome<String> {
        let config = self.config;
        let fused = config.fused_output();
        let html = config.html_output();
        let targets = config.cleanup.targets(config.output_dir());

        cleanup::cleanup(&targets, &[fused.as_path(), html.as_path()]).map(|removed| {
            match removed.len() {
                1 => "removed 1 stale file".to_string(),
                n => format!("removed {n} stale files"),
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use manifest::ManifestEntry;
    use std::cell::Cell;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const MODULE_TAG: &str = r#"<script type="module" src="/dist/main.js"></script>"#;
    const CLASSIC_TAG: &str = r#"<script type="text/javascript" src="./bundle.min.js"></script>"#;

    /// In-memory bundler returning a fixed manifest.
    struct FakeBundler {
        manifest: Option<BundleManifest>,
        calls: Cell<usize>,
    }

    impl FakeBundler {
        fn with(entries: Vec<ManifestEntry>) -> Self {
            Self {
                manifest: Some(BundleManifest::new(entries)),
                calls: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                manifest: None,
                calls: Cell::new(0),
            }
        }
    }

    impl Bundler for &FakeBundler {
        fn name(&self) -> &str {
            "fake"
        }

        fn run_bundle(&self) -> anyhow::Result<BundleManifest> {
            self.calls.set(self.calls.get() + 1);
            self.manifest
                .clone()
                .ok_or_else(|| anyhow::anyhow!("exit status: 1"))
        }
    }

    /// Project with a legacy script and an HTML shell.
    ///
    /// Minification is off unless `extra` configures it.
    fn project(extra: &str) -> (TempDir, PipelineConfig) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("game.js"), "var x=1;").unwrap();
        fs::write(
            dir.path().join("index.html"),
            format!("<body>\n  {MODULE_TAG}\n</body>\n"),
        )
        .unwrap();
        let toml = if extra.contains("[minify]") {
            extra.to_string()
        } else {
            format!("[minify]\nenable = false\n{extra}")
        };
        let config = test_config_at(dir.path(), &toml);
        (dir, config)
    }

    fn entry_bundle() -> FakeBundler {
        FakeBundler::with(vec![
            ManifestEntry::chunk("main.js", true, "console.log(x)"),
            ManifestEntry::asset("main.js.map", b"{}".to_vec()),
        ])
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_plan_is_pure() {
        assert!(Stage::plan(BuildMode::Development).is_empty());
        assert_eq!(
            Stage::plan(BuildMode::Production),
            [Stage::Bundle, Stage::Merge, Stage::Rewrite, Stage::Cleanup]
        );
    }

    #[test]
    fn test_development_runs_no_stage() {
        let (dir, config) = project("");
        let bundler = entry_bundle();

        let report = Orchestrator::new(&config, &bundler).run(BuildMode::Development);

        assert!(report.stages.is_empty());
        assert_eq!(bundler.calls.get(), 0);
        assert!(!dir.path().join("dist").exists());
    }

    #[test]
    fn test_production_runs_stages_in_order() {
        let (_dir, config) = project("");
        let bundler = entry_bundle();

        let report = Orchestrator::new(&config, &bundler).run(BuildMode::Production);

        assert_eq!(report.executed(), Stage::PRODUCTION);
        assert_eq!(bundler.calls.get(), 1);
        assert_eq!(report.degraded().count(), 0);
    }

    #[test]
    fn test_fused_bundle_starts_with_legacy() {
        let (_dir, config) = project("[cleanup]\nfiles = []");
        let bundler = entry_bundle();

        Orchestrator::new(&config, &bundler).run(BuildMode::Production);

        let fused = read(&config.fused_output());
        assert!(fused.starts_with("var x=1;\nconsole.log(x)"));
        assert_eq!(read(&config.output_dir().join("main.js.map")), "{}");
    }

    #[test]
    fn test_unavailable_minifier_fuses_raw_legacy() {
        let (_dir, config) = project(
            "[minify]\nenable = true\ncommand = [\"weld-no-such-minifier\", \"$WELD_INPUT\", \"$WELD_OUTPUT\"]",
        );
        let bundler = entry_bundle();
        let report = Orchestrator::new(&config, &bundler).run(BuildMode::Production);

        assert_eq!(read(&config.fused_output()), "var x=1;\nconsole.log(x)");
        let merge = report.stage(Stage::Merge).unwrap();
        assert!(matches!(merge.warnings[..], [StageWarning::ExternalTool { .. }]));
        assert_eq!(report.executed(), Stage::PRODUCTION);
    }

    #[test]
    fn test_rewritten_html_differs_only_in_tag() {
        let (dir, config) = project("");
        let bundler = entry_bundle();

        Orchestrator::new(&config, &bundler).run(BuildMode::Production);

        let source = read(&dir.path().join("index.html"));
        let output = read(&config.html_output());
        assert!(output.contains(CLASSIC_TAG));
        assert_eq!(output.replace(CLASSIC_TAG, MODULE_TAG), source);
    }

    #[test]
    fn test_html_drift_completes_pipeline() {
        let (dir, config) = project("");
        fs::write(dir.path().join("index.html"), "<body>custom</body>").unwrap();
        let bundler = entry_bundle();

        let report = Orchestrator::new(&config, &bundler).run(BuildMode::Production);

        assert_eq!(read(&config.html_output()), "<body>custom</body>");
        let rewrite = report.stage(Stage::Rewrite).unwrap();
        assert!(matches!(rewrite.warnings[..], [StageWarning::TemplateDrift { .. }]));
        assert!(report.stage(Stage::Cleanup).is_some());
    }

    #[test]
    fn test_cleanup_tolerates_missing_files() {
        let (_dir, config) = project("[cleanup]\nfiles = [\"main.js\", \"gone.js\", \"bundle.js\"]");
        fs::create_dir_all(config.output_dir()).unwrap();
        fs::write(config.output_dir().join("main.js"), "stale").unwrap();
        fs::write(config.output_dir().join("bundle.js"), "stale").unwrap();
        let bundler = entry_bundle();

        let report = Orchestrator::new(&config, &bundler).run(BuildMode::Production);

        let cleanup = report.stage(Stage::Cleanup).unwrap();
        assert!(cleanup.is_clean());
        assert!(matches!(cleanup.warnings[..], [StageWarning::StaleFileAbsent(_)]));
        assert!(!config.output_dir().join("main.js").exists());
        assert!(!config.output_dir().join("bundle.js").exists());
    }

    #[test]
    fn test_cleanup_keeps_fused_and_html() {
        let (_dir, config) = project("[cleanup]\nfiles = [\"bundle.min.js\", \"index.html\", \"main.js\"]");
        let bundler = entry_bundle();

        Orchestrator::new(&config, &bundler).run(BuildMode::Production);

        assert!(config.fused_output().exists());
        assert!(config.html_output().exists());
    }

    #[test]
    fn test_bundler_failure_degrades() {
        let (_dir, config) = project("");
        let bundler = FakeBundler::failing();

        let report = Orchestrator::new(&config, &bundler).run(BuildMode::Production);

        assert_eq!(report.executed(), Stage::PRODUCTION);
        let bundle = report.stage(Stage::Bundle).unwrap();
        assert!(matches!(bundle.warnings[..], [StageWarning::ExternalTool { .. }]));
        let merge = report.stage(Stage::Merge).unwrap();
        assert!(matches!(merge.warnings[..], [StageWarning::MissingArtifact { .. }]));
        assert!(!config.fused_output().exists());
        assert!(config.html_output().exists());
    }

    #[test]
    fn test_no_entry_chunk_skips_fusion() {
        let (_dir, config) = project("");
        let bundler = FakeBundler::with(vec![ManifestEntry::chunk("shared.js", false, "var s;")]);

        let report = Orchestrator::new(&config, &bundler).run(BuildMode::Production);

        assert!(!config.fused_output().exists());
        assert_eq!(read(&config.output_dir().join("shared.js")), "var s;");
        let merge = report.stage(Stage::Merge).unwrap();
        assert!(matches!(
            merge.warnings[..],
            [StageWarning::MissingArtifact { what: "entry chunk", .. }]
        ));
    }

    #[test]
    fn test_no_entry_chunk_skips_minifier() {
        let (dir, config) = project(
            "[minify]\nenable = true\ncommand = [\"sh\", \"-c\", \"touch minified.flag && cp \\\"$WELD_INPUT\\\" \\\"$WELD_OUTPUT\\\"\"]",
        );
        let bundler = FakeBundler::with(vec![ManifestEntry::chunk("shared.js", false, "var s;")]);

        let report = Orchestrator::new(&config, &bundler).run(BuildMode::Production);

        assert!(!dir.path().join("minified.flag").exists());
        let merge = report.stage(Stage::Merge).unwrap();
        assert!(matches!(
            merge.warnings[..],
            [StageWarning::MissingArtifact { what: "entry chunk", .. }]
        ));
    }

    #[test]
    fn test_entry_chunk_runs_minifier() {
        let (dir, config) = project(
            "[minify]\nenable = true\ncommand = [\"sh\", \"-c\", \"touch minified.flag && cp \\\"$WELD_INPUT\\\" \\\"$WELD_OUTPUT\\\"\"]",
        );
        let bundler = entry_bundle();

        Orchestrator::new(&config, &bundler).run(BuildMode::Production);

        assert!(dir.path().join("minified.flag").exists());
        assert_eq!(read(&config.fused_output()), "var x=1;\nconsole.log(x)");
    }

    #[test]
    fn test_missing_legacy_emits_entry_unfused() {
        let (dir, config) = project("");
        fs::remove_file(dir.path().join("game.js")).unwrap();
        let bundler = entry_bundle();

        let report = Orchestrator::new(&config, &bundler).run(BuildMode::Production);

        assert_eq!(read(&config.fused_output()), "console.log(x)");
        let merge = report.stage(Stage::Merge).unwrap();
        assert!(matches!(
            merge.warnings[..],
            [StageWarning::MissingArtifact { what: "legacy script", .. }]
        ));
    }
}
