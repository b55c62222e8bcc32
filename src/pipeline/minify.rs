//! Legacy script minification.
//!
//! Minification is an optimization, never a correctness requirement: on any
//! failure the original artifact comes back verbatim with a warning.
//!
//! Two backends:
//! - `command`: external minifier reading `$WELD_INPUT`, writing `$WELD_OUTPUT`
//! - `builtin`: in-process oxc compress + mangle, comments stripped

use super::artifact::{ArtifactStage, SourceArtifact};
use super::warning::{Outcome, StageResult, StageWarning};
use crate::config::{MinifyBackend, MinifyConfig};
use crate::utils::exec::{Cmd, EMPTY_FILTER};
use crate::utils::vars::{self, Vars, resolve_args};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use std::fs;
use std::path::Path;
use tempfile::TempPath;

/// Minify `artifact`, falling back to it unchanged on failure.
pub fn minify(
    artifact: &SourceArtifact,
    config: &MinifyConfig,
    vars: &Vars,
    root: &Path,
) -> Outcome<SourceArtifact> {
    let result = match config.backend {
        MinifyBackend::Command => run_command(artifact, config, vars, root),
        MinifyBackend::Builtin => minify_builtin(artifact.content()).ok_or_else(|| {
            StageWarning::external("oxc", anyhow::anyhow!("failed to parse `{}`", artifact.name()))
        }),
    };

    match result {
        Ok(code) => Outcome::clean(artifact.derive(ArtifactStage::Minified, code)),
        Err(warning) => Outcome::degraded(artifact.clone(), warning),
    }
}

// ============================================================================
// Command backend
// ============================================================================

/// Run the external minifier between two scoped temp files.
///
/// Both files are removed when their `TempPath` drops, on every return path.
fn run_command(
    artifact: &SourceArtifact,
    config: &MinifyConfig,
    vars: &Vars,
    root: &Path,
) -> StageResult<String> {
    let tool = config
        .command
        .first()
        .cloned()
        .unwrap_or_else(|| "minifier".into());

    let input = scoped_temp(config.temp_dir.as_deref(), "weld-in-")?;
    fs::write(&input, artifact.content()).map_err(|err| StageWarning::io(&*input, err))?;
    let output = scoped_temp(config.temp_dir.as_deref(), "weld-out-")?;

    let mut vars = vars.clone();
    vars::insert_path(&mut vars, "WELD_INPUT", &input);
    vars::insert_path(&mut vars, "WELD_OUTPUT", &output);

    Cmd::from_slice(&resolve_args(&config.command, &vars))
        .cwd(root)
        .envs(&vars)
        .timeout(config.timeout())
        .filter(&EMPTY_FILTER)
        .run()
        .map_err(|err| StageWarning::external(&tool, err))?;

    let minified = fs::read_to_string(&output).map_err(|err| StageWarning::ExternalTool {
        tool: tool.clone(),
        detail: format!("unreadable output: {err}"),
    })?;

    if minified.trim().is_empty() && !artifact.content().trim().is_empty() {
        return Err(StageWarning::ExternalTool {
            tool,
            detail: "produced empty output".into(),
        });
    }
    Ok(minified)
}

/// Uniquely named temp file, deleted on drop.
fn scoped_temp(dir: Option<&Path>, prefix: &str) -> StageResult<TempPath> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(prefix).suffix(".js");

    let file = match dir {
        Some(dir) => fs::create_dir_all(dir)
            .and_then(|()| builder.tempfile_in(dir))
            .map_err(|err| StageWarning::io(dir, err))?,
        None => builder
            .tempfile()
            .map_err(|err| StageWarning::io(std::env::temp_dir(), err))?,
    };
    Ok(file.into_temp_path())
}

// ============================================================================
// Builtin backend
// ============================================================================

/// Minify a classic script with oxc.
///
/// Returns `None` if the source does not parse.
pub fn minify_builtin(source: &str) -> Option<String> {
    let allocator = Allocator::default();
    // Legacy scripts are classic scripts: top-level names are globals
    let source_type = SourceType::cjs();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return None;
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Some(code)
}
