//! `$WELD_*` variables for external tool commands.
//!
//! Every command the pipeline runs sees the same base set, both substituted
//! into its arguments and exported into its environment:
//!
//! | Variable           | Value                                 |
//! |--------------------|---------------------------------------|
//! | `$WELD_ROOT`       | Project root                          |
//! | `$WELD_OUTPUT_DIR` | Output directory                      |
//! | `$WELD_MODE`       | `development` or `production`         |
//! | `$WELD_ENTRY`      | Typed entry point                     |
//! | `$WELD_ENTRY_NAME` | File name of the fused entry chunk    |
//!
//! Stages add their own (`$WELD_METAFILE`, `$WELD_INPUT`, `$WELD_OUTPUT`).

use crate::config::PipelineConfig;
use crate::core::BuildMode;
use rustc_hash::FxHashMap;
use std::path::Path;

pub type Vars = FxHashMap<String, String>;

/// Build the base `$WELD_*` variables for a run.
pub fn build_weld_vars(config: &PipelineConfig, mode: BuildMode) -> Vars {
    let mut vars = FxHashMap::default();

    vars.insert("WELD_ROOT".into(), config.get_root().display().to_string());
    vars.insert(
        "WELD_OUTPUT_DIR".into(),
        config.output_dir().display().to_string(),
    );
    vars.insert("WELD_MODE".into(), mode.to_string());
    vars.insert("WELD_ENTRY".into(), config.paths.entry.display().to_string());
    vars.insert("WELD_ENTRY_NAME".into(), config.bundle.entry_name.clone());

    vars
}

/// Add a path-valued variable.
pub fn insert_path(vars: &mut Vars, key: &str, path: &Path) {
    vars.insert(key.into(), path.display().to_string());
}

/// Resolve `$WELD_*` variables in command arguments
///
/// Longer names are substituted first so `$WELD_OUTPUT_DIR` is never
/// clobbered by `$WELD_OUTPUT`.
pub fn resolve_args(args: &[String], vars: &Vars) -> Vec<String> {
    let mut keys: Vec<_> = vars.keys().collect();
    keys.sort_by_key(|key| std::cmp::Reverse(key.len()));

    args.iter()
        .map(|arg| {
            let mut result = arg.clone();
            for key in &keys {
                let pattern = format!("${}", key);
                if result.contains(&pattern) {
                    result = result.replace(&pattern, &vars[*key]);
                }
            }
            result
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;

    #[test]
    fn test_build_weld_vars() {
        let config = test_config_at(Path::new("/game"), "");
        let vars = build_weld_vars(&config, BuildMode::Production);

        assert_eq!(vars["WELD_ROOT"], "/game");
        assert_eq!(vars["WELD_OUTPUT_DIR"], "/game/dist");
        assert_eq!(vars["WELD_MODE"], "production");
        assert_eq!(vars["WELD_ENTRY"], "/game/ts/main.ts");
        assert_eq!(vars["WELD_ENTRY_NAME"], "bundle.min.js");
    }

    #[test]
    fn test_resolve_args_simple() {
        let mut vars = FxHashMap::default();
        vars.insert("WELD_ENTRY".into(), "/game/ts/main.ts".into());
        vars.insert("WELD_OUTPUT_DIR".into(), "/game/dist".into());

        let args = vec![
            "esbuild".into(),
            "$WELD_ENTRY".into(),
            "--outdir=$WELD_OUTPUT_DIR".into(),
        ];

        let resolved = resolve_args(&args, &vars);
        assert_eq!(resolved, vec!["esbuild", "/game/ts/main.ts", "--outdir=/game/dist"]);
    }

    #[test]
    fn test_resolve_args_no_vars() {
        let vars = FxHashMap::default();
        let args = vec!["echo".into(), "hello".into()];
        assert_eq!(resolve_args(&args, &vars), args);
    }

    #[test]
    fn test_resolve_args_prefers_longest_name() {
        let mut vars = FxHashMap::default();
        vars.insert("WELD_OUTPUT".into(), "/tmp/out.js".into());
        vars.insert("WELD_OUTPUT_DIR".into(), "/game/dist".into());

        let args = vec!["$WELD_OUTPUT_DIR/x $WELD_OUTPUT".into()];
        assert_eq!(resolve_args(&args, &vars)[0], "/game/dist/x /tmp/out.js");
    }
}
