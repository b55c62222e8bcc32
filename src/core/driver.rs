//! Build mode selection for development/production runs.

use clap::ValueEnum;
use std::fmt;

/// Build mode, selected once at startup and fixed for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BuildMode {
    /// On-demand dev server, no pipeline stages.
    #[value(alias = "dev")]
    Development,

    /// Bundle, merge, rewrite and clean up.
    #[value(aliases = ["prod", "build"])]
    Production,
}

impl BuildMode {
    /// Check if this is development mode.
    #[inline]
    pub const fn is_dev(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Value exported to subprocesses as `$WELD_MODE`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_aliases() {
        assert_eq!(BuildMode::from_str("production", true), Ok(BuildMode::Production));
        assert_eq!(BuildMode::from_str("build", true), Ok(BuildMode::Production));
        assert_eq!(BuildMode::from_str("dev", true), Ok(BuildMode::Development));
        assert!(BuildMode::from_str("staging", true).is_err());
    }

    #[test]
    fn test_display_matches_env_value() {
        assert_eq!(BuildMode::Production.to_string(), "production");
        assert!(BuildMode::Development.is_dev());
        assert!(!BuildMode::Production.is_dev());
    }
}
