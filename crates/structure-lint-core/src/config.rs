//! Configuration types for structure-lint.
//!
//! Configuration shares its file with the `[[rules]]` tables; each side
//! ignores the other's keys.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::rules::RuleFormat;
use crate::types::FailOn;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Threshold at which the run fails (default: "fail").
    #[serde(default)]
    pub fail_on: FailOn,

    /// Scanner configuration.
    #[serde(default)]
    pub scanner: ScannerConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML or JSON file (chosen by extension).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse_as(&content, RuleFormat::from_path(path))
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Self::parse_as(content, RuleFormat::Toml)
    }

    /// Parses configuration in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is invalid.
    pub fn parse_as(content: &str, format: RuleFormat) -> Result<Self, ConfigError> {
        match format {
            RuleFormat::Toml => toml::from_str(content).map_err(|e| ConfigError::Parse {
                message: e.to_string(),
            }),
            RuleFormat::Json => serde_json::from_str(content).map_err(|e| ConfigError::Parse {
                message: e.to_string(),
            }),
        }
    }
}

/// Scanner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Glob patterns pruned from the walk.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Whether to follow symbolic links (cycles are detected and skipped).
    #[serde(default = "default_true")]
    pub follow_links: bool,

    /// Whether to drop paths ignored by the root `.gitignore`.
    #[serde(default)]
    pub respect_gitignore: bool,

    /// Maximum walk depth below the root.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            follow_links: true,
            respect_gitignore: false,
            max_depth: None,
        }
    }
}

fn default_exclude() -> Vec<String> {
    vec![".git".to_string(), "**/target".to_string()]
}

fn default_true() -> bool {
    true
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(structure_lint::config_unreadable))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(code(structure_lint::config_invalid))]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fail_on, FailOn::Fail);
        assert!(config.scanner.follow_links);
        assert!(!config.scanner.respect_gitignore);
        assert_eq!(config.scanner.exclude, vec![".git", "**/target"]);
    }

    #[test]
    fn test_parse_config_alongside_rules() {
        let toml = r#"
fail_on = "warn"

[scanner]
exclude = ["vendor"]
follow_links = false
max_depth = 8

[[rules]]
id = "readme"
path = "README.md"
requirement = "required"
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.fail_on, FailOn::Warn);
        assert_eq!(config.scanner.exclude, vec!["vendor"]);
        assert!(!config.scanner.follow_links);
        assert_eq!(config.scanner.max_depth, Some(8));
    }

    #[test]
    fn test_partial_scanner_section_keeps_defaults() {
        let config = Config::parse("[scanner]\nrespect_gitignore = true\n").unwrap();
        assert!(config.scanner.respect_gitignore);
        assert!(config.scanner.follow_links);
        assert_eq!(config.scanner.exclude.len(), 2);
    }

    #[test]
    fn test_parse_json_config() {
        let config =
            Config::parse_as(r#"{"fail_on": "warn", "rules": []}"#, RuleFormat::Json).unwrap();
        assert_eq!(config.fail_on, FailOn::Warn);
    }

    #[test]
    fn test_invalid_fail_on_rejected() {
        assert!(matches!(
            Config::parse("fail_on = \"error\"\n"),
            Err(ConfigError::Parse { .. })
        ));
    }
}
