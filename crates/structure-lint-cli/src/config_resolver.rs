//! Rule source resolution with global fallback.
//!
//! Lookup order, first hit wins:
//!
//! 1. the `--config` flag, taken as given
//! 2. `{project}/structure-lint.toml`, then `{project}/.structure-lint.toml`
//! 3. `config.toml` in the global directory (`~/.structure-lint/`)
//!
//! Running out of candidates yields [`ConfigSource::Missing`]; a lint run
//! without rules is an error, not a silent pass.

use std::path::{Path, PathBuf};

/// Where the rule source was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given via `--config`.
    Explicit(PathBuf),
    /// Found in the repository root.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Missing,
}

impl ConfigSource {
    /// Path of the rule file, unless nothing was found.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(path) | Self::Project(path) | Self::Global(path) => Some(path),
            Self::Missing => None,
        }
    }

    /// Whether the rules come from the user's global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

/// Project-level rule file names, checked in order.
pub const PROJECT_CONFIG_NAMES: &[&str] = &["structure-lint.toml", ".structure-lint.toml"];

const GLOBAL_FILE_NAME: &str = "config.toml";

const CONFIG_DIR_ENV: &str = "STRUCTURE_LINT_CONFIG_DIR";

/// Resolves the rule source for a repository root.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    lookup(project_dir, explicit, global_config_dir().as_deref())
}

// Takes the global dir as a parameter so tests need not touch env vars.
fn lookup(project_dir: &Path, explicit: Option<&Path>, global_dir: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    let project = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|path| path.is_file());
    if let Some(path) = project {
        tracing::debug!("Found project rules: {}", path.display());
        return ConfigSource::Project(path);
    }

    match global_dir.map(|dir| dir.join(GLOBAL_FILE_NAME)) {
        Some(path) if path.is_file() => {
            tracing::debug!("Found global rules: {}", path.display());
            ConfigSource::Global(path)
        }
        _ => ConfigSource::Missing,
    }
}

/// Returns the global config directory: `$STRUCTURE_LINT_CONFIG_DIR`, else
/// `~/.structure-lint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) => Some(PathBuf::from(dir)),
        None => home::home_dir().map(|home| home.join(".structure-lint")),
    }
}
