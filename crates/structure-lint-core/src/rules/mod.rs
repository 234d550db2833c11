//! Declarative structure rules driven by TOML or JSON.
//!
//! # Architecture
//!
//! ```text
//! TOML / JSON text
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ validate + convert (loader)
//! RuleSet (pure domain model)
//! ```

use std::path::Path;

pub mod config_dto;
pub mod loader;
pub mod model;

pub use loader::LoadError;
pub use model::{
    GlobPattern, ModelError, PathPattern, RegexPattern, Requirement, Rule, RuleId, RuleSet,
};

/// Syntax of a rule source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RuleFormat {
    /// TOML with `[[rules]]` tables.
    #[default]
    Toml,
    /// JSON with a top-level `"rules"` array.
    Json,
}

impl RuleFormat {
    /// Picks the format from a file extension, defaulting to TOML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }

    /// Returns the format name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }
}

/// Parses rule source text into a validated [`RuleSet`].
///
/// Returns an empty set if the source defines no rules.
///
/// # Errors
///
/// Returns an error if parsing or model validation fails.
pub fn load_rule_set_from_str(content: &str, format: RuleFormat) -> Result<RuleSet, LoadError> {
    let dto: config_dto::RuleSetDto = match format {
        RuleFormat::Toml => toml::from_str(content).map_err(|e| LoadError::Syntax {
            format: format.name(),
            message: e.to_string(),
        })?,
        RuleFormat::Json => serde_json::from_str(content).map_err(|e| LoadError::Syntax {
            format: format.name(),
            message: e.to_string(),
        })?,
    };
    let rules = loader::load(dto)?;
    tracing::debug!("Loaded {} rule(s) from {} source", rules.len(), format.name());
    Ok(rules)
}

/// Reads and parses a rule source file, choosing the format by extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load_rule_set_from_file(path: &Path) -> Result<RuleSet, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_rule_set_from_str(&content, RuleFormat::from_path(path))
}
