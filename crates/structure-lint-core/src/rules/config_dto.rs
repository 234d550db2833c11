//! Deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization from TOML or JSON.
//! They are converted to domain model types via the loader, which is where
//! missing fields are reported, so every field here is optional.

use serde::Deserialize;

/// Raw representation of a rule source.
///
/// Other top-level keys (`fail_on`, `[scanner]`) belong to
/// [`crate::Config`] and are ignored here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleSetDto {
    /// Rule definitions in declaration order.
    #[serde(default)]
    pub rules: Vec<RuleDto>,
}

/// Raw representation of one `[[rules]]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct RuleDto {
    /// Rule id (e.g., "adr-index").
    pub id: Option<String>,
    /// Glob over relative paths (mutually exclusive with `path_regex`).
    pub path: Option<String>,
    /// Regex over relative paths (mutually exclusive with `path`).
    pub path_regex: Option<String>,
    /// "file" or "directory" (default: "file").
    pub kind: Option<String>,
    /// "required", "optional" or "forbidden".
    pub requirement: Option<String>,
    /// Regex the file name of every match must satisfy.
    pub naming: Option<String>,
    /// Ids of rules whose canonical paths must appear in matched files.
    #[serde(default)]
    pub must_reference: Vec<String>,
    /// Explicit canonical path for cross-references to this rule.
    pub canonical: Option<String>,
    /// Extra message for non-passing verdicts.
    pub message: Option<String>,
    /// Guardrails document reference.
    pub doc: Option<String>,
}
