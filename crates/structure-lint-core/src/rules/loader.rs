//! DTO → Domain model conversion with validation.

use std::collections::HashSet;
use std::path::PathBuf;

use miette::Diagnostic;

use crate::types::EntryKind;

use super::config_dto::{RuleDto, RuleSetDto};
use super::model::{GlobPattern, ModelError, PathPattern, RegexPattern, Requirement, Rule, RuleId, RuleSet};

/// Errors while loading a rule set. All of them are fatal.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum LoadError {
    /// The rule source could not be read.
    #[error("failed to read rule source {path}: {source}")]
    #[diagnostic(code(structure_lint::rule_source_unreadable))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The rule source is not valid TOML/JSON or has unknown rule fields.
    #[error("{format} parse error: {message}")]
    #[diagnostic(
        code(structure_lint::malformed_rule),
        help("check the rule source syntax; rule keys are id, path, path-regex, kind, requirement, naming, must-reference, canonical, message, doc")
    )]
    Syntax {
        /// Source format name.
        format: &'static str,
        /// Parser message.
        message: String,
    },

    /// A rule has a missing or invalid field.
    #[error("malformed rule {context}: {reason}")]
    #[diagnostic(code(structure_lint::malformed_rule))]
    MalformedRule {
        /// Where the error occurred (e.g., "rules[0] `adr-index`.path").
        context: String,
        /// What is wrong.
        reason: String,
    },

    /// Two rules share an id.
    #[error("duplicate rule id `{id}`")]
    #[diagnostic(
        code(structure_lint::duplicate_rule),
        help("every [[rules]] entry needs a unique id")
    )]
    DuplicateRule {
        /// The repeated id.
        id: String,
    },

    /// Cross-rule invariants failed.
    #[error("malformed rule set:\n{}", format_errors(.0))]
    #[diagnostic(code(structure_lint::malformed_rule))]
    InvalidRuleSet(Vec<ModelError>),
}

impl LoadError {
    fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRule {
            context: context.into(),
            reason: reason.into(),
        }
    }

    fn field(context: &str, field: &str, source: &ModelError) -> Self {
        Self::malformed(format!("{context}.{field}"), source.to_string())
    }
}

fn format_errors(errors: &[ModelError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Converts a `RuleSetDto` to a validated `RuleSet`.
///
/// # Errors
///
/// Returns the first field-level error, the first duplicate id, or every
/// cross-rule invariant violation.
pub fn load(dto: RuleSetDto) -> Result<RuleSet, LoadError> {
    let mut seen = HashSet::new();
    let mut rules = Vec::with_capacity(dto.rules.len());

    for (index, rule_dto) in dto.rules.into_iter().enumerate() {
        let rule = convert_rule(rule_dto, index)?;
        if !seen.insert(rule.id().clone()) {
            return Err(LoadError::DuplicateRule {
                id: rule.id().to_string(),
            });
        }
        rules.push(rule);
    }

    RuleSet::new(rules).map_err(LoadError::InvalidRuleSet)
}

fn convert_rule(dto: RuleDto, index: usize) -> Result<Rule, LoadError> {
    let ctx = match &dto.id {
        Some(id) => format!("rules[{index}] `{id}`"),
        None => format!("rules[{index}]"),
    };

    let raw_id = dto
        .id
        .as_deref()
        .ok_or_else(|| LoadError::malformed(&ctx, "missing required field `id`"))?;
    let id = RuleId::new(raw_id).map_err(|e| LoadError::field(&ctx, "id", &e))?;

    let pattern = match (dto.path.as_deref(), dto.path_regex.as_deref()) {
        (Some(glob), None) => {
            PathPattern::Glob(GlobPattern::new(glob).map_err(|e| LoadError::field(&ctx, "path", &e))?)
        }
        (None, Some(regex)) => PathPattern::Regex(
            RegexPattern::new(regex).map_err(|e| LoadError::field(&ctx, "path-regex", &e))?,
        ),
        (Some(_), Some(_)) => {
            return Err(LoadError::malformed(
                &ctx,
                "exactly one of `path` or `path-regex` must be set, found both",
            ))
        }
        (None, None) => {
            return Err(LoadError::malformed(
                &ctx,
                "missing required field `path` (or `path-regex`)",
            ))
        }
    };

    let kind = parse_kind(dto.kind.as_deref(), &ctx)?;
    let requirement = parse_requirement(dto.requirement.as_deref(), &ctx)?;

    let mut rule = Rule::new(id, pattern, kind, requirement);

    if let Some(naming) = dto.naming.as_deref() {
        let naming = RegexPattern::new(naming).map_err(|e| LoadError::field(&ctx, "naming", &e))?;
        rule = rule.with_naming(naming);
    }

    if !dto.must_reference.is_empty() {
        let targets = dto
            .must_reference
            .iter()
            .enumerate()
            .map(|(i, target)| {
                RuleId::new(target)
                    .map_err(|e| LoadError::field(&ctx, &format!("must-reference[{i}]"), &e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        rule = rule.with_must_reference(targets);
    }

    if let Some(canonical) = dto.canonical {
        if canonical.is_empty() {
            return Err(LoadError::malformed(
                format!("{ctx}.canonical"),
                "canonical path must not be empty",
            ));
        }
        rule = rule.with_canonical(canonical);
    }
    if let Some(message) = dto.message {
        rule = rule.with_message(message);
    }
    if let Some(doc) = dto.doc {
        rule = rule.with_doc_ref(doc);
    }

    Ok(rule)
}

fn parse_kind(value: Option<&str>, context: &str) -> Result<EntryKind, LoadError> {
    match value {
        None | Some("file") => Ok(EntryKind::File),
        Some("directory") => Ok(EntryKind::Directory),
        Some(other) => Err(LoadError::malformed(
            format!("{context}.kind"),
            format!("unknown kind `{other}`, expected: file, directory"),
        )),
    }
}

fn parse_requirement(value: Option<&str>, context: &str) -> Result<Requirement, LoadError> {
    match value {
        Some("required") => Ok(Requirement::Required),
        Some("optional") => Ok(Requirement::Optional),
        Some("forbidden") => Ok(Requirement::Forbidden),
        Some(other) => Err(LoadError::malformed(
            format!("{context}.requirement"),
            format!("unknown requirement `{other}`, expected: required, optional, forbidden"),
        )),
        None => Err(LoadError::malformed(
            context,
            "missing required field `requirement`",
        )),
    }
}
