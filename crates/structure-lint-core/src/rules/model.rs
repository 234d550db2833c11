//! Pure domain model for structure rules.
//!
//! This module contains no serde and no I/O dependencies.
//! All invariants are enforced at construction time via validated newtypes
//! and the [`RuleSet`] aggregate root.

use crate::types::EntryKind;
use std::collections::HashMap;
use std::fmt;

// ────────────────────────────────────────────
// Newtypes with validation
// ────────────────────────────────────────────

/// A validated rule id (non-empty, `[a-z0-9-]` only).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(String);

impl RuleId {
    /// Creates a new rule id.
    ///
    /// # Errors
    ///
    /// Returns error if the id is empty or contains invalid characters.
    pub fn new(id: &str) -> Result<Self, ModelError> {
        if id.is_empty() {
            return Err(ModelError::EmptyRuleId);
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ModelError::InvalidRuleId { id: id.to_string() });
        }
        Ok(Self(id.to_string()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const GLOB_META: &[char] = &['*', '?', '['];

/// A validated glob pattern for relative path matching.
///
/// The glob is compiled once at construction. `*` does not cross `/`;
/// use `**` for any depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    raw: String,
    compiled: glob::Pattern,
}

impl GlobPattern {
    const OPTIONS: glob::MatchOptions = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    /// Creates a new glob pattern.
    ///
    /// # Errors
    ///
    /// Returns error if the pattern is empty or has invalid glob syntax.
    pub fn new(pattern: &str) -> Result<Self, ModelError> {
        if pattern.is_empty() {
            return Err(ModelError::EmptyPattern);
        }
        let compiled = glob::Pattern::new(pattern).map_err(|e| ModelError::InvalidGlob {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            compiled,
        })
    }

    /// Tests whether a `/`-separated relative path matches this pattern.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        if self.compiled.matches_with(path, Self::OPTIONS) {
            return true;
        }
        // `dir/**` also matches everything below `dir/`.
        if let Some(prefix) = self.raw.strip_suffix("/**") {
            let normalized = prefix.trim_end_matches('/');
            if !normalized.contains(GLOB_META)
                && path.starts_with(normalized)
                && path.as_bytes().get(normalized.len()) == Some(&b'/')
            {
                return true;
            }
        }
        false
    }

    /// Like [`GlobPattern::matches`], but `dir/**` also matches `dir` itself.
    ///
    /// Used for excludes, where pruning a directory's contents should prune
    /// the directory too.
    #[must_use]
    pub fn matches_subtree(&self, path: &str) -> bool {
        self.matches(path)
            || self
                .raw
                .strip_suffix("/**")
                .map(|prefix| prefix.trim_end_matches('/'))
                .is_some_and(|dir| !dir.contains(GLOB_META) && path == dir)
    }

    /// Literal path this glob stands for, or its literal directory prefix.
    ///
    /// `docs/ADR/README.md` → `docs/ADR/README.md`, `docs/ADR/*.md` → `docs/ADR/`,
    /// `*.md` → `None`.
    #[must_use]
    pub fn literal_prefix(&self) -> Option<String> {
        match self.raw.find(GLOB_META) {
            None => Some(self.raw.clone()),
            Some(idx) => {
                let head = &self.raw[..idx];
                head.rfind('/').map(|slash| head[..=slash].to_string())
            }
        }
    }

    /// Returns the pattern as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// A compiled regular expression over relative paths or file names.
#[derive(Debug, Clone)]
pub struct RegexPattern(regex::Regex);

impl RegexPattern {
    /// Compiles a regular expression.
    ///
    /// # Errors
    ///
    /// Returns error if the expression is empty or fails to compile.
    pub fn new(pattern: &str) -> Result<Self, ModelError> {
        if pattern.is_empty() {
            return Err(ModelError::EmptyPattern);
        }
        regex::Regex::new(pattern)
            .map(Self)
            .map_err(|e| ModelError::InvalidRegex {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// Tests whether the text matches anywhere (anchor explicitly with `^`/`$`).
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }

    /// Returns the source expression.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for RegexPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for RegexPattern {}

// ────────────────────────────────────────────
// Domain entities
// ────────────────────────────────────────────

/// How a rule selects paths: a glob or a regular expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Glob over the relative path.
    Glob(GlobPattern),
    /// Regular expression over the relative path.
    Regex(RegexPattern),
}

impl PathPattern {
    /// Tests whether a relative path matches.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Glob(g) => g.matches(path),
            Self::Regex(r) => r.is_match(path),
        }
    }

    /// Returns the source text of the pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Glob(g) => g.as_str(),
            Self::Regex(r) => r.as_str(),
        }
    }

    /// Returns `"glob"` or `"regex"`.
    #[must_use]
    pub fn syntax(&self) -> &'static str {
        match self {
            Self::Glob(_) => "glob",
            Self::Regex(_) => "regex",
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Glob(g) => write!(f, "{}", g.as_str()),
            Self::Regex(r) => write!(f, "/{}/", r.as_str()),
        }
    }
}

/// Whether matching artifacts must, may, or must not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// At least one match must exist.
    Required,
    /// Matches are informational.
    Optional,
    /// No match may exist.
    Forbidden,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::Optional => write!(f, "optional"),
            Self::Forbidden => write!(f, "forbidden"),
        }
    }
}

/// A single structure rule.
///
/// Built once by the loader; the `with_*` methods consume the rule, so a
/// rule inside a [`RuleSet`] is never mutated.
#[derive(Debug, Clone)]
pub struct Rule {
    id: RuleId,
    pattern: PathPattern,
    kind: EntryKind,
    requirement: Requirement,
    naming: Option<RegexPattern>,
    must_reference: Vec<RuleId>,
    canonical: Option<String>,
    message: Option<String>,
    doc_ref: Option<String>,
}

impl Rule {
    /// Creates a rule with no naming convention or cross-references.
    #[must_use]
    pub fn new(id: RuleId, pattern: PathPattern, kind: EntryKind, requirement: Requirement) -> Self {
        Self {
            id,
            pattern,
            kind,
            requirement,
            naming: None,
            must_reference: Vec::new(),
            canonical: None,
            message: None,
            doc_ref: None,
        }
    }

    /// Sets the file-name convention.
    #[must_use]
    pub fn with_naming(mut self, naming: RegexPattern) -> Self {
        self.naming = Some(naming);
        self
    }

    /// Sets the rules whose artifacts this one must link to.
    ///
    /// Order is preserved; repeated ids are dropped.
    #[must_use]
    pub fn with_must_reference(mut self, ids: Vec<RuleId>) -> Self {
        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        self.must_reference = unique;
        self
    }

    /// Overrides the canonical path other rules search for.
    #[must_use]
    pub fn with_canonical(mut self, canonical: impl Into<String>) -> Self {
        self.canonical = Some(canonical.into());
        self
    }

    /// Sets a custom message appended to non-passing verdicts.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the guardrails document reference.
    #[must_use]
    pub fn with_doc_ref(mut self, doc: impl Into<String>) -> Self {
        self.doc_ref = Some(doc.into());
        self
    }

    /// Returns the rule id.
    #[must_use]
    pub fn id(&self) -> &RuleId {
        &self.id
    }

    /// Returns the path pattern.
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Returns the targeted entry kind.
    #[must_use]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Returns the requirement.
    #[must_use]
    pub fn requirement(&self) -> Requirement {
        self.requirement
    }

    /// Returns the naming convention.
    #[must_use]
    pub fn naming(&self) -> Option<&RegexPattern> {
        self.naming.as_ref()
    }

    /// Returns the referenced rule ids, in declaration order.
    #[must_use]
    pub fn must_reference(&self) -> &[RuleId] {
        &self.must_reference
    }

    /// Returns the custom message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the document reference.
    #[must_use]
    pub fn doc_ref(&self) -> Option<&str> {
        self.doc_ref.as_deref()
    }

    /// The string other artifacts must contain to link to this rule's artifact.
    ///
    /// An explicit `canonical` wins; otherwise a glob's literal prefix is used.
    /// Regex rules have no implicit canonical path.
    #[must_use]
    pub fn canonical_path(&self) -> Option<String> {
        if let Some(canonical) = &self.canonical {
            return Some(canonical.clone());
        }
        match &self.pattern {
            PathPattern::Glob(g) => g.literal_prefix(),
            PathPattern::Regex(_) => None,
        }
    }

    /// Tests whether the final path component satisfies the naming convention.
    ///
    /// Always true when no convention is set.
    #[must_use]
    pub fn name_conforms(&self, path: &str) -> bool {
        self.naming.as_ref().map_or(true, |naming| {
            let name = path.rsplit('/').next().unwrap_or(path);
            naming.is_match(name)
        })
    }
}

// ────────────────────────────────────────────
// Aggregate root
// ────────────────────────────────────────────

/// A validated, ordered set of rules.
///
/// Uniqueness, cross-references, and requirement conflicts are verified at
/// construction time. This is the aggregate root; all lookups go through here.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    index: HashMap<RuleId, usize>,
}

impl RuleSet {
    /// Creates a rule set with full validation.
    ///
    /// # Errors
    ///
    /// Returns every invariant violation found.
    pub fn new(rules: Vec<Rule>) -> Result<Self, Vec<ModelError>> {
        let mut errors = Vec::new();
        let mut index = HashMap::with_capacity(rules.len());

        for (i, rule) in rules.iter().enumerate() {
            if index.insert(rule.id.clone(), i).is_some() {
                errors.push(ModelError::DuplicateRuleId {
                    id: rule.id.clone(),
                });
            }
        }

        for rule in &rules {
            errors.extend(validate_shape(rule));

            for target in &rule.must_reference {
                if *target == rule.id {
                    errors.push(ModelError::SelfReference {
                        id: rule.id.clone(),
                    });
                    continue;
                }
                match index.get(target).map(|&i| &rules[i]) {
                    None => errors.push(ModelError::UnknownReference {
                        rule: rule.id.clone(),
                        target: target.clone(),
                    }),
                    Some(referenced) if referenced.canonical_path().is_none() => {
                        errors.push(ModelError::NoCanonicalPath {
                            rule: rule.id.clone(),
                            target: target.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        for required in rules
            .iter()
            .filter(|r| r.requirement == Requirement::Required)
        {
            for forbidden in rules.iter().filter(|r| {
                r.requirement == Requirement::Forbidden && r.pattern == required.pattern
            }) {
                errors.push(ModelError::ConflictingRequirement {
                    pattern: required.pattern.to_string(),
                    required: required.id.clone(),
                    forbidden: forbidden.id.clone(),
                });
            }
        }

        if errors.is_empty() {
            Ok(Self { rules, index })
        } else {
            Err(errors)
        }
    }

    /// Creates an empty rule set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if no rules are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns all rules in load order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Looks up a rule by id.
    #[must_use]
    pub fn get(&self, id: &RuleId) -> Option<&Rule> {
        self.index.get(id).map(|&i| &self.rules[i])
    }

    /// Iterates over rules in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

fn validate_shape(rule: &Rule) -> Vec<ModelError> {
    let mut errors = Vec::new();
    if rule.requirement == Requirement::Forbidden {
        if rule.naming.is_some() {
            errors.push(ModelError::UnusedField {
                id: rule.id.clone(),
                field: "naming",
                reason: "forbidden rules never pass a matched artifact",
            });
        }
        if !rule.must_reference.is_empty() {
            errors.push(ModelError::UnusedField {
                id: rule.id.clone(),
                field: "must-reference",
                reason: "forbidden rules never pass a matched artifact",
            });
        }
    }
    if rule.kind == EntryKind::Directory && !rule.must_reference.is_empty() {
        errors.push(ModelError::UnusedField {
            id: rule.id.clone(),
            field: "must-reference",
            reason: "directories have no content to search",
        });
    }
    errors
}

// ────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────

/// Errors in domain model construction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    /// Rule id is empty.
    #[error("rule id must not be empty")]
    EmptyRuleId,

    /// Rule id contains invalid characters.
    #[error(
        "invalid rule id `{id}`: allowed characters are lowercase ASCII letters, digits and `-` (e.g. `adr-index`)"
    )]
    InvalidRuleId {
        /// The invalid id.
        id: String,
    },

    /// Pattern is empty.
    #[error("pattern must not be empty")]
    EmptyPattern,

    /// Glob pattern has invalid syntax.
    #[error("invalid glob pattern `{pattern}`: {reason}")]
    InvalidGlob {
        /// The invalid pattern.
        pattern: String,
        /// Why it's invalid.
        reason: String,
    },

    /// Regular expression failed to compile.
    #[error("invalid regex `{pattern}`: {reason}")]
    InvalidRegex {
        /// The invalid expression.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// Two rules share an id.
    #[error("duplicate rule id `{id}`")]
    DuplicateRuleId {
        /// The repeated id.
        id: RuleId,
    },

    /// A rule references itself.
    #[error("rule `{id}` references itself")]
    SelfReference {
        /// The offending rule.
        id: RuleId,
    },

    /// A rule references an undefined rule.
    #[error("rule `{rule}`: unknown must-reference target `{target}`")]
    UnknownReference {
        /// The referencing rule.
        rule: RuleId,
        /// The undefined target.
        target: RuleId,
    },

    /// A referenced rule has no canonical path to search for.
    #[error("rule `{rule}`: target `{target}` has no canonical path, set `canonical` on it")]
    NoCanonicalPath {
        /// The referencing rule.
        rule: RuleId,
        /// The target without a canonical path.
        target: RuleId,
    },

    /// A required and a forbidden rule share a pattern.
    #[error("pattern `{pattern}` is both required by `{required}` and forbidden by `{forbidden}`")]
    ConflictingRequirement {
        /// The shared pattern.
        pattern: String,
        /// The required rule.
        required: RuleId,
        /// The forbidden rule.
        forbidden: RuleId,
    },

    /// A field has no effect for the rule's kind or requirement.
    #[error("rule `{id}`: `{field}` is not allowed here: {reason}")]
    UnusedField {
        /// The offending rule.
        id: RuleId,
        /// The field name.
        field: &'static str,
        /// Why it's rejected.
        reason: &'static str,
    },
}

// ────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────
