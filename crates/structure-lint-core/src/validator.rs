//! Matches rules against a scanned tree and produces verdicts.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use crate::rules::{Requirement, Rule, RuleSet};
use crate::scanner::ScanSnapshot;
use crate::types::{Report, Verdict};

/// Source of file text for cross-reference checks.
pub trait ContentSource {
    /// Returns the text of a file by its root-relative path, if readable.
    fn read_text(&self, path: &str) -> Option<String>;
}

/// Reads file content from disk below a root directory.
#[derive(Debug, Clone)]
pub struct FsContent {
    root: PathBuf,
}

impl FsContent {
    /// Creates a content source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentSource for FsContent {
    fn read_text(&self, path: &str) -> Option<String> {
        match std::fs::read(self.root.join(path)) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                debug!("Cannot read {path} for cross-link check: {e}");
                None
            }
        }
    }
}

impl ContentSource for HashMap<String, String> {
    fn read_text(&self, path: &str) -> Option<String> {
        self.get(path).cloned()
    }
}

/// Evaluates every rule of a [`RuleSet`] against a [`ScanSnapshot`].
///
/// Read-only over both inputs; one verdict per rule.
pub struct Validator<'a> {
    rules: &'a RuleSet,
}

impl<'a> Validator<'a> {
    /// Creates a validator over a rule set.
    #[must_use]
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Evaluates all rules and aggregates the verdicts into a report.
    #[must_use]
    pub fn validate(&self, snapshot: &ScanSnapshot, content: &dyn ContentSource) -> Report {
        let verdicts = self
            .rules
            .iter()
            .map(|rule| self.evaluate(rule, snapshot, content))
            .collect();
        Report::new(verdicts, snapshot.len(), snapshot.notes().to_vec())
    }

    /// Evaluates one rule.
    #[must_use]
    pub fn evaluate(&self, rule: &Rule, snapshot: &ScanSnapshot, content: &dyn ContentSource) -> Verdict {
        let matches: Vec<String> = snapshot
            .entries()
            .filter(|e| e.exists && e.kind == rule.kind() && rule.pattern().matches(&e.path))
            .map(|e| e.path.clone())
            .collect();

        debug!(
            "Rule {} ({}) matched {} entr(ies)",
            rule.id(),
            rule.requirement(),
            matches.len()
        );

        let verdict = match rule.requirement() {
            Requirement::Required if matches.is_empty() => Verdict::fail(
                rule.id().as_str(),
                with_custom(
                    format!(
                        "missing required artifact: no {} matches `{}`",
                        rule.kind(),
                        rule.pattern()
                    ),
                    rule,
                ),
            ),
            Requirement::Required => {
                let findings = self.findings(rule, &matches, content);
                if findings.is_clean() {
                    Verdict::pass(
                        rule.id().as_str(),
                        format!("required artifact present ({} match(es))", matches.len()),
                    )
                    .with_paths(matches)
                } else {
                    Verdict::warn(rule.id().as_str(), with_custom(findings.describe(), rule))
                        .with_paths(findings.flagged)
                }
            }
            Requirement::Optional => {
                let findings = self.findings(rule, &matches, content);
                let mut message = if matches.is_empty() {
                    "optional artifact absent".to_string()
                } else {
                    format!("optional artifact present ({} match(es))", matches.len())
                };
                if !findings.is_clean() {
                    message = format!("{message}; {}", findings.describe());
                }
                Verdict::pass(rule.id().as_str(), message).with_paths(matches)
            }
            Requirement::Forbidden if matches.is_empty() => {
                Verdict::pass(rule.id().as_str(), "no forbidden artifact present")
            }
            Requirement::Forbidden => Verdict::fail(
                rule.id().as_str(),
                with_custom(
                    format!(
                        "forbidden artifact present: {} {} match `{}`",
                        matches.len(),
                        rule.kind(),
                        rule.pattern()
                    ),
                    rule,
                ),
            )
            .with_paths(matches),
        };

        verdict.with_doc(rule.doc_ref())
    }

    /// Collects naming and cross-link problems among the matches.
    fn findings(&self, rule: &Rule, matches: &[String], content: &dyn ContentSource) -> Findings {
        let mut findings = Findings::default();

        if let Some(naming) = rule.naming() {
            let misnamed: Vec<&String> = matches.iter().filter(|p| !rule.name_conforms(p)).collect();
            if !misnamed.is_empty() {
                findings.issues.push(format!(
                    "naming convention `{}` violated by {} match(es)",
                    naming.as_str(),
                    misnamed.len()
                ));
                findings.flagged.extend(misnamed.into_iter().cloned());
            }
        }

        if rule.must_reference().is_empty() {
            return findings;
        }

        let targets: Vec<String> = rule
            .must_reference()
            .iter()
            .filter_map(|id| self.rules.get(id).and_then(Rule::canonical_path))
            .collect();

        let mut missing: Vec<String> = Vec::new();
        for path in matches {
            let text = content.read_text(path).unwrap_or_default();
            let absent: Vec<&String> = targets.iter().filter(|t| !text.contains(t.as_str())).collect();
            if absent.is_empty() {
                continue;
            }
            for target in absent {
                let link = format!("`{target}`");
                if !missing.contains(&link) {
                    missing.push(link);
                }
            }
            findings.flagged.push(path.clone());
        }
        if !missing.is_empty() {
            findings
                .issues
                .push(format!("missing cross-link to {}", missing.join(", ")));
        }

        findings
    }
}

#[derive(Debug, Default)]
struct Findings {
    issues: Vec<String>,
    flagged: Vec<String>,
}

impl Findings {
    fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn describe(&self) -> String {
        self.issues.join("; ")
    }
}

fn with_custom(message: String, rule: &Rule) -> String {
    match rule.message() {
        Some(extra) => format!("{message}. {extra}"),
        None => message,
    }
}
