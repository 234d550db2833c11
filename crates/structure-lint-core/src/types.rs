//! Core types for verdicts and reports.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::scanner::ScanNote;

/// Kind of filesystem artifact a rule targets or a scan observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A regular file (or a symlink resolving to one).
    File,
    /// A directory.
    Directory,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

/// Outcome of evaluating a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// The rule is satisfied.
    Pass,
    /// The rule is satisfied with a heuristic or naming problem.
    Warn,
    /// The rule is violated.
    Fail,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Warn => write!(f, "WARN"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// Overall classification of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Every verdict passed.
    #[serde(rename = "PASSED")]
    Passed,
    /// At least one warning, no failures.
    #[serde(rename = "PASSED-WITH-WARNINGS")]
    PassedWithWarnings,
    /// At least one failure.
    #[serde(rename = "FAILED")]
    Failed,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "PASSED"),
            Self::PassedWithWarnings => write!(f, "PASSED-WITH-WARNINGS"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Threshold at which a report counts as a failure for exit codes and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailOn {
    /// Only FAIL verdicts fail the run.
    #[default]
    Fail,
    /// WARN verdicts fail the run as well.
    Warn,
}

impl std::str::FromStr for FailOn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" => Ok(Self::Fail),
            "warn" => Ok(Self::Warn),
            other => Err(format!(
                "unknown fail_on value `{other}`, expected: fail, warn"
            )),
        }
    }
}

/// The result of evaluating one rule against the scanned tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Id of the evaluated rule.
    pub rule_id: String,
    /// Pass, warn or fail.
    pub status: Status,
    /// Human-readable reason.
    pub message: String,
    /// Matched or offending paths, sorted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    /// Reference to the guardrails document behind the rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl Verdict {
    /// Creates a new verdict.
    #[must_use]
    pub fn new(rule_id: impl Into<String>, status: Status, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            status,
            message: message.into(),
            paths: Vec::new(),
            doc: None,
        }
    }

    /// Creates a passing verdict.
    #[must_use]
    pub fn pass(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule_id, Status::Pass, message)
    }

    /// Creates a warning verdict.
    #[must_use]
    pub fn warn(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule_id, Status::Warn, message)
    }

    /// Creates a failing verdict.
    #[must_use]
    pub fn fail(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule_id, Status::Fail, message)
    }

    /// Attaches the matched or offending paths.
    #[must_use]
    pub fn with_paths(mut self, mut paths: Vec<String>) -> Self {
        paths.sort();
        paths.dedup();
        self.paths = paths;
        self
    }

    /// Adds a guardrails document reference.
    #[must_use]
    pub fn with_doc(mut self, doc: Option<&str>) -> Self {
        self.doc = doc.map(str::to_string);
        self
    }

    /// Formats the verdict as a multi-line text block.
    #[must_use]
    pub fn format(&self) -> String {
        let mut output = format!("{} {}\n", self.status, self.rule_id);
        let _ = writeln!(output, "  {}", self.message);
        for path in &self.paths {
            let _ = writeln!(output, "  - {path}");
        }
        if let Some(doc) = &self.doc {
            let _ = writeln!(output, "  = see: {doc}");
        }
        output
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.status, self.rule_id, self.message)?;
        if let Some(doc) = &self.doc {
            write!(f, " (see: {doc})")?;
        }
        Ok(())
    }
}

/// Verdict counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of evaluated rules.
    pub total: usize,
    /// Number of PASS verdicts.
    pub passed: usize,
    /// Number of WARN verdicts.
    pub warned: usize,
    /// Number of FAIL verdicts.
    pub failed: usize,
}

impl Summary {
    fn from_verdicts(verdicts: &[Verdict]) -> Self {
        let count = |status: Status| verdicts.iter().filter(|v| v.status == status).count();
        Self {
            total: verdicts.len(),
            passed: count(Status::Pass),
            warned: count(Status::Warn),
            failed: count(Status::Fail),
        }
    }

    /// Classifies the counts into an overall outcome.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        if self.failed > 0 {
            Outcome::Failed
        } else if self.warned > 0 {
            Outcome::PassedWithWarnings
        } else {
            Outcome::Passed
        }
    }
}

/// Aggregated result of one lint run.
///
/// Verdicts are sorted by rule id and notes by path, so two runs over the
/// same rules and tree serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Overall classification.
    pub outcome: Outcome,
    /// Verdict counts.
    pub summary: Summary,
    /// Number of entries produced by the scanner.
    pub entries_scanned: usize,
    /// One verdict per rule, sorted by rule id.
    pub verdicts: Vec<Verdict>,
    /// Entries skipped during the scan.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<ScanNote>,
}

impl Report {
    /// Builds a report, sorting verdicts and computing the summary.
    #[must_use]
    pub fn new(mut verdicts: Vec<Verdict>, entries_scanned: usize, mut notes: Vec<ScanNote>) -> Self {
        verdicts.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));
        notes.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.message.cmp(&b.message)));
        let summary = Summary::from_verdicts(&verdicts);
        Self {
            outcome: summary.outcome(),
            summary,
            entries_scanned,
            verdicts,
            notes,
        }
    }

    /// Returns the verdict for a rule id.
    #[must_use]
    pub fn verdict(&self, rule_id: &str) -> Option<&Verdict> {
        self.verdicts.iter().find(|v| v.rule_id == rule_id)
    }

    /// Returns verdicts with the given status.
    #[must_use]
    pub fn by_status(&self, status: Status) -> Vec<&Verdict> {
        self.verdicts.iter().filter(|v| v.status == status).collect()
    }

    /// Returns true if the outcome fails the given threshold.
    #[must_use]
    pub fn fails(&self, fail_on: FailOn) -> bool {
        match fail_on {
            FailOn::Fail => self.outcome == Outcome::Failed,
            FailOn::Warn => self.outcome != Outcome::Passed,
        }
    }

    /// Process exit code for this report under the given threshold.
    #[must_use]
    pub fn exit_code(&self, fail_on: FailOn) -> i32 {
        i32::from(self.fails(fail_on))
    }

    /// Returns the one-line summary.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "{}: {} rule(s), {} passed, {} warning(s), {} failed ({} entries scanned)",
            self.outcome,
            self.summary.total,
            self.summary.passed,
            self.summary.warned,
            self.summary.failed,
            self.entries_scanned,
        )
    }

    /// Formats the full report as plain text.
    #[must_use]
    pub fn format(&self) -> String {
        let mut report = String::new();
        for verdict in &self.verdicts {
            let _ = writeln!(report, "{}", verdict.format());
        }
        for note in &self.notes {
            let _ = writeln!(report, "note: {}: {}", note.path, note.message);
        }
        if !self.notes.is_empty() {
            report.push('\n');
        }
        let _ = writeln!(report, "{}", self.summary_line());
        report
    }

    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
