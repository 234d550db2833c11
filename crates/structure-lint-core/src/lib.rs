//! # structure-lint-core
//!
//! Core engine for linting the layout of a repository against declarative
//! structure rules.
//!
//! This crate provides:
//!
//! - [`rules`] for parsing and validating `[[rules]]` sources into a [`RuleSet`]
//! - [`Scanner`] for a lazy, restartable walk of the repository tree
//! - [`Validator`] for evaluating each rule against a scan snapshot
//! - [`Report`] for the sorted verdicts and the overall [`Outcome`]
//! - [`Linter`] for orchestrating all of the above
//!
//! ## Example
//!
//! ```ignore
//! use structure_lint_core::{FailOn, Linter};
//!
//! let linter = Linter::builder()
//!     .root(".")
//!     .rules_file("structure-lint.toml")
//!     .build()?;
//!
//! let report = linter.run()?;
//! print!("{}", report.format());
//! std::process::exit(report.exit_code(FailOn::Fail));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod linter;
mod scanner;
mod types;
mod validator;

/// Rule model, DTO layer and loader.
pub mod rules;

pub use config::{Config, ConfigError, ScannerConfig};
pub use linter::{LintError, Linter, LinterBuilder};
pub use rules::{
    load_rule_set_from_file, load_rule_set_from_str, LoadError, ModelError, PathPattern,
    Requirement, Rule, RuleFormat, RuleId, RuleSet,
};
pub use scanner::{ScanEntry, ScanError, ScanEvent, ScanIter, ScanNote, ScanSnapshot, Scanner};
pub use types::{EntryKind, FailOn, Outcome, Report, Status, Summary, Verdict};
pub use validator::{ContentSource, FsContent, Validator};
