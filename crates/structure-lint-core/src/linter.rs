//! Linter facade orchestrating scan and validation.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::rules::{load_rule_set_from_file, LoadError, RuleSet};
use crate::scanner::{ScanError, Scanner};
use crate::types::Report;
use crate::validator::{FsContent, Validator};

/// Fatal errors that abort a lint run before any report exists.
#[derive(Debug, Error, Diagnostic)]
pub enum LintError {
    /// Loading the rule set failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),

    /// The tree could not be scanned.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Scan(#[from] ScanError),

    /// Configuration error.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// IO error resolving the root.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builder for configuring a [`Linter`].
#[derive(Default)]
pub struct LinterBuilder {
    root: Option<PathBuf>,
    rules: Option<RuleSet>,
    rules_file: Option<PathBuf>,
    config: Option<Config>,
    exclude_patterns: Vec<String>,
}

impl LinterBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to lint.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the rule set.
    #[must_use]
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Loads rules (and, unless set explicitly, configuration) from a file at build time.
    #[must_use]
    pub fn rules_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules_file = Some(path.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Adds an exclude glob pattern on top of the configured ones.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Builds the linter.
    ///
    /// # Errors
    ///
    /// Returns an error if the rules file cannot be loaded or the current
    /// directory cannot be resolved for a relative root.
    pub fn build(mut self) -> Result<Linter, LintError> {
        if let Some(path) = self.rules_file.take() {
            if self.rules.is_none() {
                self.rules = Some(load_rule_set_from_file(&path)?);
            }
            if self.config.is_none() {
                self.config = Some(Config::from_file(&path)?);
            }
        }

        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut config = self.config.unwrap_or_default();
        config.scanner.exclude.extend(self.exclude_patterns);

        Ok(Linter {
            root,
            rules: self.rules.unwrap_or_default(),
            config,
        })
    }
}

/// Runs one rule set against one repository tree.
///
/// Use [`Linter::builder()`] to construct an instance.
pub struct Linter {
    root: PathBuf,
    rules: RuleSet,
    config: Config,
}

impl Linter {
    /// Creates a new builder for configuring a linter.
    #[must_use]
    pub fn builder() -> LinterBuilder {
        LinterBuilder::new()
    }

    /// Returns the root directory being linted.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the rule set.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Scans the tree and evaluates every rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be scanned. Rule failures are
    /// verdicts in the report, not errors.
    pub fn run(&self) -> Result<Report, LintError> {
        info!(
            "Linting {} with {} rule(s)",
            self.root.display(),
            self.rules.len()
        );

        let scanner = Scanner::new(&self.root, &self.config.scanner)?;
        let snapshot = scanner.scan();
        let content = FsContent::new(scanner.root());
        let report = Validator::new(&self.rules).validate(&snapshot, &content);

        info!("{}", report.summary_line());

        Ok(report)
    }
}
