//! Check command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::ExitCode;
use structure_lint_core::{load_rule_set_from_str, Config, FailOn, Linter, RuleFormat};

use crate::config_resolver::{ConfigSource, PROJECT_CONFIG_NAMES};
use crate::OutputFormat;

/// Where the check command takes its rules from.
#[derive(Debug)]
pub enum RuleSource {
    /// Rule text passed with `--inline`.
    Inline(String),
    /// A rule file found by the resolver.
    Resolved(ConfigSource),
}

/// Runs the check command.
///
/// Returns exit code 1 when the report fails the threshold. Errors are fatal
/// and mapped to exit code 2 by the caller.
pub fn run(
    path: &Path,
    format: OutputFormat,
    exclude: Vec<String>,
    source: &RuleSource,
    fail_on: Option<FailOn>,
) -> Result<ExitCode> {
    let mut builder = Linter::builder().root(path);

    builder = match source {
        RuleSource::Inline(text) => {
            let rules = load_rule_set_from_str(text, RuleFormat::Toml)?;
            let config = Config::parse(text)?;
            builder.rules(rules).config(config)
        }
        RuleSource::Resolved(ConfigSource::Missing) => bail!(
            "no rule source found in {} (looked for {}); pass --config or --inline, or run `structure-lint init`",
            path.display(),
            PROJECT_CONFIG_NAMES.join(", ")
        ),
        RuleSource::Resolved(resolved) => {
            let p = resolved.path().context("resolved rule source has no path")?;
            if resolved.is_global() {
                tracing::info!("Using global rules: {}", p.display());
            }
            builder.rules_file(p)
        }
    };

    for pattern in exclude {
        builder = builder.exclude(pattern);
    }

    let linter = builder.build()?;
    let threshold = fail_on.unwrap_or(linter.config().fail_on);
    let report = linter.run()?;

    super::output::print(&report, format)?;

    if report.fails(threshold) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
