//! List rules command implementation.

use anyhow::{bail, Context, Result};
use structure_lint_core::load_rule_set_from_file;

use crate::config_resolver::ConfigSource;

/// Runs the list-rules command.
pub fn run(source: &ConfigSource) -> Result<()> {
    let Some(path) = source.path() else {
        bail!("no rule source found; pass --config or run `structure-lint init`");
    };
    let rules = load_rule_set_from_file(path)
        .with_context(|| format!("Failed to load rules: {}", path.display()))?;

    println!("Rules from {}:\n", path.display());
    println!(
        "{:<24} {:<10} {:<10} {:<6} Pattern",
        "Id", "Required", "Kind", "Syntax"
    );
    println!("{}", "-".repeat(80));

    for rule in &rules {
        println!(
            "{:<24} {:<10} {:<10} {:<6} {}",
            rule.id().as_str(),
            rule.requirement().to_string(),
            rule.kind().to_string(),
            rule.pattern().syntax(),
            rule.pattern()
        );
        if let Some(naming) = rule.naming() {
            println!("{:<24} naming: {}", "", naming.as_str());
        }
        if !rule.must_reference().is_empty() {
            let targets: Vec<&str> = rule.must_reference().iter().map(|id| id.as_str()).collect();
            println!("{:<24} must reference: {}", "", targets.join(", "));
        }
    }

    println!("\n{} rule(s)", rules.len());
    Ok(())
}
