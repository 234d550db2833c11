//! Report rendering for the terminal.

use anyhow::Result;
use miette::{Diagnostic, GraphicalReportHandler};
use std::error::Error as StdError;
use structure_lint_core::{
    ConfigError, LintError, LoadError, Outcome, Report, ScanError, Status,
};

use crate::OutputFormat;

/// Prints a report in the given format.
pub fn print(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

fn print_text(report: &Report) {
    for verdict in &report.verdicts {
        let status = match verdict.status {
            Status::Pass => "\x1b[32mPASS\x1b[0m",
            Status::Warn => "\x1b[33mWARN\x1b[0m",
            Status::Fail => "\x1b[31mFAIL\x1b[0m",
        };

        println!("{status} {}", verdict.rule_id);
        println!("  {}", verdict.message);
        for path in &verdict.paths {
            println!("  - {path}");
        }
        if let Some(doc) = &verdict.doc {
            println!("  = see: {doc}");
        }
        println!();
    }

    for note in &report.notes {
        println!("\x1b[33mnote\x1b[0m: {}: {}", note.path, note.message);
    }
    if !report.notes.is_empty() {
        println!();
    }

    let summary_color = match report.outcome {
        Outcome::Failed => "\x1b[31m",
        Outcome::PassedWithWarnings => "\x1b[33m",
        Outcome::Passed => "\x1b[32m",
    };
    println!("{summary_color}{}\x1b[0m", report.summary_line());
}

fn print_json(report: &Report) -> Result<()> {
    println!("{}", report.to_json()?);
    Ok(())
}

fn print_compact(report: &Report) {
    for verdict in &report.verdicts {
        println!("{verdict}");
    }
    for note in &report.notes {
        println!("NOTE [{}] {}", note.path, note.message);
    }
    println!("{}", report.outcome);
}

/// Prints a fatal error to stderr, rendering library diagnostics with miette.
pub fn print_fatal(err: &anyhow::Error) {
    let Some(diagnostic) = err.chain().find_map(as_diagnostic) else {
        eprintln!("Error: {err:?}");
        return;
    };

    // Context added by the CLI is printed above the diagnostic.
    if err.chain().next().and_then(as_diagnostic).is_none() {
        eprintln!("Error: {err}");
    }
    let mut rendered = String::new();
    if GraphicalReportHandler::new()
        .render_report(&mut rendered, diagnostic)
        .is_ok()
    {
        eprintln!("{rendered}");
    } else {
        eprintln!("Error: {diagnostic}");
    }
}

fn as_diagnostic<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a dyn Diagnostic> {
    if let Some(e) = err.downcast_ref::<LintError>() {
        return Some(e);
    }
    if let Some(e) = err.downcast_ref::<LoadError>() {
        return Some(e);
    }
    if let Some(e) = err.downcast_ref::<ScanError>() {
        return Some(e);
    }
    err.downcast_ref::<ConfigError>().map(|e| e as &dyn Diagnostic)
}
