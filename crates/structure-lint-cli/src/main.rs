//! structure-lint CLI tool.
//!
//! Usage:
//! ```bash
//! structure-lint check [OPTIONS] [PATH]
//! structure-lint list-rules [PATH]
//! structure-lint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use structure_lint_core::FailOn;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Exit status for fatal loader, scanner and configuration errors.
const FATAL_EXIT: u8 = 2;

/// Repository structure linter for documentation and process guardrails
#[derive(Parser)]
#[command(name = "structure-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the rule source (TOML, or JSON by extension)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint a repository tree against the rules
    Check {
        /// Repository root (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Inline TOML rule source, bypassing config file resolution
        #[arg(long, conflicts_with = "config")]
        inline: Option<String>,

        /// Threshold at which the run fails (overrides the config file)
        #[arg(long)]
        fail_on: Option<FailOn>,
    },

    /// List the rules of the resolved rule source
    ListRules {
        /// Repository root used for rule source lookup
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Initialize a starter rule file
    Init {
        /// Overwrite existing rule file
        #[arg(long)]
        force: bool,

        /// Write `structure-lint.json` instead of TOML
        #[arg(long)]
        json: bool,
    },
}

/// Output format for lint reports.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-verdict compact format.
    Compact,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            commands::output::print_fatal(&err);
            ExitCode::from(FATAL_EXIT)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Check {
            path,
            format,
            exclude,
            inline,
            fail_on,
        } => {
            let source = match inline {
                Some(text) => commands::check::RuleSource::Inline(text),
                None => commands::check::RuleSource::Resolved(config_resolver::resolve(
                    &path,
                    cli.config.as_deref(),
                )),
            };
            commands::check::run(&path, format, exclude, &source, fail_on)
        }
        Commands::ListRules { path } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            commands::list_rules::run(&source)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force, json } => {
            commands::init::run(force, json)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
