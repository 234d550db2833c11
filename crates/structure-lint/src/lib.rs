//! # structure-lint
//!
//! Repository structure linter: checks that a project tree keeps the
//! documents, directories and conventions its guardrails call for.
//!
//! This is the facade crate that re-exports the core engine and provides
//! the `check!()` test harness.
//!
//! ## Quick Start: `cargo test` Integration
//!
//! ```toml
//! [dev-dependencies]
//! structure-lint = "0.1"
//! ```
//!
//! ```rust,ignore
//! // tests/structure.rs
//! structure_lint::check!();
//! ```
//!
//! This lints the workspace root as part of `cargo test`, using the rules in
//! `structure-lint.toml`. Override the file or the threshold:
//!
//! ```rust,ignore
//! structure_lint::check!(config = "guardrails/structure.toml", fail_on = "warn");
//! ```
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use structure_lint::{FailOn, Linter};
//!
//! let report = Linter::builder()
//!     .root(".")
//!     .rules_file("structure-lint.toml")
//!     .build()?
//!     .run()?;
//!
//! assert!(!report.fails(FailOn::Fail), "{}", report.format());
//! ```

#![forbid(unsafe_code)]

pub use structure_lint_core::*;

mod runner;

#[doc(hidden)]
pub mod __internal {
    pub use crate::runner::run_check;
}

/// Generates a `#[test]` that lints the enclosing workspace.
///
/// Accepts an optional `config = "path"` (relative to the workspace root)
/// and an optional `fail_on = "fail" | "warn"` overriding the config file.
#[macro_export]
macro_rules! check {
    (@test $config:expr, $fail_on:expr) => {
        #[test]
        fn structure_lint_check() {
            $crate::__internal::run_check($config, $fail_on);
        }
    };
    () => {
        $crate::check!(@test None, None);
    };
    (config = $config:expr, fail_on = $fail_on:expr $(,)?) => {
        $crate::check!(@test Some($config), Some($fail_on));
    };
    (config = $config:expr $(,)?) => {
        $crate::check!(@test Some($config), None);
    };
    (fail_on = $fail_on:expr $(,)?) => {
        $crate::check!(@test None, Some($fail_on));
    };
}
