//! Internal runner for `check!()` macro integration.
//!
//! This module is `#[doc(hidden)]` and not part of the public API.
//! It is called by the generated test function from `structure_lint::check!()`.

use std::path::{Path, PathBuf};
use structure_lint_core::{FailOn, Linter, Status};

/// Rule file names to search for, in priority order.
const CONFIG_CANDIDATES: &[&str] = &["structure-lint.toml", ".structure-lint.toml"];

/// Lints the workspace root as part of `cargo test`.
///
/// # Panics
///
/// Panics with the text report if the outcome fails the threshold, or if the
/// rule file is missing or invalid or the root cannot be scanned.
pub fn run_check(config_path: Option<&str>, fail_on: Option<&str>) {
    let root = find_project_root();
    let rules_path = resolve_rules_path(&root, config_path);

    let linter = Linter::builder()
        .root(&root)
        .rules_file(&rules_path)
        .build()
        .unwrap_or_else(|e| {
            panic!(
                "structure-lint: failed to load {}: {e}",
                rules_path.display()
            );
        });

    let threshold = resolve_fail_on(fail_on, linter.config().fail_on);

    let report = linter.run().unwrap_or_else(|e| {
        panic!("structure-lint: lint failed: {e}");
    });

    if report.fails(threshold) {
        let mut offending = report.by_status(Status::Fail);
        if threshold == FailOn::Warn {
            offending.extend(report.by_status(Status::Warn));
        }
        let ids: Vec<&str> = offending.iter().map(|v| v.rule_id.as_str()).collect();
        panic!(
            "structure-lint: {} rule(s) not satisfied: {}\n\n{}",
            ids.len(),
            ids.join(", "),
            report.format()
        );
    }
}

/// Picks the explicit rule file, else the first candidate in the root.
fn resolve_rules_path(root: &Path, explicit_path: Option<&str>) -> PathBuf {
    if let Some(path) = explicit_path {
        return if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            root.join(path)
        };
    }

    CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
        .unwrap_or_else(|| {
            panic!(
                "structure-lint: no rule file in {} (looked for {})",
                root.display(),
                CONFIG_CANDIDATES.join(", ")
            );
        })
}

/// True if `dir/Cargo.toml` parses as TOML with a `[workspace]` table.
fn is_workspace_root(dir: &Path) -> bool {
    std::fs::read_to_string(dir.join("Cargo.toml"))
        .ok()
        .and_then(|content| content.parse::<toml::Table>().ok())
        .is_some_and(|table| table.contains_key("workspace"))
}

/// The nearest workspace root above `CARGO_MANIFEST_DIR`, else the manifest
/// dir itself, else the current directory.
fn find_project_root() -> PathBuf {
    let Some(manifest_dir) = std::env::var_os("CARGO_MANIFEST_DIR").map(PathBuf::from) else {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    };
    manifest_dir
        .ancestors()
        .find(|dir| is_workspace_root(dir))
        .map_or_else(|| manifest_dir.clone(), Path::to_path_buf)
}

/// Macro argument beats the config file.
fn resolve_fail_on(macro_arg: Option<&str>, configured: FailOn) -> FailOn {
    match macro_arg {
        None => configured,
        Some(name) => name
            .parse()
            .unwrap_or_else(|e| panic!("structure-lint: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // ── Workspace detection ──

    #[test]
    fn workspace_table_detected() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("Cargo.toml"),
            "[workspace]\nmembers = [\"crates/*\"]\n",
        )
        .unwrap();
        assert!(is_workspace_root(tmp.path()));
    }

    #[test]
    fn commented_workspace_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("Cargo.toml"),
            "# [workspace]\n[package]\nname = \"x\"\n",
        )
        .unwrap();
        assert!(!is_workspace_root(tmp.path()));
    }

    #[test]
    fn dir_without_manifest_is_not_workspace() {
        let tmp = TempDir::new().unwrap();
        assert!(!is_workspace_root(tmp.path()));
    }

    #[test]
    fn project_root_is_this_workspace() {
        let root = find_project_root();
        assert!(root.join("crates/structure-lint-core").is_dir());
    }

    // ── Rule file lookup ──

    #[test]
    fn explicit_relative_path_joined_to_root() {
        let root = Path::new("/repo");
        assert_eq!(
            resolve_rules_path(root, Some("ci/rules.toml")),
            PathBuf::from("/repo/ci/rules.toml")
        );
    }

    #[test]
    fn explicit_absolute_path_kept() {
        assert_eq!(
            resolve_rules_path(Path::new("/repo"), Some("/etc/rules.json")),
            PathBuf::from("/etc/rules.json")
        );
    }

    #[test]
    fn candidate_found_in_root() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".structure-lint.toml"), "").unwrap();
        assert_eq!(
            resolve_rules_path(tmp.path(), None),
            tmp.path().join(".structure-lint.toml")
        );
    }

    #[test]
    #[should_panic(expected = "no rule file")]
    fn no_candidate_panics() {
        let tmp = TempDir::new().unwrap();
        resolve_rules_path(tmp.path(), None);
    }

    // ── fail_on resolution ──

    #[test]
    fn fail_on_defaults_to_config() {
        assert_eq!(resolve_fail_on(None, FailOn::Warn), FailOn::Warn);
    }

    #[test]
    fn fail_on_macro_arg_overrides_config() {
        assert_eq!(resolve_fail_on(Some("fail"), FailOn::Warn), FailOn::Fail);
        assert_eq!(resolve_fail_on(Some("warn"), FailOn::Fail), FailOn::Warn);
    }

    #[test]
    #[should_panic(expected = "unknown fail_on value")]
    fn fail_on_invalid_panics() {
        resolve_fail_on(Some("error"), FailOn::Fail);
    }

    // ── End to end ──

    #[test]
    #[should_panic(expected = "1 rule(s) not satisfied: adr-index")]
    fn failing_tree_panics_with_report() {
        let tmp = TempDir::new().unwrap();
        let rules = tmp.path().join("rules.toml");
        fs::write(
            &rules,
            "[[rules]]\nid = \"adr-index\"\npath = \"docs/ADR/README.md\"\nrequirement = \"required\"\n",
        )
        .unwrap();

        // The workspace root has no docs/ADR index.
        run_check(rules.to_str(), None);
    }
}
