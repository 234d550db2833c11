//! Integration test: rule source to report, end-to-end via Linter.
//!
//! Each test lays out a small repository in a temp directory and runs the
//! full TOML → RuleSet → scan → validate → Report pipeline over it.

use std::fs;
use std::path::Path;

use structure_lint_core::{
    load_rule_set_from_str, FailOn, LintError, Linter, LoadError, Outcome, RuleFormat, Status,
};
use tempfile::TempDir;

const GUARDRAILS: &str = r#"
[[rules]]
id = "adr-index"
path = "docs/ADR/README.md"
requirement = "required"
doc = "DOCS_MAP.md#adrs"

[[rules]]
id = "adrs"
path = "docs/ADR/*.md"
requirement = "optional"
naming = '^(README|\d{4}-[a-z0-9-]+)\.md$'

[[rules]]
id = "labels"
path = "labels.json"
requirement = "forbidden"
message = "labels live in .github/labels.yml"

[[rules]]
id = "readme"
path = "README.md"
requirement = "required"
must-reference = ["adr-index"]
"#;

fn touch(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn healthy_repo() -> TempDir {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), "README.md", "See docs/ADR/README.md for decisions.\n");
    touch(tmp.path(), "docs/ADR/README.md", "# ADRs\n");
    touch(tmp.path(), "docs/ADR/0001-use-rust.md", "# Use Rust\n");
    tmp
}

fn lint(root: &Path, rules_toml: &str) -> structure_lint_core::Report {
    let rules = load_rule_set_from_str(rules_toml, RuleFormat::Toml).expect("rules should load");
    Linter::builder()
        .root(root)
        .rules(rules)
        .build()
        .expect("linter should build")
        .run()
        .expect("lint should succeed")
}

// ── Decision table ──

#[test]
fn healthy_tree_passes() {
    let repo = healthy_repo();
    let report = lint(repo.path(), GUARDRAILS);

    assert_eq!(report.outcome, Outcome::Passed, "{}", report.format());
    assert_eq!(report.summary.total, 4);
    assert_eq!(report.exit_code(FailOn::Fail), 0);
}

#[test]
fn missing_required_index_fails() {
    let repo = healthy_repo();
    fs::remove_file(repo.path().join("docs/ADR/README.md")).unwrap();

    let report = lint(repo.path(), GUARDRAILS);

    let verdict = report.verdict("adr-index").unwrap();
    assert_eq!(verdict.status, Status::Fail);
    assert_eq!(verdict.doc.as_deref(), Some("DOCS_MAP.md#adrs"));
    assert_eq!(report.outcome, Outcome::Failed);
    assert_ne!(report.exit_code(FailOn::Fail), 0);
}

#[test]
fn forbidden_file_fails_with_custom_message() {
    let repo = healthy_repo();
    touch(repo.path(), "labels.json", "[]");

    let report = lint(repo.path(), GUARDRAILS);

    let verdict = report.verdict("labels").unwrap();
    assert_eq!(verdict.status, Status::Fail);
    assert_eq!(verdict.paths, vec!["labels.json"]);
    assert!(verdict.message.ends_with("labels live in .github/labels.yml"));
}

#[test]
fn missing_cross_link_warns_without_failing() {
    let repo = healthy_repo();
    touch(repo.path(), "README.md", "# Project\n");

    let report = lint(repo.path(), GUARDRAILS);

    let verdict = report.verdict("readme").unwrap();
    assert_eq!(verdict.status, Status::Warn);
    assert!(verdict.message.contains("missing cross-link"));
    assert_eq!(report.outcome, Outcome::PassedWithWarnings);
    assert_eq!(report.exit_code(FailOn::Fail), 0);
    assert_eq!(report.exit_code(FailOn::Warn), 1);
}

#[test]
fn misnamed_optional_match_stays_pass() {
    let repo = healthy_repo();
    touch(repo.path(), "docs/ADR/notes.md", "scratch\n");

    let report = lint(repo.path(), GUARDRAILS);

    let verdict = report.verdict("adrs").unwrap();
    assert_eq!(verdict.status, Status::Pass);
    assert!(verdict.message.contains("naming convention"));
    assert_eq!(report.outcome, Outcome::Passed);
}

#[test]
fn directory_rules_ignore_files() {
    let repo = healthy_repo();
    touch(repo.path(), "tmp", "not a directory");

    let report = lint(
        repo.path(),
        r#"
[[rules]]
id = "no-tmp"
path = "tmp"
kind = "directory"
requirement = "forbidden"
"#,
    );

    assert_eq!(report.verdict("no-tmp").unwrap().status, Status::Pass);
}

// ── Determinism ──

#[test]
fn two_runs_serialize_identically() {
    let repo = healthy_repo();
    touch(repo.path(), "labels.json", "[]");

    let first = lint(repo.path(), GUARDRAILS).to_json().unwrap();
    let second = lint(repo.path(), GUARDRAILS).to_json().unwrap();

    assert_eq!(first, second);
}

#[test]
fn verdicts_are_sorted_by_rule_id() {
    let repo = healthy_repo();
    let report = lint(repo.path(), GUARDRAILS);

    let ids: Vec<&str> = report.verdicts.iter().map(|v| v.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["adr-index", "adrs", "labels", "readme"]);
}

#[test]
fn text_report_layout() {
    let repo = healthy_repo();
    fs::remove_file(repo.path().join("docs/ADR/README.md")).unwrap();
    touch(repo.path(), "README.md", "# Project\n");

    let report = lint(
        repo.path(),
        r#"
[[rules]]
id = "adr-index"
path = "docs/ADR/README.md"
requirement = "required"
doc = "DOCS_MAP.md#adrs"

[[rules]]
id = "readme"
path = "README.md"
requirement = "required"
"#,
    );

    insta::assert_snapshot!(report.format(), @r"
    FAIL adr-index
      missing required artifact: no file matches `docs/ADR/README.md`
      = see: DOCS_MAP.md#adrs

    PASS readme
      required artifact present (1 match(es))
      - README.md

    FAILED: 2 rule(s), 1 passed, 0 warning(s), 1 failed (4 entries scanned)
    ");
}

// ── Fatal errors ──

#[test]
fn duplicate_rule_ids_are_rejected() {
    let err = load_rule_set_from_str(
        r#"
[[rules]]
id = "readme"
path = "README.md"
requirement = "required"

[[rules]]
id = "readme"
path = "README.rst"
requirement = "optional"
"#,
        RuleFormat::Toml,
    )
    .unwrap_err();

    assert!(matches!(err, LoadError::DuplicateRule { ref id } if id == "readme"));
}

#[test]
fn missing_root_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let result = Linter::builder()
        .root(tmp.path().join("absent"))
        .build()
        .unwrap()
        .run();

    assert!(matches!(result, Err(LintError::Scan(_))));
}
