//! End-to-end tests for the `structure-lint` binary.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const RULES: &str = r#"
[[rules]]
id = "adr-index"
path = "docs/ADR/README.md"
requirement = "required"

[[rules]]
id = "labels"
path = "labels.json"
requirement = "forbidden"

[[rules]]
id = "readme"
path = "README.md"
requirement = "required"
must-reference = ["adr-index"]
"#;

/// Builds a command isolated from the user's global rule directory.
fn structure_lint(global: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("structure-lint");
    cmd.env("STRUCTURE_LINT_CONFIG_DIR", global);
    cmd
}

fn repo(with_index: bool) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("structure-lint.toml"), RULES).unwrap();
    fs::write(tmp.path().join("README.md"), "see docs/ADR/README.md\n").unwrap();
    if with_index {
        fs::create_dir_all(tmp.path().join("docs/ADR")).unwrap();
        fs::write(tmp.path().join("docs/ADR/README.md"), "# ADRs\n").unwrap();
    }
    tmp
}

fn stdout_of(cmd: &mut Command, code: i32) -> String {
    let output = cmd.assert().code(code).get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn check_passes_on_conforming_tree() {
    let global = TempDir::new().unwrap();
    let repo = repo(true);

    let out = stdout_of(
        structure_lint(global.path()).arg("check").arg(repo.path()),
        0,
    );
    assert!(out.contains("PASSED: 3 rule(s)"), "{out}");
}

#[test]
fn check_fails_when_required_artifact_missing() {
    let global = TempDir::new().unwrap();
    let repo = repo(false);

    let out = stdout_of(
        structure_lint(global.path())
            .args(["check", "--format", "compact"])
            .arg(repo.path()),
        1,
    );
    assert!(out.contains("FAIL [adr-index] missing required artifact"), "{out}");
    assert!(out.trim_end().ends_with("FAILED"), "{out}");
}

#[test]
fn json_output_is_stable() {
    let global = TempDir::new().unwrap();
    let repo = repo(true);
    fs::write(repo.path().join("labels.json"), "[]").unwrap();

    let run = || {
        stdout_of(
            structure_lint(global.path())
                .args(["check", "--format", "json"])
                .arg(repo.path()),
            1,
        )
    };
    let first = run();
    assert_eq!(first, run());

    let json: Value = serde_json::from_str(&first).unwrap();
    assert_eq!(json["outcome"], "FAILED");
    assert_eq!(json["summary"]["failed"], 1);
    let ids: Vec<&str> = json["verdicts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["rule_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["adr-index", "labels", "readme"]);
}

#[test]
fn warnings_fail_only_with_fail_on_warn() {
    let global = TempDir::new().unwrap();
    let repo = repo(true);
    fs::write(repo.path().join("README.md"), "# no links\n").unwrap();

    let out = stdout_of(
        structure_lint(global.path()).arg("check").arg(repo.path()),
        0,
    );
    assert!(out.contains("PASSED-WITH-WARNINGS"), "{out}");

    structure_lint(global.path())
        .args(["check", "--fail-on", "warn"])
        .arg(repo.path())
        .assert()
        .code(1);
}

#[test]
fn inline_rules_bypass_config_files() {
    let global = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("labels.json"), "[]").unwrap();

    let out = stdout_of(
        structure_lint(global.path())
            .arg("check")
            .arg(tmp.path())
            .args([
                "--format",
                "compact",
                "--inline",
                "[[rules]]\nid = \"labels\"\npath = \"labels.json\"\nrequirement = \"forbidden\"\n",
            ]),
        1,
    );
    assert!(out.contains("FAIL [labels] forbidden artifact present"), "{out}");
}

#[test]
fn missing_rule_source_is_fatal() {
    let global = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();

    structure_lint(global.path())
        .arg("check")
        .arg(tmp.path())
        .assert()
        .code(2);
}

#[test]
fn duplicate_rule_is_fatal() {
    let global = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("structure-lint.toml"),
        "[[rules]]\nid = \"a\"\npath = \"a\"\nrequirement = \"required\"\n\n\
         [[rules]]\nid = \"a\"\npath = \"b\"\nrequirement = \"optional\"\n",
    )
    .unwrap();

    let output = structure_lint(global.path())
        .arg("check")
        .arg(tmp.path())
        .assert()
        .code(2)
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output).unwrap();
    assert!(stderr.contains("duplicate"), "{stderr}");
}

#[test]
fn unreadable_root_is_fatal() {
    let global = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let rules = tmp.path().join("rules.toml");
    fs::write(&rules, RULES).unwrap();

    structure_lint(global.path())
        .arg("--config")
        .arg(&rules)
        .arg("check")
        .arg(tmp.path().join("absent"))
        .assert()
        .code(2);
}

#[test]
fn global_rules_used_as_fallback() {
    let global = TempDir::new().unwrap();
    fs::write(global.path().join("config.toml"), RULES).unwrap();
    let tmp = TempDir::new().unwrap();

    let out = stdout_of(
        structure_lint(global.path())
            .args(["check", "--format", "compact"])
            .arg(tmp.path()),
        1,
    );
    assert!(out.contains("FAIL [readme]"), "{out}");
}

#[test]
fn list_rules_prints_each_rule() {
    let global = TempDir::new().unwrap();
    let repo = repo(true);

    let out = stdout_of(
        structure_lint(global.path()).arg("list-rules").arg(repo.path()),
        0,
    );
    for id in ["adr-index", "labels", "readme"] {
        assert!(out.contains(id), "{out}");
    }
    assert!(out.contains("Syntax"), "{out}");
    assert!(out.contains("glob"), "{out}");
    assert!(out.contains("must reference: adr-index"), "{out}");
    assert!(out.contains("3 rule(s)"), "{out}");
}

#[test]
fn init_writes_starter_file_once() {
    let global = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();

    structure_lint(global.path())
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success();
    assert!(tmp.path().join("structure-lint.toml").is_file());

    structure_lint(global.path())
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .code(2);

    structure_lint(global.path())
        .current_dir(tmp.path())
        .args(["init", "--force", "--json"])
        .assert()
        .success();
    assert!(tmp.path().join("structure-lint.json").is_file());
}
