//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_TOML: &str = r#"# structure-lint rules
#
# Each [[rules]] table constrains one kind of artifact in the repository.
# requirement: required | optional | forbidden
# kind:        file (default) | directory

# Fail the run on warnings too ("fail" or "warn")
fail_on = "fail"

[scanner]
exclude = [".git", "**/target", "**/node_modules"]
follow_links = true
respect_gitignore = false

[[rules]]
id = "readme"
path = "README.md"
requirement = "required"
must-reference = ["docs-map"]

[[rules]]
id = "docs-map"
path = "DOCS_MAP.md"
requirement = "required"

[[rules]]
id = "adr-index"
path = "docs/ADR/README.md"
requirement = "required"
doc = "DOCS_MAP.md"

[[rules]]
id = "adrs"
path = "docs/ADR/*.md"
requirement = "optional"
naming = '^(README|\d{4}-[a-z0-9-]+)\.md$'

# [[rules]]
# id = "no-labels-json"
# path = "labels.json"
# requirement = "forbidden"
# message = "labels live in .github/labels.yml"
"#;

const DEFAULT_JSON: &str = r#"{
  "fail_on": "fail",
  "scanner": {
    "exclude": [".git", "**/target", "**/node_modules"]
  },
  "rules": [
    {
      "id": "readme",
      "path": "README.md",
      "requirement": "required",
      "must-reference": ["docs-map"]
    },
    {
      "id": "docs-map",
      "path": "DOCS_MAP.md",
      "requirement": "required"
    },
    {
      "id": "adr-index",
      "path": "docs/ADR/README.md",
      "requirement": "required",
      "doc": "DOCS_MAP.md"
    },
    {
      "id": "adrs",
      "path": "docs/ADR/*.md",
      "requirement": "optional",
      "naming": "^(README|\\d{4}-[a-z0-9-]+)\\.md$"
    }
  ]
}
"#;

/// Runs the init command.
pub fn run(force: bool, json: bool) -> Result<()> {
    let (name, content) = if json {
        ("structure-lint.json", DEFAULT_JSON)
    } else {
        ("structure-lint.toml", DEFAULT_TOML)
    };
    let config_path = Path::new(name);

    if config_path.exists() && !force {
        bail!(
            "Rule file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, content)?;

    println!("Created {name}");
    println!("\nNext steps:");
    println!("  1. Edit {name} to describe your repository layout");
    if json {
        println!("  2. Run: structure-lint --config {name} check");
    } else {
        println!("  2. Run: structure-lint check");
    }

    Ok(())
}
