//! End-to-end tests for the `alps` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

const DOCUMENT: &str = "\
## 1. Overview
---
## 2. Users
---
## 3. Goals
---
## 4. Scope
---
## 5. Architecture
---
## 6. Feature-Level Specification
### 6.1 Trail Check-in
**User Story:** As a hiker, I want to check in at a trailhead.
**Complexity:** Medium
### 6.2 Offline Maps
As a hiker, I want maps without signal.
---
## 7. Appendix
";

fn fixture(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn alps() -> Command {
    let mut cmd = Command::cargo_bin("alps").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("ALPS_CONFIG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_version() {
    alps()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_process_offline_prints_summary() {
    let file = fixture(DOCUMENT);

    alps()
        .args(["process", "--offline"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsed document with 1 sections"))
        .stdout(predicate::str::contains("Section 6 has 2 subsections"))
        .stdout(predicate::str::contains("Validation: Passed"));
}

#[test]
fn test_process_offline_json() {
    let file = fixture(DOCUMENT);

    let output = alps()
        .args(["process", "--offline", "--format", "json"])
        .arg(file.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let subsections = report["document"]["sections"]["6"]["subsections"]
        .as_array()
        .unwrap();
    assert_eq!(subsections.len(), 2);
    assert_eq!(subsections[0]["complexity"], "Medium");
    assert_eq!(report["validation"]["is_valid"], true);
}

#[test]
fn test_process_writes_output_file() {
    let file = fixture(DOCUMENT);
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("report.yaml");

    alps()
        .args(["process", "--offline", "--format", "yaml", "--output"])
        .arg(&target)
        .arg(file.path())
        .assert()
        .success();

    let written = std::fs::read_to_string(&target).unwrap();
    assert!(written.contains("subsections_count: 2"));
}

#[test]
fn test_process_reports_validation_issues() {
    let file = fixture("1\n---\n2\n---\n3\n---\n4\n---\n5\n---\n## 6\nNothing here yet.");

    alps()
        .args(["process", "--offline"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation: Failed"))
        .stdout(predicate::str::contains("No subsections found in Section 6"));
}

#[test]
fn test_missing_file_fails_with_category() {
    let dir = tempfile::tempdir().unwrap();

    alps()
        .args(["process", "--offline"])
        .arg(dir.path().join("absent.md"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not_found"))
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_short_document_fails_with_found_count() {
    let file = fixture("A\n---\nB\n---\nC");

    alps()
        .args(["process", "--offline"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("section_not_found"))
        .stderr(predicate::str::contains("only 3 sections"));
}

#[test]
fn test_hosted_backend_requires_api_key() {
    let file = fixture(DOCUMENT);

    alps()
        .arg("process")
        .arg(file.path())
        .env_remove("ALPS__LLM__API_KEY")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--offline"));
}
