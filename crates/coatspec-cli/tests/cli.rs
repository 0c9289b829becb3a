//! End-to-end CLI tests.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn coatspec() -> Command {
    Command::cargo_bin("coatspec").unwrap()
}

#[test]
fn config_init_writes_the_example_grammar() {
    let dir = tempfile::tempdir().unwrap();
    let rules = dir.path().join("rules.json");

    coatspec()
        .args(["config", "init", "--output"])
        .arg(&rules)
        .assert()
        .success();

    let content = fs::read_to_string(&rules).unwrap();
    assert!(content.contains("standard_text"));
    assert!(content.contains("topcoat_colors"));
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let rules = dir.path().join("rules.json");
    fs::write(&rules, "{}").unwrap();

    coatspec()
        .args(["config", "init", "--output"])
        .arg(&rules)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn process_plain_input_extracts_the_callout() {
    let dir = tempfile::tempdir().unwrap();
    let rules = dir.path().join("rules.json");
    let input = dir.path().join("callouts.txt");

    coatspec()
        .args(["config", "init", "--output"])
        .arg(&rules)
        .assert()
        .success();

    fs::write(&input, "jdmf14zza3(x3,x5)\n").unwrap();

    coatspec()
        .arg("--rules")
        .arg(&rules)
        .arg("process")
        .arg(&input)
        .args(["--plain", "--format", "jsonl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"standard_text\":\"jdmf14\""))
        .stdout(predicate::str::contains("Black primer"));
}

#[test]
fn process_reports_the_summary() {
    let dir = tempfile::tempdir().unwrap();
    let rules = dir.path().join("rules.json");
    let input = dir.path().join("callouts.txt");

    coatspec()
        .args(["config", "init", "--output"])
        .arg(&rules)
        .assert()
        .success();

    // Two duplicates of one callout plus one unparseable line.
    fs::write(&input, "jdmf14zza3\njdmf14zza3\nno callout\n").unwrap();

    coatspec()
        .arg("--rules")
        .arg(&rules)
        .arg("process")
        .arg(&input)
        .args(["--plain", "--summary"])
        .assert()
        .success()
        .stderr(predicate::str::contains("3 records in, 2 out"))
        .stderr(predicate::str::contains("1 duplicates discarded"));
}

#[test]
fn missing_rules_file_suggests_init() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("callouts.txt");
    fs::write(&input, "jdmf14zza3\n").unwrap();

    coatspec()
        .args(["--rules", "/nonexistent/rules.json", "process"])
        .arg(&input)
        .arg("--plain")
        .assert()
        .failure()
        .stderr(predicate::str::contains("coatspec config init"));
}

#[test]
fn jsonl_records_roundtrip_through_csv() {
    let dir = tempfile::tempdir().unwrap();
    let rules = dir.path().join("rules.json");
    let input = dir.path().join("records.jsonl");

    coatspec()
        .args(["config", "init", "--output"])
        .arg(&rules)
        .assert()
        .success();

    fs::write(
        &input,
        r#"{"source_id":"dwg-7","page_number":2,"coordinates":[10.0,20.0,110.0,40.0],"raw_text":"jdmfi4h2a3"}"#,
    )
    .unwrap();

    coatspec()
        .arg("--rules")
        .arg(&rules)
        .arg("process")
        .arg(&input)
        .args(["--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("source_id,page_number,standard_text"))
        .stdout(predicate::str::contains("dwg-7,2,jdmf14,h2"));
}
