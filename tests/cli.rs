//! Command-line behaviour of the `dap2` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const DDS: &str = "Dataset {
    Int32 x[2];
    Structure {
        Float64 depth;
    } cast;
} demo;
";

const DAS: &str = r#"Attributes {
    x { String units "m"; }
}
"#;

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("demo.dds"), DDS).unwrap();
    fs::write(dir.path().join("demo.das"), DAS).unwrap();

    let mut body = DDS.as_bytes().to_vec();
    body.extend(b"\nData:\n");
    for word in [2u32, 2, 3, 5] {
        body.extend(word.to_be_bytes());
    }
    body.extend(2.5f64.to_be_bytes());
    fs::write(dir.path().join("demo.dods"), body).unwrap();
    dir
}

#[test]
fn prints_schema_with_attributes() {
    let dir = fixture();
    Command::cargo_bin("dap2")
        .unwrap()
        .arg(dir.path().join("demo"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Dataset: demo"))
        .stdout(predicate::str::contains("Int32 x[2]"))
        .stdout(predicate::str::contains("@units = \"m\""))
        .stdout(predicate::str::contains("Float64 depth"));
}

#[test]
fn no_das_skips_attributes() {
    let dir = fixture();
    Command::cargo_bin("dap2")
        .unwrap()
        .arg(dir.path().join("demo"))
        .arg("--no-das")
        .assert()
        .success()
        .stdout(predicate::str::contains("Int32 x[2]"))
        .stdout(predicate::str::contains("@units").not());
}

#[test]
fn decodes_dods_with_stats() {
    let dir = fixture();
    Command::cargo_bin("dap2")
        .unwrap()
        .arg("--dods")
        .arg(dir.path().join("demo.dods"))
        .arg("--stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("x = [3, 5]"))
        .stdout(predicate::str::contains("min: 3, max: 5, mean: 4"))
        .stdout(predicate::str::contains("cast = {depth: 2.5}"));
}

#[test]
fn writes_log_file() {
    let dir = fixture();
    let log = dir.path().join("dap2.log");
    Command::cargo_bin("dap2")
        .unwrap()
        .arg(dir.path().join("demo"))
        .arg("--log")
        .arg(&log)
        .assert()
        .success();
    let text = fs::read_to_string(log).unwrap();
    assert!(text.contains("Starting dap2"));
    assert!(text.contains("Loading dataset"));
}

#[test]
fn missing_dataset_fails() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("dap2")
        .unwrap()
        .arg(dir.path().join("absent"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load dataset"));
}

#[test]
fn malformed_dds_reports_excerpt() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.dds"), "Dataset { Int32 x[2] } bad;").unwrap();
    Command::cargo_bin("dap2")
        .unwrap()
        .arg(dir.path().join("bad"))
        .arg("--no-das")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unable to parse stream"));
}

#[test]
fn requires_an_input() {
    Command::cargo_bin("dap2")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to do"));
}
