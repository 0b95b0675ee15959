use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn inspect_lists_blocks_rules_and_parse_findings() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fleet-acl"));
    cmd.arg("inspect")
        .arg(fixture("fixtures/acl/dc1-cs01-n9k.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("dc1-cs01-n9k [cat1 N9K core switch] col1"))
        .stdout(predicate::str::contains("block CORE-FILTER dialect=NXOS"))
        .stdout(predicate::str::contains("permit tcp 10.0.0.0/8 10.20.0.0/16 eq 80"))
        .stdout(predicate::str::contains("skipped blocks: 1"))
        .stdout(predicate::str::contains("unparsable ACL line"));
}

#[test]
fn inspect_json_serializes_parsed_devices() {
    let output = Command::new(assert_cmd::cargo::cargo_bin!("fleet-acl"))
        .arg("inspect")
        .arg(fixture("fixtures/acl/dc1-fw01-frp.txt"))
        .arg("--format")
        .arg("json")
        .output()
        .expect("run fleet-acl");
    assert!(output.status.success());
    let devices: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(devices[0]["device"], "dc1-fw01-frp");
    assert_eq!(devices[0]["category"], "cat3");
    assert_eq!(devices[0]["scan"]["blocks"][0]["name"], "OUTSIDE_IN");
    assert_eq!(
        devices[0]["scan"]["blocks"][0]["rules"]
            .as_array()
            .map(Vec::len),
        Some(3)
    );
}

#[test]
fn inspect_reads_json_columns() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("columns.json");
    fs::write(
        &path,
        r#"[{"device": "lab-1", "category": "cat4", "cells": ["deny ip any 10.0.0.0 0.0.255.255"]}]"#,
    )
    .expect("write input");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fleet-acl"));
    cmd.arg("inspect")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("lab-1 [cat4 LINK-DS switch] col1"))
        .stdout(predicate::str::contains("block (unnamed)"));
}
