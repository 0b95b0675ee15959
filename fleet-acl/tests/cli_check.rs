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

fn fleet_acl() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("fleet-acl"))
}

#[test]
fn check_over_fixture_directory_reports_every_task() {
    fleet_acl()
        .arg("check")
        .arg(fixture("fixtures/acl"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "check devices=3 blocks=4 rules=12 skipped_blocks=1",
        ))
        .stdout(predicate::str::contains("malformed_acl_line"))
        .stdout(predicate::str::contains("shadowed_rule"))
        .stdout(predicate::str::contains("cross_category_conflict"))
        .stdout(predicate::str::contains("arp_rule"));
}

#[test]
fn dup_reports_redundant_and_shadowed_rules() {
    fleet_acl()
        .arg("dup")
        .arg(fixture("fixtures/acl/dc1-cs01-n9k.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("coverage groups="))
        .stdout(predicate::str::contains("redundant_rule"))
        .stdout(predicate::str::contains("shadowed_rule"))
        .stdout(predicate::str::contains("cross_category").not());
}

#[test]
fn dup_json_outputs_structured_report() {
    let output = fleet_acl()
        .arg("dup")
        .arg(fixture("fixtures/acl/edge-link-as01.txt"))
        .arg("--format")
        .arg("json")
        .output()
        .expect("run fleet-acl");
    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["task"], "dup");
    assert_eq!(report["devices"], 1);
    assert_eq!(report["config_source"], "embedded");
    assert!(report["groups"]["groups"].as_u64().is_some());
    let codes: Vec<&str> = report["findings"]
        .as_array()
        .expect("findings array")
        .iter()
        .filter_map(|f| f["code"].as_str())
        .collect();
    assert!(codes.contains(&"shadowed_rule"));
    assert!(codes.contains(&"redundant_rule"));
}

#[test]
fn strict_mode_fails_when_findings_exist() {
    fleet_acl()
        .arg("any-rules")
        .arg(fixture("fixtures/acl/edge-link-as01.txt"))
        .arg("--strict")
        .assert()
        .failure()
        .stdout(predicate::str::contains("any_rule"))
        .stderr(predicate::str::contains("any-rules failed in strict mode"));
}

#[test]
fn strict_mode_passes_on_clean_input() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("clean-host.txt");
    fs::write(
        &path,
        "ip access-list CLEAN\n  10 permit tcp 10.0.0.0/8 10.1.0.0/16 eq 443\n",
    )
    .expect("write input");

    fleet_acl()
        .arg("check")
        .arg(&path)
        .arg("--strict")
        .assert()
        .success()
        .stdout(predicate::str::contains("result errors=0 warnings=0"))
        .stdout(predicate::str::contains("- none"));
}

#[test]
fn ignore_any_config_suppresses_any_rules_for_device() {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("fleet.toml");
    fs::write(
        &config,
        "[ignore_any]\ndevices = [\"edge-link-as01\"]\n",
    )
    .expect("write config");

    fleet_acl()
        .arg("any-rules")
        .arg(fixture("fixtures/acl/edge-link-as01.txt"))
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("arp_rule"))
        .stdout(predicate::str::contains("any_rule").not());
}

#[test]
fn cross_check_pair_flag_overrides_config() {
    fleet_acl()
        .arg("cross-check")
        .arg(fixture("fixtures/acl"))
        .arg("--pair")
        .arg("cat1:cat3")
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"task\": \"cross-check\""))
        .stdout(predicate::str::contains("dc1-fw01-frp"))
        .stdout(predicate::str::contains("edge-link-as01").not());
}

#[test]
fn forced_category_applies_to_every_input() {
    fleet_acl()
        .arg("cross-check")
        .arg(fixture("fixtures/acl"))
        .arg("--category")
        .arg("cat5")
        .assert()
        .success()
        // only the two malformed fixture lines remain
        .stdout(predicate::str::contains("result errors=0 warnings=2"));
}

#[test]
fn bad_pair_is_rejected_by_argument_parsing() {
    fleet_acl()
        .arg("cross-check")
        .arg(fixture("fixtures/acl"))
        .arg("--pair")
        .arg("cat1-cat2")
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected LEFT:RIGHT"));
}

#[test]
fn invalid_config_is_fatal() {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("broken.toml");
    fs::write(&config, "[[category]]\nid = \"cat1\"\npatterns = [\"(\"]\n").expect("write config");

    fleet_acl()
        .arg("check")
        .arg(fixture("fixtures/acl"))
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn arp_table_flags_platform_networks_without_live_hosts() {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("fleet.toml");
    fs::write(
        &config,
        "[arp.platform_networks]\n\"*\" = [\"10.20.0.0/16\"]\n",
    )
    .expect("write config");

    fleet_acl()
        .arg("any-rules")
        .arg(fixture("fixtures/acl/dc1-cs01-n9k.txt"))
        .arg("--config")
        .arg(&config)
        .arg("--arp")
        .arg(fixture("fixtures/arp/dc1-arp.log"))
        .assert()
        .success()
        .stdout(predicate::str::contains("arp live_entries=2"))
        .stdout(predicate::str::contains("no live ARP entry in 10.20.5.0/24"))
        .stdout(predicate::str::contains("col1:row7"))
        // the config file carries no [[category]] rules
        .stderr(predicate::str::contains("no category rules configured"));
}

#[test]
fn missing_arp_table_is_an_error() {
    let dir = tempdir().expect("tempdir");
    fleet_acl()
        .arg("check")
        .arg(fixture("fixtures/acl"))
        .arg("--arp")
        .arg(dir.path().join("nope.log"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load ARP table"));
}

#[test]
fn repeated_pair_flags_report_each_conflict_once() {
    let once = fleet_acl()
        .arg("cross-check")
        .arg(fixture("fixtures/acl"))
        .arg("--pair")
        .arg("cat1:cat3")
        .arg("--format")
        .arg("json")
        .output()
        .expect("run fleet-acl");
    let repeated = fleet_acl()
        .arg("cross-check")
        .arg(fixture("fixtures/acl"))
        .args(["--pair", "cat1:cat3", "--pair", "cat3:cat1", "--pair", "cat1:cat3"])
        .arg("--format")
        .arg("json")
        .output()
        .expect("run fleet-acl");
    assert!(once.status.success() && repeated.status.success());
    let count = |stdout: &[u8]| {
        let report: serde_json::Value =
            serde_json::from_slice(stdout).expect("stdout should be JSON");
        report["findings"].as_array().map(Vec::len)
    };
    assert_eq!(count(&repeated.stdout), count(&once.stdout));
}

#[test]
fn missing_input_is_an_error() {
    let dir = tempdir().expect("tempdir");
    fleet_acl()
        .arg("check")
        .arg(dir.path().join("nope.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load device inputs"));
}
