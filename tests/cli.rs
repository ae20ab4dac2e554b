//! Integration test: run the `varinfo` binary against the DMR fixture.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn data_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data").join(name)
}

fn varinfo() -> Command {
    Command::cargo_bin("varinfo").unwrap()
}

#[test]
fn lists_science_and_metadata_variables() {
    varinfo()
        .arg(data_path("ATL03_example.dmr"))
        .arg("--config")
        .arg(data_path("rules.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Short name: ATL03"))
        .stdout(predicate::str::contains("Mission: ICESat2"))
        .stdout(predicate::str::contains("Science variables:"))
        .stdout(predicate::str::contains("  /gt1r/heights/h_ph"))
        .stdout(predicate::str::contains("Metadata variables:"))
        .stdout(predicate::str::contains("  /orbit_info/sc_orient"));
}

#[test]
fn prints_required_variables() {
    varinfo()
        .arg(data_path("ATL03_example.dmr"))
        .args(["--mission", "ICESat2", "--short-name", "ATL03"])
        .arg("--config")
        .arg(data_path("rules.yml"))
        .args(["--required", "/gt1r/heights/h_ph"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Required variables:"))
        .stdout(predicate::str::contains("  /gt1r/geolocation/delta_time"))
        .stdout(predicate::str::contains("  /ds_surf_type"))
        .stdout(predicate::str::contains("Science variables:").not());
}

#[test]
fn writes_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("varinfo.log");

    varinfo()
        .arg(data_path("ATL03_example.dmr"))
        .arg("--log")
        .arg(&log)
        .assert()
        .success();

    let content = std::fs::read_to_string(&log).unwrap();
    assert!(content.contains("Built variable graph"));
}

#[test]
fn fails_on_missing_granule() {
    varinfo()
        .arg("no_such_granule.dmr")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn fails_on_missing_rule_file() {
    varinfo()
        .arg(data_path("ATL03_example.dmr"))
        .args(["--config", "bad_file_path.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No file in specified location"));
}
