//! Tests for the curvature binary

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn site(navbar: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let base = dir.path();
    fs::create_dir(base.join("components")).unwrap();
    fs::write(
        base.join("curvature.toml"),
        "[components]\nnavbar = \"navbar.html\"\n",
    )
    .unwrap();
    fs::write(base.join("components/navbar.html"), navbar).unwrap();
    fs::write(
        base.join("index.html"),
        "<body>\n  <curvature-navbar></curvature-navbar>\n</body>\n",
    )
    .unwrap();
    dir
}

fn curvature(base: &Path) -> Command {
    let mut cmd = Command::cargo_bin("curvature").unwrap();
    cmd.arg(base);
    cmd
}

#[test]
fn test_build_writes_output() {
    let dir = site("<nav></nav>\n");
    curvature(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered 1"));

    let out = fs::read_to_string(dir.path().join("curvature-output/index.html")).unwrap();
    assert_eq!(out, "<body>\n  <nav></nav>\n</body>\n");
}

#[test]
fn test_custom_output_dir() {
    let dir = site("<nav></nav>\n");
    let out = TempDir::new().unwrap();
    curvature(dir.path())
        .arg("--output")
        .arg(out.path())
        .assert()
        .success();
    assert!(out.path().join("index.html").is_file());
}

#[test]
fn test_check_passes() {
    let dir = site("<nav></nav>\n");
    curvature(dir.path())
        .arg("--check")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 components checked: no cycle"));
    assert!(!dir.path().join("curvature-output").exists());
}

#[test]
fn test_check_reports_cycle() {
    let dir = site("<curvature-navbar/>\n");
    curvature(dir.path())
        .arg("--check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("navbar --> navbar"));
}

#[test]
fn test_unknown_component_fails() {
    let dir = site("<nav></nav>\n");
    fs::write(
        dir.path().join("index.html"),
        "<curvature-sidebar></curvature-sidebar>\n",
    )
    .unwrap();
    curvature(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("sidebar"));
}

#[test]
fn test_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    curvature(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no config file found"));
}

#[test]
fn test_nested_flag_expands_inner_components() {
    let dir = site("<nav>\n  <curvature-brand/>\n</nav>\n");
    fs::write(
        dir.path().join("curvature.toml"),
        "[components]\nnavbar = \"navbar.html\"\nbrand = \"brand.html\"\n",
    )
    .unwrap();
    fs::write(dir.path().join("components/brand.html"), "<b>Co</b>\n").unwrap();

    curvature(dir.path()).arg("--nested").assert().success();
    let out = fs::read_to_string(dir.path().join("curvature-output/index.html")).unwrap();
    assert_eq!(out, "<body>\n  <nav>\n    <b>Co</b>\n  </nav>\n</body>\n");
}

#[test]
fn test_skip_validation_builds_despite_cycle() {
    let dir = site("<curvature-navbar/>\n");
    curvature(dir.path()).assert().failure();

    curvature(dir.path())
        .arg("--skip-validation")
        .assert()
        .success();
    let out = fs::read_to_string(dir.path().join("curvature-output/index.html")).unwrap();
    assert_eq!(out, "<body>\n  <curvature-navbar/>\n</body>\n");
}

#[test]
fn test_prefix_flag() {
    let dir = site("<nav></nav>\n");
    fs::write(dir.path().join("index.html"), "<g-navbar></g-navbar>\n").unwrap();

    curvature(dir.path()).arg("--prefix").arg("g").assert().success();
    let out = fs::read_to_string(dir.path().join("curvature-output/index.html")).unwrap();
    assert_eq!(out, "<nav></nav>\n");
}

#[test]
fn test_relative_config_flag_is_not_copied() {
    let dir = site("<nav></nav>\n");
    fs::rename(
        dir.path().join("curvature.toml"),
        dir.path().join("site.toml"),
    )
    .unwrap();

    Command::cargo_bin("curvature")
        .unwrap()
        .current_dir(dir.path())
        .args([".", "--config", "site.toml"])
        .assert()
        .success();

    let out = dir.path().join("curvature-output");
    assert!(out.join("index.html").is_file());
    assert!(!out.join("site.toml").exists());
}
