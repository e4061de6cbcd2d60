//! CLI integration tests for Capstan.
//!
//! These tests verify the full CLI workflow from package creation through
//! manifest loading.

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the capstan binary command.
fn capstan() -> Command {
    Command::cargo_bin("capstan").unwrap()
}

/// Create a temporary directory for test packages.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

// ============================================================================
// capstan new
// ============================================================================

#[test]
fn test_new_creates_executable_package() {
    let tmp = temp_dir();
    let package_dir = tmp.path().join("myapp");

    capstan()
        .args(["new", "myapp"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(package_dir.join("Capstan.toml").exists());
    assert!(package_dir.join("sources/main.c").exists());

    let manifest = fs::read_to_string(package_dir.join("Capstan.toml")).unwrap();
    assert!(manifest.starts_with("# capstan-tools-version:1.2\n"));
    assert!(manifest.contains("name = \"myapp\""));
}

#[test]
fn test_new_creates_library_package() {
    let tmp = temp_dir();
    let package_dir = tmp.path().join("mylib");

    capstan()
        .args(["new", "mylib", "--kind", "library"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(package_dir.join("Capstan.toml").exists());
    assert!(package_dir.join("sources/mylib.c").exists());
    assert!(package_dir.join("tests/mylib_test.c").exists());
}

#[test]
fn test_new_hyphenated_name_keeps_spelling() {
    let tmp = temp_dir();
    let package_dir = tmp.path().join("some-package");

    capstan()
        .args(["new", "some-package", "--kind", "library"])
        .current_dir(tmp.path())
        .assert()
        .success();

    // Sources use the sanitized module identifier, the manifest keeps the
    // directory spelling.
    assert!(package_dir.join("sources/some_package.c").exists());
    let manifest = fs::read_to_string(package_dir.join("Capstan.toml")).unwrap();
    assert!(manifest.contains("name = \"some-package\""));
}

#[test]
fn test_new_fails_if_directory_not_empty() {
    let tmp = temp_dir();
    let package_dir = tmp.path().join("existing");
    fs::create_dir(&package_dir).unwrap();
    fs::write(package_dir.join("leftover.txt"), "content").unwrap();

    capstan()
        .args(["new", "existing"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ============================================================================
// capstan init
// ============================================================================

#[test]
fn test_init_in_existing_directory() {
    let tmp = temp_dir();

    capstan()
        .args(["init", "--kind", "empty"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp.path().join("Capstan.toml").exists());
}

#[test]
fn test_init_fails_if_manifest_exists() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("Capstan.toml"), "[package]\nname = \"x\"\n").unwrap();

    capstan()
        .args(["init"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ============================================================================
// capstan load
// ============================================================================

#[test]
fn test_load_scaffolded_manifest() {
    let tmp = temp_dir();

    capstan()
        .args(["new", "loadme", "--kind", "library"])
        .current_dir(tmp.path())
        .assert()
        .success();

    capstan()
        .args(["load"])
        .current_dir(tmp.path().join("loadme"))
        .assert()
        .success()
        .stderr(predicate::str::contains("loaded package `loadme`"));
}

#[test]
fn test_load_json_output() {
    let tmp = temp_dir();
    let manifest = r#"# capstan-tools-version:1.2
[package]
name = "Foo"

[[targets]]
name = "sys"
dependencies = ["libc"]

[[dependencies]]
url = "https://example.com/example"
major-version = 1
"#;
    fs::write(tmp.path().join("Capstan.toml"), manifest).unwrap();

    capstan()
        .args(["load", "--json"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Foo\""))
        .stdout(predicate::str::contains("https://example.com/example"));
}

#[test]
fn test_load_unsupported_tools_version() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("Capstan.toml"),
        "# capstan-tools-version:9.9\n[package]\nname = \"x\"\n",
    )
    .unwrap();

    capstan()
        .args(["load"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("tools-version 9.9"));
}

#[test]
fn test_load_duplicate_targets_rejected() {
    let tmp = temp_dir();
    let manifest = r#"[package]
name = "Dup"

[[targets]]
name = "a"

[[targets]]
name = "a"
"#;
    fs::write(tmp.path().join("Capstan.toml"), manifest).unwrap();

    capstan()
        .args(["load"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate target name `a`"));
}

#[test]
fn test_load_missing_manifest() {
    let tmp = temp_dir();

    capstan()
        .args(["load"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read manifest"));
}

#[test]
fn test_load_sandboxed_manifest() {
    let tmp = temp_dir();
    let manifest = "# capstan-tools-version:1.2\necho '{\"schema\": 1, \"package\": {\"name\": \"Scripted\"}}'\n";
    fs::write(tmp.path().join("Capstan.toml"), manifest).unwrap();

    capstan()
        .args(["load", "--sandbox", "/bin/sh"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("loaded package `Scripted`"));
}

// ============================================================================
// capstan completions
// ============================================================================

#[test]
fn test_completions_bash() {
    capstan()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("capstan"));
}
