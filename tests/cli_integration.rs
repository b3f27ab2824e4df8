//! Integration tests for the command-line interface
//!
//! Tests the run, file, and check commands against the built binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const JEST_TEST: &str = "test('adds', () => { expect(1 + 1).toBe(2); });\n";
const VITEST_TEST: &str =
    "import { expect, test } from 'vitest';\ntest('adds', () => { expect(1 + 1).toBe(2); });\n";

/// Helper to create a test repository with one Jest file
fn setup_test_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("package.json"), "{ \"name\": \"demo\" }\n").unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/add.test.ts"), JEST_TEST).unwrap();
    dir
}

fn vitestify(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vitestify"))
        .args(args)
        .env_remove("VITESTIFY_ROOT")
        .output()
        .unwrap()
}

fn root_arg(dir: &Path) -> String {
    dir.to_string_lossy().into_owned()
}

#[test]
fn test_help() {
    let output = vitestify(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("run"));
    assert!(stdout.contains("file"));
    assert!(stdout.contains("check"));
}

#[test]
fn test_run_help() {
    let output = vitestify(&["run", "--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--dry-run"));
    assert!(stdout.contains("--esm-shims"));
    assert!(stdout.contains("--testing-library"));
}

#[test]
fn test_file_prints_rewrite() {
    let dir = setup_test_repo();
    let file = dir.path().join("src/add.test.ts");

    let output = vitestify(&[
        "file",
        &file.to_string_lossy(),
        "--root",
        &root_arg(dir.path()),
    ]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), VITEST_TEST);
    // Printing never writes
    assert_eq!(fs::read_to_string(&file).unwrap(), JEST_TEST);
}

#[test]
fn test_file_write() {
    let dir = setup_test_repo();
    let file = dir.path().join("src/add.test.ts");

    let output = vitestify(&[
        "file",
        &file.to_string_lossy(),
        "--write",
        "--root",
        &root_arg(dir.path()),
    ]);

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&file).unwrap(), VITEST_TEST);
}

#[test]
fn test_file_structural_error_fails() {
    let dir = setup_test_repo();
    let file = dir.path().join("src/bad.test.ts");
    fs::write(&file, "let x: jest.Unknown;\n").unwrap();

    let output = vitestify(&[
        "file",
        &file.to_string_lossy(),
        "--root",
        &root_arg(dir.path()),
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("jest.Unknown"));
}

#[test]
fn test_check_exit_status() {
    let dir = setup_test_repo();
    let root = root_arg(dir.path());

    let output = vitestify(&["check", "--root", &root]);
    assert_eq!(output.status.code(), Some(1));

    let output = vitestify(&["run", "--root", &root]);
    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("src/add.test.ts")).unwrap(),
        VITEST_TEST
    );

    let output = vitestify(&["check", "--root", &root]);
    assert!(output.status.success());
}

#[test]
fn test_dry_run_with_diff() {
    let dir = setup_test_repo();

    let output = vitestify(&["run", "--dry-run", "--diff", "--root", &root_arg(dir.path())]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DRY RUN"));
    assert!(stdout.contains("import { expect, test } from 'vitest';"));
    assert_eq!(
        fs::read_to_string(dir.path().join("src/add.test.ts")).unwrap(),
        JEST_TEST
    );
}

#[test]
fn test_json_summary() {
    let dir = setup_test_repo();

    let output = vitestify(&["run", "--json", "--root", &root_arg(dir.path())]);

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["rewritten"], 1);
    assert_eq!(summary["failed"], 0);
}

#[test]
fn test_failed_file_exits_nonzero() {
    let dir = setup_test_repo();
    fs::write(dir.path().join("src/bad.test.ts"), "let x: jest.Unknown;\n").unwrap();

    let output = vitestify(&["run", "--root", &root_arg(dir.path())]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bad.test.ts"));
    // The healthy file is still rewritten
    assert_eq!(
        fs::read_to_string(dir.path().join("src/add.test.ts")).unwrap(),
        VITEST_TEST
    );
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = setup_test_repo();
    fs::write(
        dir.path().join("vitestify.toml"),
        "[discovery]\ninclude = []\n",
    )
    .unwrap();

    let output = vitestify(&["run", "--root", &root_arg(dir.path())]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid config"));
}
