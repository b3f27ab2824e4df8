//! Integration tests for vitestify.toml loading
//!
//! Tests defaults, overrides, validation, and config file lookup

use std::fs;
use tempfile::TempDir;
use vitestify::config::{
    load_for_root, load_from_path, load_from_str, ConfigError, ValidationIssue, VitestifyConfig,
    CONFIG_FILE_NAME,
};

#[test]
fn test_empty_config_is_default() {
    let config = load_from_str("").unwrap();
    assert_eq!(config, VitestifyConfig::default());
    assert!(config.rewrite.reject_syntax_errors);
    assert!(config.rewrite.validate_output);
    assert!(!config.rewrite.esm_shims);
}

#[test]
fn test_full_config() {
    let toml = r#"
[discovery]
include = ["src/**/*.test.ts"]
exclude = ["src/legacy/**"]
skip_patterns = ["__fixtures__/"]

[rewrite]
esm_shims = true
testing_library = true
reject_syntax_errors = false

[workers]
min = 1
max = 4
queue_depth = 32
"#;

    let config = load_from_str(toml).unwrap();
    assert_eq!(config.discovery.include, vec!["src/**/*.test.ts"]);
    assert_eq!(config.discovery.exclude, vec!["src/legacy/**"]);
    assert_eq!(config.discovery.skip_patterns, vec!["__fixtures__/"]);
    assert!(config.rewrite.esm_shims);
    assert!(config.rewrite.testing_library);
    assert!(!config.rewrite.reject_syntax_errors);
    // Unset keys keep their defaults
    assert!(config.rewrite.validate_output);
    assert_eq!(config.workers.max, 4);
    assert_eq!(config.workers.queue_depth, 32);
}

#[test]
fn test_worker_override_is_clamped() {
    let config = VitestifyConfig::default();
    assert_eq!(config.workers.resolve(Some(0)), 1);
    assert_eq!(config.workers.resolve(Some(3)), 3);

    let resolved = config.workers.resolve(None);
    assert!(resolved >= config.workers.min);
    assert!(resolved <= config.workers.max);
}

#[test]
fn test_unknown_key_is_rejected() {
    let result = load_from_str("[rewrite]\nesm_shim = true\n");
    assert!(matches!(result, Err(ConfigError::Toml { .. })));
}

#[test]
fn test_validation_collects_all_issues() {
    let toml = r#"
[discovery]
include = []
exclude = ["src/["]
skip_patterns = ["("]

[workers]
min = 8
max = 2
"#;

    let Err(ConfigError::Validation { source, .. }) = load_from_str(toml) else {
        panic!("expected a validation error");
    };

    assert_eq!(source.issues.len(), 4);
    assert!(source.issues.contains(&ValidationIssue::EmptyList {
        field: "discovery.include"
    }));
    assert!(source
        .issues
        .iter()
        .any(|issue| matches!(issue, ValidationIssue::InvalidGlob { pattern, .. } if pattern == "src/[")));
    assert!(source
        .issues
        .iter()
        .any(|issue| matches!(issue, ValidationIssue::InvalidRegex { pattern, .. } if pattern == "(")));
    assert!(source.issues.iter().any(
        |issue| matches!(issue, ValidationIssue::InvalidRange { field, .. } if *field == "workers.max")
    ));
}

#[test]
fn test_error_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(&path, "[workers]\nqueue_depth = 0\n").unwrap();

    let err = load_from_path(&path).unwrap_err();
    let message = err.to_string();
    assert!(message.contains(CONFIG_FILE_NAME));
    assert!(message.contains("workers.queue_depth"));
}

#[test]
fn test_missing_explicit_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let result = load_for_root(dir.path(), Some(&missing));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_root_lookup() {
    let dir = TempDir::new().unwrap();

    // No file: defaults
    assert_eq!(
        load_for_root(dir.path(), None).unwrap(),
        VitestifyConfig::default()
    );

    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[rewrite]\ntesting_library = true\n",
    )
    .unwrap();
    let config = load_for_root(dir.path(), None).unwrap();
    assert!(config.rewrite.testing_library);
}
