//! Integration tests for `logvault config` command.
//!
//! Tests config validation and display functionality with real TOML files.

use std::fs;
use std::path::Path;

use logvault_cli::commands::config::{show_report, validation_report};
use logvault_core::config::LogvaultConfig;
use tempfile::TempDir;

#[tokio::test]
async fn test_config_validate_valid_toml() {
    // Given: A valid config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("logvault.toml");

    let valid_config = r#"
[general]
log_level = "info"
log_format = "json"

[client]
base_url = "https://logstore.example:8444"
tenant_id = "acme"

[query]
page_size = 500
"#;

    fs::write(&config_path, valid_config).expect("should write config");

    // When: Validating the config
    let report = validation_report(&config_path).await;

    // Then: Should be valid
    assert!(report.valid, "valid config should pass: {:?}", report.errors);
    assert!(report.errors.is_empty());
}

#[tokio::test]
async fn test_config_validate_malformed_toml() {
    // Given: A malformed TOML file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");

    let malformed_config = r#"
[general
log_level = "info"
"#;

    fs::write(&config_path, malformed_config).expect("should write bad config");

    // When: Validating the config
    let report = validation_report(&config_path).await;

    // Then: Should fail with a parse error
    assert!(!report.valid, "malformed TOML should fail validation");
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("parse"), "got: {}", report.errors[0]);
}

#[tokio::test]
async fn test_config_validate_invalid_value() {
    // Given: A config with a non-HTTP base URL
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("logvault.toml");
    fs::write(
        &config_path,
        "[client]\nbase_url = \"ftp://logstore.example\"\n",
    )
    .expect("should write config");

    // When: Validating the config
    let report = validation_report(&config_path).await;

    // Then: The error names the field
    assert!(!report.valid);
    assert!(report.errors[0].contains("client.base_url"));
}

#[tokio::test]
async fn test_config_validate_missing_file() {
    // Given: A nonexistent file path
    let config_path = Path::new("/nonexistent/logvault.toml");

    // When: Validating the config
    let report = validation_report(config_path).await;

    // Then: Should fail
    assert!(!report.valid, "missing file should fail to load");
    assert!(report.errors[0].contains("not found"));
}

#[tokio::test]
async fn test_config_validate_empty_file() {
    // Given: An empty config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("empty.toml");

    fs::write(&config_path, "").expect("should write empty file");

    // When: Loading the config
    let config = LogvaultConfig::load(&config_path)
        .await
        .expect("empty config should use defaults");

    // Then: Defaults apply
    assert_eq!(config.client.base_url, "https://localhost:8444");
    assert_eq!(config.query.page_size, 100);
}

#[tokio::test]
async fn test_config_show_section_from_file() {
    // Given: A config file with a query section
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("logvault.toml");
    fs::write(
        &config_path,
        "[query]\npage_size = 250\nmax_results = 1000\n",
    )
    .expect("should write config");

    let config = LogvaultConfig::load(&config_path)
        .await
        .expect("config should load");

    // When: Showing only the query section
    let report = show_report(&config, &config_path, Some("query".to_owned()))
        .expect("known section should render");

    // Then: Only that section is included
    assert!(report.config_toml.contains("page_size = 250"));
    assert!(report.config_toml.contains("max_results = 1000"));
    assert!(!report.config_toml.contains("base_url"));
    assert_eq!(report.config["page_size"], 250);
}
