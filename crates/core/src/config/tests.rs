//! Tests for configuration module

use super::*;
use crate::error::{Error, Result};
use std::io::Write;
use tempfile::NamedTempFile;

fn create_temp_config_file(content: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .map_err(|e| Error::config(format!("Failed to create temp file: {e}")))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::config(format!("Failed to write temp file: {e}")))?;
    file.flush()
        .map_err(|e| Error::config(format!("Failed to flush temp file: {e}")))?;
    Ok(file)
}

#[test]
fn test_from_toml_str_valid() {
    let toml = r#"
        [backend]
        provider = "nexus"
        url = "https://nexus.example.com"
        username = "deploy"
        password = "hunter2"
        page_size = 50

        [search]
        max_pages = 5
    "#;

    let config = Config::from_toml_str(toml).expect("Failed to parse valid TOML");
    assert_eq!(config.backend.provider, "nexus");
    assert_eq!(config.backend.page_size, 50);
    assert_eq!(config.backend.credentials(), Some(("deploy", "hunter2")));
    assert_eq!(config.search.max_pages, 5);
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_toml_str_empty_uses_defaults() {
    let config = Config::from_toml_str("").expect("Failed to parse empty TOML");
    assert_eq!(config.backend.provider, "central");
    assert_eq!(config.backend.timeout_secs, 30);
    assert_eq!(config.backend.page_size, 20);
    assert_eq!(config.search.max_pages, 50);
    assert!(config.search.timeout_secs.is_none());
    assert!(!config.proxy.is_enabled());
}

#[test]
fn test_from_toml_str_invalid_syntax() {
    let toml = r#"
        [backend
        provider = "central"
    "#;

    let result = Config::from_toml_str(toml);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Failed to parse TOML"));
}

#[test]
fn test_from_file_reads_sections() {
    let file = create_temp_config_file(
        r#"
        [backend]
        page_size = 10

        [proxy]
        url = "http://proxy.internal:3128"

        [search]
        max_pages = 3
        timeout_secs = 20
    "#,
    )
    .expect("temp config");

    let config = Config::from_file(file.path()).expect("Failed to load config");
    assert_eq!(config.backend.provider, "central");
    assert_eq!(config.backend.page_size, 10);
    assert!(config.proxy.is_enabled());
    assert_eq!(config.search.max_pages, 3);
    assert_eq!(config.search.timeout(), Some(std::time::Duration::from_secs(20)));
}

#[test]
fn test_from_file_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = Config::from_file(&dir.path().join("absent.toml")).expect("defaults");
    assert_eq!(config.search.max_pages, 50);
    assert_eq!(config.backend.page_size, 20);
}

#[test]
fn test_validate_rejects_unknown_provider() {
    let mut config = Config::default();
    config.backend.provider = "artifactory".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Invalid backend provider"));
}

#[test]
fn test_validate_requires_nexus_url() {
    let mut config = Config::default();
    config.backend.provider = "nexus".to_string();
    assert!(config.validate().is_err());

    config.backend.url = Some("nexus.example.com".to_string());
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("http:// or https://"));

    config.backend.url = Some("https://nexus.example.com".to_string());
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_bounds() {
    let mut config = Config::default();
    config.backend.page_size = 0;
    assert!(config.validate().is_err());

    config.backend.page_size = 201;
    assert!(config.validate().is_err());

    config.backend.page_size = 200;
    assert!(config.validate().is_ok());

    config.search.max_pages = 0;
    assert!(config.validate().is_err());

    config.search.max_pages = 1;
    config.search.timeout_secs = Some(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_credentials_require_both_parts() {
    let mut backend = BackendConfig {
        username: Some("user".to_string()),
        ..Default::default()
    };
    assert!(backend.credentials().is_none());

    backend.password = Some(String::new());
    assert!(backend.credentials().is_none());

    backend.password = Some("secret".to_string());
    assert_eq!(backend.credentials(), Some(("user", "secret")));
}

#[test]
fn test_debug_redacts_passwords() {
    let config = Config {
        backend: BackendConfig {
            password: Some("backend-secret".to_string()),
            ..Default::default()
        },
        proxy: ProxyConfig {
            url: Some("http://proxy:8080".to_string()),
            username: Some("proxy-user".to_string()),
            password: Some("proxy-secret".to_string()),
        },
        search: SearchConfig::default(),
    };

    let debug_output = format!("{config:?}");
    assert!(!debug_output.contains("backend-secret"));
    assert!(!debug_output.contains("proxy-secret"));
    assert!(debug_output.contains("***REDACTED***"));
    assert!(debug_output.contains("proxy-user"));
}
