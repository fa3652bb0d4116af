//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;
use tracing::debug;

use super::defaults::*;
use super::{global_config_path, Config};

type Builder = LibConfigBuilder<config::builder::DefaultState>;

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: Builder,
    key: &str,
    value: T,
) -> Result<Builder> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

/// Helper to override a key from a plain environment variable, if present
fn override_from_env(builder: Builder, var: &str, key: &str) -> Result<Builder> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => builder
            .set_override(key, value)
            .map_err(|e| Error::config(format!("Failed to set {var}: {e}"))),
        _ => Ok(builder),
    }
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `MAVENSEARCH_` and use double
    /// underscores for nested values. For example:
    /// - `MAVENSEARCH_BACKEND__PROVIDER=nexus`
    /// - `MAVENSEARCH_SEARCH__MAX_PAGES=10`
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        let builder = set_config_default(builder, "backend.provider", default_provider())?;
        let builder = set_config_default(
            builder,
            "backend.timeout_secs",
            default_timeout_secs() as i64,
        )?;
        let builder =
            set_config_default(builder, "backend.page_size", default_page_size() as i64)?;
        let builder = set_config_default(builder, "backend.user_agent", default_user_agent())?;
        let mut builder =
            set_config_default(builder, "search.max_pages", default_max_pages() as i64)?;

        // Add the config file if it exists
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        // Add environment variables with MAVENSEARCH_ prefix
        builder = builder.add_source(
            Environment::with_prefix("MAVENSEARCH")
                .separator("__")
                .try_parsing(true),
        );

        // Conventional variables for repository managers and proxies
        builder = override_from_env(builder, "NEXUS_URL", "backend.url")?;
        builder = override_from_env(builder, "NEXUS_USERNAME", "backend.username")?;
        builder = override_from_env(builder, "NEXUS_PASSWORD", "backend.password")?;
        builder = override_from_env(builder, "HTTPS_PROXY", "proxy.url")?;

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.mavensearch/config.toml or custom --config path)
    /// 3. Environment variables (MAVENSEARCH_*, then NEXUS_* / HTTPS_PROXY)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        debug!("Loading configuration from {}", path.display());
        Self::from_file(&path)
    }
}
