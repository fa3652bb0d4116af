//! Configuration module for mavensearch
//!
//! This module provides configuration structures and loading mechanisms. The
//! configuration can be loaded from TOML files and/or environment variables.

mod defaults;
mod loading;

#[cfg(test)]
mod tests;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use defaults::DEFAULT_CENTRAL_SEARCH_URL;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.mavensearch/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".mavensearch").join("config.toml"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Repository backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Outbound HTTP proxy
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Search run configuration
    #[serde(default)]
    pub search: SearchConfig,
}

/// Configuration for the repository backend
///
/// # Providers
/// - `central` (default): Maven Central search API, no credentials needed
/// - `nexus`: Sonatype Nexus Repository 3 REST search, requires `url`
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Provider type: "central" (default) or "nexus"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Base URL; required for nexus, optional override of the Central endpoint
    #[serde(default)]
    pub url: Option<String>,

    /// Username for repositories that require authentication
    #[serde(default)]
    pub username: Option<String>,

    /// Password for repositories that require authentication
    #[serde(default)]
    pub password: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of artifacts requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            url: None,
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            user_agent: default_user_agent(),
        }
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("provider", &self.provider)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***REDACTED***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("page_size", &self.page_size)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Username and password, when both are configured and non-empty
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        let password = self.password.as_deref().filter(|p| !p.is_empty())?;
        Some((username, password))
    }
}

/// Configuration for an outbound HTTP proxy
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy URL, e.g. `http://proxy.internal:3128`
    #[serde(default)]
    pub url: Option<String>,

    /// Proxy username
    #[serde(default)]
    pub username: Option<String>,

    /// Proxy password
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***REDACTED***"))
            .finish()
    }
}

impl ProxyConfig {
    pub fn is_enabled(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

/// Configuration for search runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of pages fetched by one paginated search
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Cancel a search that has not finished after this many seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            timeout_secs: None,
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn validate_http_url(field: &str, url: &str) -> Result<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::config(format!(
            "{field} must be an http:// or https:// URL, got '{url}'"
        )));
    }
    Ok(())
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if !VALID_PROVIDERS.contains(&self.backend.provider.as_str()) {
            return Err(Error::config(format!(
                "Invalid backend provider '{}'. Must be one of: {:?}",
                self.backend.provider, VALID_PROVIDERS
            )));
        }

        match self.backend.url.as_deref() {
            Some(url) => validate_http_url("backend.url", url)?,
            None if self.backend.provider == "nexus" => {
                return Err(Error::config(
                    "backend.url is required for the nexus provider".to_string(),
                ));
            }
            None => {}
        }

        if self.backend.page_size == 0 || self.backend.page_size > MAX_PAGE_SIZE {
            return Err(Error::config(format!(
                "backend.page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.backend.page_size
            )));
        }

        if self.backend.timeout_secs == 0 {
            return Err(Error::config(
                "backend.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(url) = self.proxy.url.as_deref() {
            validate_http_url("proxy.url", url)?;
        }

        if self.search.max_pages == 0 {
            return Err(Error::config(
                "search.max_pages must be greater than 0".to_string(),
            ));
        }

        if self.search.timeout_secs == Some(0) {
            return Err(Error::config(
                "search.timeout_secs must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}
