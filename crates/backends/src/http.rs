//! HTTP plumbing shared by the repository backends

use mavensearch_core::config::{BackendConfig, ProxyConfig};
use mavensearch_core::error::{Error, Result, ResultExt};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Longest response body excerpt carried in an HTTP error
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Build the HTTP client for a backend, honouring timeout, user agent and proxy
pub(crate) fn build_client(
    backend_name: &str,
    backend: &BackendConfig,
    proxy: &ProxyConfig,
) -> Result<Client> {
    let mut builder = Client::builder()
        .timeout(backend.timeout())
        .user_agent(backend.user_agent.clone());

    if let Some(proxy_url) = proxy.url.as_deref().filter(|_| proxy.is_enabled()) {
        let mut reqwest_proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
            Error::config(format!("Invalid proxy URL '{proxy_url}': {e}"))
        })?;
        if let (Some(user), Some(pass)) = (proxy.username.as_deref(), proxy.password.as_deref()) {
            reqwest_proxy = reqwest_proxy.basic_auth(user, pass);
        }
        debug!("{backend_name}: routing requests through proxy {proxy_url}");
        builder = builder.proxy(reqwest_proxy);
    }

    builder
        .build()
        .context(format!("{backend_name}: failed to create HTTP client"))
}

/// Send a request and decode its JSON body
///
/// Transport failures and undecodable bodies become [`Error::Backend`];
/// non-success statuses become [`Error::Http`].
pub(crate) async fn get_json<T: DeserializeOwned>(
    backend_name: &str,
    request: RequestBuilder,
) -> Result<T> {
    let response = request.send().await.map_err(|e| {
        let error_kind = if e.is_timeout() {
            "timeout"
        } else if e.is_connect() {
            "connection"
        } else if e.is_request() {
            "request build"
        } else if e.is_body() {
            "body"
        } else {
            "unknown"
        };
        warn!("{backend_name} request failed ({error_kind}): {e}");
        Error::backend(backend_name, format!("request failed ({error_kind}): {e}"))
    })?;

    let status = response.status();
    let url = response.url().to_string();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        warn!("{backend_name} returned {status} for {url}");
        return Err(Error::http(status.as_u16(), url, truncate(&body)));
    }

    response.json::<T>().await.map_err(|e| {
        Error::backend(
            backend_name,
            format!("Failed to decode response from {url}: {e}"),
        )
    })
}

fn truncate(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
