//! Sonatype Nexus Repository 3 search backend
//!
//! Nexus pages with opaque continuation tokens instead of offsets, so page
//! numbers are translated through a per-query cursor cache: page `n + 1` can
//! only be fetched with the token returned by page `n`. A server page with no
//! usable component is folded into the page after it, so an empty page is
//! only ever returned once the tokens run out.

use crate::http::{build_client, get_json};
use async_trait::async_trait;
use chrono::DateTime;
use mavensearch_core::config::{BackendConfig, ProxyConfig};
use mavensearch_core::error::{Error, Result};
use mavensearch_core::model::{Artifact, SearchPage};
use mavensearch_core::SearchBackend;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

const BACKEND_NAME: &str = "nexus";
const SEARCH_PATH: &str = "/service/rest/v1/search";

/// Queries remembered before the cursor cache is reset
const MAX_CACHED_QUERIES: usize = 64;

/// Extension suffixes of checksum and signature assets
const CHECKSUM_SUFFIXES: [&str; 5] = ["sha1", "md5", "sha256", "sha512", "asc"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComponentList {
    #[serde(default)]
    items: Vec<Component>,
    #[serde(default)]
    continuation_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Component {
    #[serde(default)]
    repository: Option<String>,
    group: Option<String>,
    name: String,
    version: Option<String>,
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Asset {
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    last_modified: Option<String>,
    #[serde(default)]
    maven2: Option<MavenAttributes>,
}

#[derive(Debug, Default, Deserialize)]
struct MavenAttributes {
    #[serde(default)]
    extension: Option<String>,
    #[serde(default)]
    classifier: Option<String>,
}

impl Asset {
    fn extension(&self) -> Option<&str> {
        self.maven2.as_ref()?.extension.as_deref()
    }

    fn classifier(&self) -> Option<&str> {
        self.maven2
            .as_ref()?
            .classifier
            .as_deref()
            .filter(|c| !c.is_empty())
    }

    fn is_checksum_or_signature(&self) -> bool {
        matches!(
            self.extension(),
            Some(ext) if CHECKSUM_SUFFIXES.iter().any(|s| ext.ends_with(s))
        )
    }

    fn is_pom(&self) -> bool {
        self.extension() == Some("pom")
    }
}

/// Pick the asset that best represents a component
///
/// Prefers the main (unclassified) binary, then any classified binary, and
/// falls back to the POM for pom-packaged components.
fn primary_asset(assets: &[Asset]) -> Option<&Asset> {
    let candidates = || assets.iter().filter(|a| !a.is_checksum_or_signature());
    candidates()
        .find(|a| !a.is_pom() && a.classifier().is_none())
        .or_else(|| candidates().find(|a| !a.is_pom()))
        .or_else(|| candidates().next())
}

fn into_artifact(component: Component) -> Option<Artifact> {
    let group_id = component.group?;
    let version = component.version?;
    let mut artifact = Artifact::new(group_id, component.name, version);
    artifact.repository = component.repository;

    if let Some(asset) = primary_asset(&component.assets) {
        artifact.extension = asset.extension().map(str::to_string);
        artifact.classifier = asset.classifier().map(str::to_string);
        artifact.artifact_link = asset.download_url.clone();
        artifact.version_date = asset
            .last_modified
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.date_naive());
    }
    Some(artifact)
}

/// Where a page of a query starts
#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    Start,
    Token(String),
    Exhausted,
}

/// Continuation tokens per query, indexed by page number
#[derive(Debug, Default)]
struct CursorCache {
    entries: Mutex<HashMap<String, Vec<Cursor>>>,
}

impl CursorCache {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Cursor>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Closest known cursor at or before `page`
    fn nearest(&self, key: &str, page: u32) -> (u32, Cursor) {
        let entries = self.lock();
        match entries.get(key) {
            Some(cursors) if !cursors.is_empty() => {
                let last = cursors.len() - 1;
                let index = (page as usize).min(last);
                (index as u32, cursors[index].clone())
            }
            _ => (0, Cursor::Start),
        }
    }

    /// Remember the cursor that follows `page`
    fn record(&self, key: &str, page: u32, next: Cursor) {
        let mut entries = self.lock();
        if !entries.contains_key(key) && entries.len() >= MAX_CACHED_QUERIES {
            entries.clear();
        }
        let cursors = entries
            .entry(key.to_string())
            .or_insert_with(|| vec![Cursor::Start]);
        let slot = page as usize + 1;
        if slot < cursors.len() {
            cursors[slot] = next;
        } else if slot == cursors.len() {
            cursors.push(next);
        }
    }
}

fn cache_key(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Nexus Repository 3 search backend
pub struct NexusBackend {
    client: Client,
    search_url: String,
    credentials: Option<(String, String)>,
    cursors: CursorCache,
}

impl NexusBackend {
    /// Create a new Nexus backend; `backend.url` is the server base URL
    pub fn new(backend: &BackendConfig, proxy: &ProxyConfig) -> Result<Self> {
        let base_url = backend
            .url
            .as_deref()
            .ok_or_else(|| Error::config("Nexus backend requires backend.url"))?;
        let search_url = format!("{}{SEARCH_PATH}", base_url.trim_end_matches('/'));
        let credentials = backend
            .credentials()
            .map(|(u, p)| (u.to_string(), p.to_string()));

        info!("Initializing Nexus backend");
        info!("  Endpoint: {search_url}");
        info!(
            "  Authentication: {}",
            if credentials.is_some() { "basic" } else { "none" }
        );

        Ok(Self {
            client: build_client(BACKEND_NAME, backend, proxy)?,
            search_url,
            credentials,
            cursors: CursorCache::default(),
        })
    }

    async fn request(
        &self,
        params: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<ComponentList> {
        let mut request = self
            .client
            .get(&self.search_url)
            .query(&[("format", "maven2")])
            .query(params);
        if let Some(token) = token {
            request = request.query(&[("continuationToken", token)]);
        }
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password));
        }
        get_json(BACKEND_NAME, request).await
    }

    async fn search(&self, params: Vec<(&str, String)>, page: u32) -> Result<SearchPage> {
        let key = cache_key(&params);
        let (mut index, mut cursor) = self.cursors.nearest(&key, page);
        if index < page {
            debug!("{BACKEND_NAME}: walking from page {index} to reach page {page}");
        }

        loop {
            let token = match &cursor {
                Cursor::Exhausted => return Ok(SearchPage::empty()),
                Cursor::Start => None,
                Cursor::Token(token) => Some(token.as_str()),
            };
            let response = self.request(&params, token).await?;
            let next = match response.continuation_token.filter(|t| !t.is_empty()) {
                Some(next) if token != Some(next.as_str()) => Cursor::Token(next),
                _ => Cursor::Exhausted,
            };

            // A page with nothing usable would read as the end of results
            let fetched = response.items.len();
            let artifacts: Vec<Artifact> =
                response.items.into_iter().filter_map(into_artifact).collect();
            if artifacts.is_empty() && matches!(next, Cursor::Token(_)) {
                debug!(
                    "{BACKEND_NAME}: none of {fetched} components usable on page {index}, continuing"
                );
                cursor = next;
                continue;
            }
            self.cursors.record(&key, index, next.clone());

            if index == page {
                debug!(
                    "{BACKEND_NAME}: page {page} returned {} components",
                    artifacts.len()
                );
                return Ok(SearchPage::new(artifacts));
            }
            index += 1;
            cursor = next;
        }
    }
}

#[async_trait]
impl SearchBackend for NexusBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn search_by_keyword(&self, keyword: &str, page: u32) -> Result<SearchPage> {
        self.search(vec![("q", keyword.to_string())], page).await
    }

    async fn search_by_sha1(&self, sha1: &str, page: u32) -> Result<SearchPage> {
        self.search(vec![("sha1", sha1.to_string())], page).await
    }

    async fn search_by_coordinates(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: Option<&str>,
        page: u32,
    ) -> Result<SearchPage> {
        let mut params = vec![
            ("group", group_id.to_string()),
            ("name", artifact_id.to_string()),
        ];
        if let Some(version) = version {
            params.push(("version", version.to_string()));
        }
        self.search(params, page).await
    }

    async fn search_by_class_name(
        &self,
        _class_name: &str,
        _fully_qualified: bool,
        _page: u32,
    ) -> Result<SearchPage> {
        Err(Error::unsupported_search(
            "Nexus does not index class names",
        ))
    }

    fn supports_class_search(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const COMPONENT_JSON: &str = r#"{
        "id": "bWF2ZW4tY2VudHJhbDo",
        "repository": "maven-central",
        "format": "maven2",
        "group": "org.slf4j",
        "name": "slf4j-api",
        "version": "2.0.9",
        "assets": [
            {"downloadUrl": "https://nexus.example.com/repository/maven-central/org/slf4j/slf4j-api/2.0.9/slf4j-api-2.0.9.pom",
             "lastModified": "2023-09-01T10:00:00.000+00:00",
             "maven2": {"extension": "pom"}},
            {"downloadUrl": "https://nexus.example.com/repository/maven-central/org/slf4j/slf4j-api/2.0.9/slf4j-api-2.0.9-sources.jar",
             "maven2": {"extension": "jar", "classifier": "sources"}},
            {"downloadUrl": "https://nexus.example.com/repository/maven-central/org/slf4j/slf4j-api/2.0.9/slf4j-api-2.0.9.jar.sha1",
             "maven2": {"extension": "jar.sha1"}},
            {"downloadUrl": "https://nexus.example.com/repository/maven-central/org/slf4j/slf4j-api/2.0.9/slf4j-api-2.0.9.jar",
             "lastModified": "2023-09-02T08:30:00.000+00:00",
             "maven2": {"extension": "jar"}}
        ]
    }"#;

    #[test]
    fn test_component_maps_to_main_jar() {
        let component: Component = serde_json::from_str(COMPONENT_JSON).unwrap();
        let artifact = into_artifact(component).unwrap();

        assert_eq!(artifact.coordinates(), "org.slf4j:slf4j-api:2.0.9");
        assert_eq!(artifact.extension.as_deref(), Some("jar"));
        assert_eq!(artifact.classifier, None);
        assert_eq!(artifact.repository.as_deref(), Some("maven-central"));
        assert_eq!(artifact.version_date, NaiveDate::from_ymd_opt(2023, 9, 2));
        assert!(artifact
            .artifact_link
            .as_deref()
            .unwrap()
            .ends_with("slf4j-api-2.0.9.jar"));
    }

    #[test]
    fn test_pom_only_component_falls_back_to_pom() {
        let json = r#"{"group": "org.example", "name": "parent", "version": "1",
            "assets": [{"maven2": {"extension": "pom"}}, {"maven2": {"extension": "pom.md5"}}]}"#;
        let component: Component = serde_json::from_str(json).unwrap();
        let artifact = into_artifact(component).unwrap();
        assert_eq!(artifact.extension.as_deref(), Some("pom"));
    }

    #[test]
    fn test_component_without_group_is_skipped() {
        let json = r#"{"name": "raw-thing", "version": "1", "assets": []}"#;
        let component: Component = serde_json::from_str(json).unwrap();
        assert!(into_artifact(component).is_none());
    }

    #[test]
    fn test_cursor_cache_tracks_pages() {
        let cache = CursorCache::default();
        assert_eq!(cache.nearest("q=junit", 3), (0, Cursor::Start));

        cache.record("q=junit", 0, Cursor::Token("t1".to_string()));
        cache.record("q=junit", 1, Cursor::Exhausted);
        assert_eq!(
            cache.nearest("q=junit", 1),
            (1, Cursor::Token("t1".to_string()))
        );
        assert_eq!(cache.nearest("q=junit", 5), (2, Cursor::Exhausted));
        assert_eq!(cache.nearest("q=other", 1), (0, Cursor::Start));
    }

    #[test]
    fn test_cursor_cache_resets_when_full() {
        let cache = CursorCache::default();
        for i in 0..MAX_CACHED_QUERIES {
            cache.record(&format!("q={i}"), 0, Cursor::Exhausted);
        }
        cache.record("q=overflow", 0, Cursor::Exhausted);
        assert_eq!(cache.lock().len(), 1);
        assert_eq!(cache.nearest("q=0", 1), (0, Cursor::Start));
    }

    #[test]
    fn test_new_requires_url() {
        let result = NexusBackend::new(&BackendConfig::default(), &ProxyConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
