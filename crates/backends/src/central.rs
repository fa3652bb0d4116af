//! Maven Central search backend
//!
//! Talks to the Solr-style `solrsearch/select` endpoint of search.maven.org.
//! Pages are mapped onto `start`/`rows`; asking past the last hit returns no
//! docs, which is exactly the empty-page contract of [`SearchBackend`]. When
//! every doc of a block is unusable but `numFound` says more follow, the next
//! block is read into the same page and later pages of that query start
//! from the shifted offset.

use crate::http::{build_client, get_json};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mavensearch_core::config::{BackendConfig, ProxyConfig, DEFAULT_CENTRAL_SEARCH_URL};
use mavensearch_core::error::Result;
use mavensearch_core::model::{Artifact, SearchPage};
use mavensearch_core::SearchBackend;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

const BACKEND_NAME: &str = "maven-central";

/// Base URL artifact download links are built from
const CENTRAL_REPOSITORY_URL: &str = "https://repo1.maven.org/maven2";

/// Shifted page offsets remembered before the map is reset
const MAX_SHIFTED_PAGES: usize = 256;

/// Solr response envelope
#[derive(Debug, Deserialize)]
struct SolrResponse {
    response: SolrResult,
}

#[derive(Debug, Deserialize)]
struct SolrResult {
    #[serde(rename = "numFound", default)]
    num_found: u64,
    #[serde(default)]
    docs: Vec<SolrDoc>,
}

/// One document; the `gav` core fills `v`, the default core `latestVersion`
#[derive(Debug, Deserialize)]
struct SolrDoc {
    g: String,
    a: String,
    #[serde(default)]
    v: Option<String>,
    #[serde(rename = "latestVersion", default)]
    latest_version: Option<String>,
    #[serde(default)]
    p: Option<String>,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(rename = "repositoryId", default)]
    repository_id: Option<String>,
}

/// Solr query for one search plus the core it runs against
#[derive(Debug, Clone, PartialEq, Eq)]
struct CentralQuery {
    q: String,
    gav_core: bool,
}

impl CentralQuery {
    fn keyword(keyword: &str) -> Self {
        Self {
            q: keyword.to_string(),
            gav_core: false,
        }
    }

    fn sha1(sha1: &str) -> Self {
        Self {
            q: format!("1:{}", quote(sha1)),
            gav_core: false,
        }
    }

    fn coordinates(group_id: &str, artifact_id: &str, version: Option<&str>) -> Self {
        let mut q = format!("g:{} AND a:{}", quote(group_id), quote(artifact_id));
        if let Some(version) = version {
            q.push_str(&format!(" AND v:{}", quote(version)));
        }
        Self { q, gav_core: true }
    }

    fn class_name(class_name: &str, fully_qualified: bool) -> Self {
        let field = if fully_qualified { "fc" } else { "c" };
        Self {
            q: format!("{field}:{}", quote(class_name)),
            gav_core: true,
        }
    }

    fn cache_key(&self) -> String {
        let core = if self.gav_core { "gav" } else { "default" };
        format!("{core}:{}", self.q)
    }
}

/// Wrap a value in double quotes, dropping any quotes inside it
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', ""))
}

/// File extension for a Maven packaging type
fn packaging_extension(packaging: &str) -> &str {
    match packaging {
        "bundle" | "maven-plugin" | "ejb" | "eclipse-plugin" | "hk2-jar" => "jar",
        other => other,
    }
}

fn into_artifact(doc: SolrDoc) -> Option<Artifact> {
    let version = doc.v.or(doc.latest_version)?;
    let extension = doc
        .p
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(|p| packaging_extension(p).to_string());
    let version_date = doc
        .timestamp
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.date_naive());
    let artifact_link = extension.as_deref().map(|ext| {
        format!(
            "{CENTRAL_REPOSITORY_URL}/{}/{}/{version}/{}-{version}.{ext}",
            doc.g.replace('.', "/"),
            doc.a,
            doc.a
        )
    });

    Some(Artifact {
        group_id: doc.g,
        artifact_id: doc.a,
        version,
        version_date,
        classifier: None,
        extension,
        repository: doc.repository_id,
        artifact_link,
    })
}

fn into_page(result: SolrResult) -> SearchPage {
    let total = result.docs.len();
    let artifacts: Vec<Artifact> = result.docs.into_iter().filter_map(into_artifact).collect();
    if artifacts.len() < total {
        warn!(
            "{BACKEND_NAME}: dropped {} docs without a version",
            total - artifacts.len()
        );
    }
    SearchPage::new(artifacts)
}

/// Start offsets of pages that no longer begin at `page * rows`
#[derive(Debug, Default)]
struct ShiftedOffsets {
    entries: Mutex<HashMap<(String, u32), u64>>,
}

impl ShiftedOffsets {
    fn lock(&self) -> MutexGuard<'_, HashMap<(String, u32), u64>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get(&self, key: &str, page: u32) -> Option<u64> {
        self.lock().get(&(key.to_string(), page)).copied()
    }

    fn record(&self, key: &str, page: u32, start: u64) {
        let mut entries = self.lock();
        if entries.len() >= MAX_SHIFTED_PAGES {
            entries.clear();
        }
        entries.insert((key.to_string(), page), start);
    }
}

/// Maven Central search backend
pub struct MavenCentralBackend {
    client: Client,
    search_url: String,
    page_size: u32,
    shifted: ShiftedOffsets,
}

impl MavenCentralBackend {
    /// Create a new Maven Central backend
    ///
    /// `backend.url` overrides the search endpoint, which is useful for
    /// mirrors exposing the same API.
    pub fn new(backend: &BackendConfig, proxy: &ProxyConfig) -> Result<Self> {
        let search_url = backend
            .url
            .clone()
            .unwrap_or_else(|| DEFAULT_CENTRAL_SEARCH_URL.to_string());

        info!("Initializing Maven Central backend");
        info!("  Endpoint: {search_url}");
        info!("  Page size: {}", backend.page_size);

        Ok(Self {
            client: build_client(BACKEND_NAME, backend, proxy)?,
            search_url,
            page_size: backend.page_size,
            shifted: ShiftedOffsets::default(),
        })
    }

    async fn fetch(&self, query: &CentralQuery, start: u64) -> Result<SolrResult> {
        let mut params = vec![
            ("q", query.q.clone()),
            ("rows", self.page_size.to_string()),
            ("start", start.to_string()),
            ("wt", "json".to_string()),
        ];
        if query.gav_core {
            params.push(("core", "gav".to_string()));
        }

        let request = self.client.get(&self.search_url).query(&params);
        let response: SolrResponse = get_json(BACKEND_NAME, request).await?;
        Ok(response.response)
    }

    async fn select(&self, query: CentralQuery, page: u32) -> Result<SearchPage> {
        let regular_start = u64::from(page) * u64::from(self.page_size);
        let key = query.cache_key();
        let mut start = self.shifted.get(&key, page).unwrap_or(regular_start);

        loop {
            let result = self.fetch(&query, start).await?;
            let fetched = result.docs.len() as u64;
            let num_found = result.num_found;
            debug!(
                "{BACKEND_NAME}: page {page} at offset {start} returned {fetched} of {num_found} docs"
            );

            let artifacts = into_page(result);
            if artifacts.is_empty() && fetched > 0 && start + fetched < num_found {
                debug!("{BACKEND_NAME}: no usable docs at offset {start}, reading on");
                start += fetched;
                continue;
            }
            if start != regular_start {
                self.shifted.record(&key, page.saturating_add(1), start + fetched);
            }
            return Ok(artifacts);
        }
    }
}

#[async_trait]
impl SearchBackend for MavenCentralBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn search_by_keyword(&self, keyword: &str, page: u32) -> Result<SearchPage> {
        self.select(CentralQuery::keyword(keyword), page).await
    }

    async fn search_by_sha1(&self, sha1: &str, page: u32) -> Result<SearchPage> {
        self.select(CentralQuery::sha1(sha1), page).await
    }

    async fn search_by_coordinates(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: Option<&str>,
        page: u32,
    ) -> Result<SearchPage> {
        self.select(
            CentralQuery::coordinates(group_id, artifact_id, version),
            page,
        )
        .await
    }

    async fn search_by_class_name(
        &self,
        class_name: &str,
        fully_qualified: bool,
        page: u32,
    ) -> Result<SearchPage> {
        self.select(CentralQuery::class_name(class_name, fully_qualified), page)
            .await
    }

    fn supports_class_search(&self) -> bool {
        true
    }
}
