//! Search backend trait definition
//!
//! Implementations live in the backends crate; the orchestrator only ever
//! talks to this trait.

use crate::error::Result;
use crate::model::{SearchPage, SearchQuery};
use async_trait::async_trait;

/// A remote repository search service
///
/// Every operation returns one zero-based page. Asking for a page past the
/// end must yield an empty page rather than an error.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Name used in logs and error messages
    fn name(&self) -> &str;

    /// Free text search
    async fn search_by_keyword(&self, keyword: &str, page: u32) -> Result<SearchPage>;

    /// Search by SHA-1 checksum of an artifact file
    async fn search_by_sha1(&self, sha1: &str, page: u32) -> Result<SearchPage>;

    /// Search by group/artifact and optionally version
    async fn search_by_coordinates(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: Option<&str>,
        page: u32,
    ) -> Result<SearchPage>;

    /// Search for artifacts containing a class
    async fn search_by_class_name(
        &self,
        class_name: &str,
        fully_qualified: bool,
        page: u32,
    ) -> Result<SearchPage>;

    /// Whether `search_by_class_name` is served by this backend
    fn supports_class_search(&self) -> bool;
}

/// Run the backend operation matching `query` for one page
pub async fn dispatch(
    backend: &dyn SearchBackend,
    query: &SearchQuery,
    page: u32,
) -> Result<SearchPage> {
    match query {
        SearchQuery::Keyword { keyword } => backend.search_by_keyword(keyword, page).await,
        SearchQuery::Sha1 { sha1 } => backend.search_by_sha1(sha1, page).await,
        SearchQuery::Coordinates {
            group_id,
            artifact_id,
            version,
        } => {
            backend
                .search_by_coordinates(group_id, artifact_id, version.as_deref(), page)
                .await
        }
        SearchQuery::ClassName {
            class_name,
            fully_qualified,
        } => {
            backend
                .search_by_class_name(class_name, *fully_qualified, page)
                .await
        }
    }
}
