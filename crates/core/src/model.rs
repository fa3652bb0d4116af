//! Search requests, artifacts and run outcomes
//!
//! These types form the contract between whoever issues a search (the CLI,
//! a UI) and the orchestrator that drives it against a backend.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Length of a hex-encoded SHA-1 digest
const SHA1_HEX_LEN: usize = 40;

/// Kind of search a request performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[strum(serialize = "keyword")]
    Keyword,
    #[strum(serialize = "sha1")]
    Sha1,
    #[strum(serialize = "coordinates")]
    Coordinates,
    #[strum(serialize = "class name")]
    ClassName,
}

impl SearchMode {
    /// Whether results for this mode are fetched page by page
    pub fn is_paginated(self) -> bool {
        !matches!(self, SearchMode::Sha1)
    }
}

/// Mode-specific search criteria
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SearchQuery {
    Keyword {
        keyword: String,
    },
    Sha1 {
        sha1: String,
    },
    Coordinates {
        group_id: String,
        artifact_id: String,
        version: Option<String>,
    },
    ClassName {
        class_name: String,
        fully_qualified: bool,
    },
}

impl SearchQuery {
    pub fn mode(&self) -> SearchMode {
        match self {
            SearchQuery::Keyword { .. } => SearchMode::Keyword,
            SearchQuery::Sha1 { .. } => SearchMode::Sha1,
            SearchQuery::Coordinates { .. } => SearchMode::Coordinates,
            SearchQuery::ClassName { .. } => SearchMode::ClassName,
        }
    }

    /// Short human readable description, used in logs and progress notes
    pub fn describe(&self) -> String {
        match self {
            SearchQuery::Keyword { keyword } => format!("keyword '{keyword}'"),
            SearchQuery::Sha1 { sha1 } => format!("sha1 {sha1}"),
            SearchQuery::Coordinates {
                group_id,
                artifact_id,
                version: Some(version),
            } => format!("{group_id}:{artifact_id}:{version}"),
            SearchQuery::Coordinates {
                group_id,
                artifact_id,
                version: None,
            } => format!("{group_id}:{artifact_id}"),
            SearchQuery::ClassName {
                class_name,
                fully_qualified: true,
            } => format!("class {class_name} (fully qualified)"),
            SearchQuery::ClassName { class_name, .. } => format!("class {class_name}"),
        }
    }
}

/// Immutable snapshot of one user-issued search
///
/// A request is built once per search invocation and never changes
/// afterwards; all fields are private and only readable through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchRequest {
    query: SearchQuery,
    page: Option<u32>,
}

impl SearchRequest {
    pub fn new(query: SearchQuery) -> Self {
        Self { query, page: None }
    }

    pub fn keyword(keyword: impl AsRef<str>) -> Self {
        Self::new(SearchQuery::Keyword {
            keyword: keyword.as_ref().trim().to_string(),
        })
    }

    pub fn sha1(sha1: impl AsRef<str>) -> Self {
        Self::new(SearchQuery::Sha1 {
            sha1: sha1.as_ref().trim().to_ascii_lowercase(),
        })
    }

    /// Coordinates search; a blank version is treated as "any version"
    pub fn coordinates(
        group_id: impl AsRef<str>,
        artifact_id: impl AsRef<str>,
        version: Option<&str>,
    ) -> Self {
        let version = version
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Self::new(SearchQuery::Coordinates {
            group_id: group_id.as_ref().trim().to_string(),
            artifact_id: artifact_id.as_ref().trim().to_string(),
            version,
        })
    }

    pub fn class_name(class_name: impl AsRef<str>, fully_qualified: bool) -> Self {
        Self::new(SearchQuery::ClassName {
            class_name: class_name.as_ref().trim().to_string(),
            fully_qualified,
        })
    }

    /// Restrict the request to a single explicit page
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn mode(&self) -> SearchMode {
        self.query.mode()
    }

    pub fn page(&self) -> Option<u32> {
        self.page
    }

    /// Check the fields required by the request's mode
    pub fn validate(&self) -> Result<()> {
        match &self.query {
            SearchQuery::Keyword { keyword } => require_non_blank("keyword", keyword),
            SearchQuery::Sha1 { sha1 } => {
                if sha1.len() != SHA1_HEX_LEN || !sha1.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(Error::invalid_input(format!(
                        "SHA-1 must be {SHA1_HEX_LEN} hexadecimal characters, got '{sha1}'"
                    )));
                }
                Ok(())
            }
            SearchQuery::Coordinates {
                group_id,
                artifact_id,
                ..
            } => {
                require_non_blank("group id", group_id)?;
                require_non_blank("artifact id", artifact_id)
            }
            SearchQuery::ClassName { class_name, .. } => {
                require_non_blank("class name", class_name)
            }
        }
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_input(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// One artifact record returned by a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_link: Option<String>,
}

impl Artifact {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            version_date: None,
            classifier: None,
            extension: None,
            repository: None,
            artifact_link: None,
        }
    }

    /// `group:artifact:version`
    pub fn coordinates(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// One page of results from a single backend call
///
/// An empty page is the backend's way of saying there is nothing more.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub artifacts: Vec<Artifact>,
}

impl SearchPage {
    pub fn new(artifacts: Vec<Artifact>) -> Self {
        Self { artifacts }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }
}

impl From<Vec<Artifact>> for SearchPage {
    fn from(artifacts: Vec<Artifact>) -> Self {
        Self::new(artifacts)
    }
}

/// Terminal result of one search run
#[derive(Debug)]
pub enum SearchOutcome {
    /// All pages were fetched (or the page cap was hit)
    Completed(Vec<Artifact>),
    /// The caller requested cancellation; nothing is returned
    Cancelled,
    /// A backend call failed; partial results are discarded
    Failed(Error),
}

impl SearchOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SearchOutcome::Completed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SearchOutcome::Cancelled)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SearchOutcome::Failed(_))
    }

    pub fn artifacts(&self) -> Option<&[Artifact]> {
        match self {
            SearchOutcome::Completed(artifacts) => Some(artifacts),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<Option<Vec<Artifact>>> {
        match self {
            SearchOutcome::Completed(artifacts) => Ok(Some(artifacts)),
            SearchOutcome::Cancelled => Ok(None),
            SearchOutcome::Failed(e) => Err(e),
        }
    }
}

/// Coarse progress notification emitted while a search runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub percent: u8,
    pub note: String,
}

impl ProgressEvent {
    pub fn new(percent: u8, note: impl Into<String>) -> Self {
        Self {
            percent: percent.min(100),
            note: note.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.percent == 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_mode_mapping() {
        assert_eq!(SearchRequest::keyword("guava").mode(), SearchMode::Keyword);
        assert_eq!(
            SearchRequest::sha1("a".repeat(40)).mode(),
            SearchMode::Sha1
        );
        assert_eq!(
            SearchRequest::coordinates("g", "a", None).mode(),
            SearchMode::Coordinates
        );
        assert_eq!(
            SearchRequest::class_name("Foo", false).mode(),
            SearchMode::ClassName
        );
        assert!(!SearchMode::Sha1.is_paginated());
        assert!(SearchMode::ClassName.is_paginated());
    }

    #[test]
    fn test_blank_version_becomes_none() {
        let request = SearchRequest::coordinates(" org.slf4j ", "slf4j-api", Some("  "));
        assert_eq!(
            request.query(),
            &SearchQuery::Coordinates {
                group_id: "org.slf4j".to_string(),
                artifact_id: "slf4j-api".to_string(),
                version: None,
            }
        );
    }

    #[test]
    fn test_sha1_is_normalized_and_validated() {
        let request = SearchRequest::sha1(" DA39A3EE5E6B4B0D3255BFEF95601890AFD80709 ");
        assert!(request.validate().is_ok());
        assert_eq!(
            request.query(),
            &SearchQuery::Sha1 {
                sha1: "da39a3ee5e6b4b0d3255bfef95601890afd80709".to_string()
            }
        );

        let err = SearchRequest::sha1("not-a-hash").validate().unwrap_err();
        assert!(err.to_string().contains("40 hexadecimal"));
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(SearchRequest::keyword("   ").validate().is_err());
        assert!(SearchRequest::coordinates("", "a", None).validate().is_err());
        assert!(SearchRequest::coordinates("g", " ", None).validate().is_err());
        assert!(SearchRequest::class_name("", true).validate().is_err());
        assert!(SearchRequest::class_name("Lists", false).validate().is_ok());
    }

    #[test]
    fn test_with_page() {
        let request = SearchRequest::keyword("junit").with_page(3);
        assert_eq!(request.page(), Some(3));
        assert_eq!(SearchRequest::keyword("junit").page(), None);
    }

    #[test]
    fn test_outcome_into_result() {
        let completed = SearchOutcome::Completed(vec![Artifact::new("g", "a", "1")]);
        assert_eq!(completed.into_result().unwrap().unwrap().len(), 1);
        assert!(SearchOutcome::Cancelled.into_result().unwrap().is_none());
        assert!(SearchOutcome::Failed(Error::internal("boom"))
            .into_result()
            .is_err());
    }

    #[test]
    fn test_progress_event_clamps_percent() {
        assert_eq!(ProgressEvent::new(250, "x").percent, 100);
        assert!(ProgressEvent::new(100, "done").is_terminal());
    }
}
