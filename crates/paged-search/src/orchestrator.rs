//! Paginated, cancellable execution of one search request
//!
//! A [`SearchRun`] drives a single [`SearchRequest`] against a backend and
//! resolves to exactly one [`SearchOutcome`]. Paginated modes fetch pages
//! 0, 1, 2, ... until an empty page, the page cap, cancellation or an error.
//! Cancellation is sampled right before and right after every backend call,
//! so an in-flight call is never interrupted but its page is discarded.

use crate::progress::{paginated_progress, ProgressReporter, ProgressSink};
use mavensearch_core::{dispatch, Artifact, SearchBackend, SearchOutcome, SearchRequest};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Most pages a single run will fetch
pub const DEFAULT_MAX_PAGES: u32 = 50;

/// One execution of a search request
pub struct SearchRun {
    id: Uuid,
    request: SearchRequest,
    backend: Arc<dyn SearchBackend>,
    max_pages: u32,
}

impl SearchRun {
    pub fn new(request: SearchRequest, backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            backend,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Override the page cap (at least one page is always allowed)
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Execute the run to completion
    ///
    /// Consumes the run: a run cannot be restarted. The last event delivered
    /// to `progress` is always the single 100% event.
    pub async fn run(self, progress: &dyn ProgressSink, cancel: &CancellationToken) -> SearchOutcome {
        let span = info_span!(
            "search",
            run_id = %self.id,
            backend = self.backend.name(),
            mode = %self.request.mode()
        );
        async move {
            info!("Starting search for {}", self.request.query().describe());
            let mut reporter = ProgressReporter::new(progress);
            let outcome = self.execute(&mut reporter, cancel).await;
            let note = match &outcome {
                SearchOutcome::Completed(artifacts) => {
                    info!("Search completed with {} artifacts", artifacts.len());
                    "Search complete"
                }
                SearchOutcome::Cancelled => {
                    info!("Search cancelled");
                    "Search cancelled"
                }
                SearchOutcome::Failed(e) => {
                    warn!("Search failed: {e}");
                    "Search failed"
                }
            };
            reporter.finish(note);
            outcome
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        reporter: &mut ProgressReporter<'_>,
        cancel: &CancellationToken,
    ) -> SearchOutcome {
        if !self.request.mode().is_paginated() {
            return self
                .single_page(0, "Executing SHA-1 query".to_string(), reporter, cancel)
                .await;
        }
        match self.request.page() {
            Some(page) => {
                self.single_page(page, format!("Loading page {}", page + 1), reporter, cancel)
                    .await
            }
            None => self.paginate(reporter, cancel).await,
        }
    }

    async fn single_page(
        &self,
        page: u32,
        note: String,
        reporter: &mut ProgressReporter<'_>,
        cancel: &CancellationToken,
    ) -> SearchOutcome {
        reporter.report(5, "Preparing request");
        if cancel.is_cancelled() {
            return SearchOutcome::Cancelled;
        }

        reporter.report(25, note);
        let result = dispatch(self.backend.as_ref(), self.request.query(), page).await;
        if cancel.is_cancelled() {
            return SearchOutcome::Cancelled;
        }

        match result {
            Ok(page) => {
                reporter.report(90, "Processing results");
                SearchOutcome::Completed(page.artifacts)
            }
            Err(e) => SearchOutcome::Failed(e),
        }
    }

    async fn paginate(
        &self,
        reporter: &mut ProgressReporter<'_>,
        cancel: &CancellationToken,
    ) -> SearchOutcome {
        let mut artifacts: Vec<Artifact> = Vec::new();
        let mut page = 0u32;

        loop {
            if cancel.is_cancelled() {
                return SearchOutcome::Cancelled;
            }
            if page >= self.max_pages {
                info!("Reached page cap of {}", self.max_pages);
                break;
            }

            reporter.report(
                paginated_progress(page, self.max_pages),
                format!("Loading page {}", page + 1),
            );
            // Progress sinks may cancel while handling the report
            if cancel.is_cancelled() {
                return SearchOutcome::Cancelled;
            }
            let result = dispatch(self.backend.as_ref(), self.request.query(), page).await;
            if cancel.is_cancelled() {
                debug!("Discarding page {page} after cancellation");
                return SearchOutcome::Cancelled;
            }

            let batch = match result {
                Ok(batch) => batch,
                Err(e) => {
                    debug!("Page {page} failed, discarding {} artifacts", artifacts.len());
                    return SearchOutcome::Failed(e);
                }
            };
            if batch.is_empty() {
                debug!("Page {page} is empty, no more results");
                break;
            }

            debug!("Page {page} returned {} artifacts", batch.len());
            artifacts.extend(batch.artifacts);
            page += 1;
        }

        reporter.report(90, "Processing results");
        SearchOutcome::Completed(artifacts)
    }
}
