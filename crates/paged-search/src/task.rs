//! Running searches on background tasks
//!
//! [`spawn_search`] moves a [`SearchRun`] onto a tokio task and hands back a
//! [`SearchHandle`] carrying the progress channel, the cancellation token and
//! the eventual outcome. [`SearchSession`] sits on top and allows at most one
//! active search at a time, the way a search panel owns its current worker.

use crate::orchestrator::{SearchRun, DEFAULT_MAX_PAGES};
use mavensearch_core::config::SearchConfig;
use mavensearch_core::error::{Error, Result};
use mavensearch_core::{ProgressEvent, SearchBackend, SearchMode, SearchOutcome, SearchRequest};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// Handle to a search running on a background task
pub struct SearchHandle {
    run_id: Uuid,
    cancel: CancellationToken,
    progress: UnboundedReceiver<ProgressEvent>,
    task: JoinHandle<SearchOutcome>,
}

impl SearchHandle {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Request cancellation; the run stops at its next checkpoint
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn progress_mut(&mut self) -> &mut UnboundedReceiver<ProgressEvent> {
        &mut self.progress
    }

    /// Next progress event, or `None` once the run has finished reporting
    pub async fn next_progress(&mut self) -> Option<ProgressEvent> {
        self.progress.recv().await
    }

    /// Wait for the run to finish
    pub async fn outcome(self) -> SearchOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => SearchOutcome::Failed(Error::internal(format!(
                "search task {} did not complete: {e}",
                self.run_id
            ))),
        }
    }
}

/// Clears a session's active flag when the task ends, including on panic
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Run a search on a new tokio task
pub fn spawn_search(run: SearchRun) -> SearchHandle {
    spawn_run(run, None)
}

fn spawn_run(run: SearchRun, guard: Option<ActiveGuard>) -> SearchHandle {
    let run_id = run.id();
    let cancel = CancellationToken::new();
    let (tx, rx) = mpsc::unbounded_channel();

    let token = cancel.clone();
    let task = tokio::spawn(async move {
        let _guard = guard;
        run.run(&tx, &token).await
    });

    SearchHandle {
        run_id,
        cancel,
        progress: rx,
        task,
    }
}

/// Settings applied to every run started by a [`SearchSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub max_pages: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            max_pages: config.max_pages,
        }
    }
}

struct ActiveSearch {
    run_id: Uuid,
    cancel: CancellationToken,
    running: Arc<AtomicBool>,
}

/// Owner of the current search against one backend
pub struct SearchSession {
    backend: Arc<dyn SearchBackend>,
    settings: SearchSettings,
    current: Option<ActiveSearch>,
}

impl SearchSession {
    pub fn new(backend: Arc<dyn SearchBackend>, settings: SearchSettings) -> Self {
        Self {
            backend,
            settings,
            current: None,
        }
    }

    pub fn backend(&self) -> &Arc<dyn SearchBackend> {
        &self.backend
    }

    pub fn settings(&self) -> SearchSettings {
        self.settings
    }

    /// Validate `request` and start it on a background task
    ///
    /// Fails if the request is malformed, if the backend cannot serve its
    /// mode, or if the previous search is still running.
    pub fn start(&mut self, request: SearchRequest) -> Result<SearchHandle> {
        if self.is_running() {
            return Err(Error::SearchInProgress);
        }
        request.validate()?;
        if request.mode() == SearchMode::ClassName && !self.backend.supports_class_search() {
            return Err(Error::unsupported_search(format!(
                "{} does not support class name search",
                self.backend.name()
            )));
        }

        let run = SearchRun::new(request, Arc::clone(&self.backend))
            .with_max_pages(self.settings.max_pages);
        let running = Arc::new(AtomicBool::new(true));
        let handle = spawn_run(run, Some(ActiveGuard(Arc::clone(&running))));

        info!("Started search {}", handle.run_id());
        self.current = Some(ActiveSearch {
            run_id: handle.run_id(),
            cancel: handle.cancellation_token(),
            running,
        });
        Ok(handle)
    }

    /// Whether the most recently started search has not finished yet
    pub fn is_running(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|active| active.running.load(Ordering::Acquire))
    }

    /// Request cancellation of the running search; returns false if none is running
    pub fn cancel_current(&self) -> bool {
        match &self.current {
            Some(active) if active.running.load(Ordering::Acquire) => {
                debug!("Cancelling search {}", active.run_id);
                active.cancel.cancel();
                true
            }
            _ => false,
        }
    }
}
