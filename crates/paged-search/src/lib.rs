//! Paginated, cancellable search orchestration
//!
//! - [`SearchRun`]: executes one request against a backend page by page
//! - [`ProgressSink`]: where progress events go
//! - [`spawn_search`] / [`SearchSession`]: background execution with
//!   cancellation and single-active-search arbitration

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod cancel;
mod orchestrator;
mod progress;
mod task;

pub use cancel::cancel_after;
pub use orchestrator::{SearchRun, DEFAULT_MAX_PAGES};
pub use progress::{paginated_progress, FnSink, NoopProgress, ProgressSink};
pub use task::{spawn_search, SearchHandle, SearchSession, SearchSettings};
pub use tokio_util::sync::CancellationToken;
