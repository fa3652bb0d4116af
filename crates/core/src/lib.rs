//! Core types and traits for mavensearch
//!
//! This crate provides the foundational abstractions shared by the backends,
//! the search orchestrator and the CLI:
//!
//! - **Model**: search requests, artifacts, pages, outcomes and progress events
//! - **Backend**: the trait every repository search service implements
//! - **Snippets**: dependency declarations for common build tools
//! - **Configuration**: system configuration management
//! - **Error handling**: unified error types
//!

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod backend;
pub mod config;
pub mod error;
pub mod model;
pub mod snippets;

// Re-export main types for convenience
pub use backend::{dispatch, SearchBackend};
pub use config::{BackendConfig, Config, ProxyConfig, SearchConfig};
pub use error::{Error, Result, ResultExt};
pub use model::{
    Artifact, ProgressEvent, SearchMode, SearchOutcome, SearchPage, SearchQuery, SearchRequest,
};
pub use snippets::{snippet, BuildTool};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::SearchBackend;
    pub use crate::config::Config;
    pub use crate::error::{Result, ResultExt};
    pub use crate::model::{Artifact, SearchOutcome, SearchPage, SearchRequest};
}
