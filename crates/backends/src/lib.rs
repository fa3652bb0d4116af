//! Repository search backends
//!
//! Implementations of [`SearchBackend`] for the repository services mavensearch
//! can query, plus a factory selecting one from configuration.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use mavensearch_core::config::Config;
use mavensearch_core::error::{Error, Result};
use mavensearch_core::SearchBackend;
use std::sync::Arc;
use tracing::info;

mod central;
mod http;
mod nexus;

pub use central::MavenCentralBackend;
pub use nexus::NexusBackend;

/// Create the search backend selected by `backend.provider`
///
/// # Arguments
/// * `config` - Full configuration; the backend and proxy sections are used
pub fn create_search_backend(config: &Config) -> Result<Arc<dyn SearchBackend>> {
    match config.backend.provider.as_str() {
        "central" => {
            info!("Creating Maven Central search backend");
            let backend = MavenCentralBackend::new(&config.backend, &config.proxy)?;
            Ok(Arc::new(backend))
        }
        "nexus" => {
            info!("Creating Nexus search backend");
            let backend = NexusBackend::new(&config.backend, &config.proxy)?;
            Ok(Arc::new(backend))
        }
        other => Err(Error::config(format!(
            "Unknown backend provider: '{other}'. Valid providers: central, nexus"
        ))),
    }
}
