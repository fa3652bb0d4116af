//! Library interface for the mavensearch CLI
//!
//! Rendering and local-file helpers live here so they can be tested without
//! spawning the binary.

pub mod checksum;
pub mod output;

pub use anyhow::Result;
pub use checksum::sha1_file;
pub use output::{render_json, render_snippets, render_table, OutputFormat};
