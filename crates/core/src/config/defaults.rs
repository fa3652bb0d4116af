//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_PROVIDER: &str = "central";
pub const DEFAULT_CENTRAL_SEARCH_URL: &str = "https://search.maven.org/solrsearch/select";
pub(crate) const DEFAULT_USER_AGENT: &str = concat!("mavensearch/", env!("CARGO_PKG_VERSION"));

/// Providers accepted in `backend.provider`
pub(crate) const VALID_PROVIDERS: [&str; 2] = ["central", "nexus"];

/// Upper bound for `backend.page_size`; repository search APIs cap rows per request
pub(crate) const MAX_PAGE_SIZE: u32 = 200;

pub(crate) fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

pub(crate) fn default_timeout_secs() -> u64 {
    30
}

pub(crate) fn default_page_size() -> u32 {
    20
}

pub(crate) fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

pub(crate) fn default_max_pages() -> u32 {
    50
}
