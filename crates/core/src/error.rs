use thiserror::Error;

/// Result type for mavensearch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mavensearch operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failure inside a search backend (transport, protocol, decoding)
    #[error("{backend} backend error: {message}")]
    Backend { backend: String, message: String },

    /// Non-success HTTP status returned by a repository
    #[error("HTTP {status} from {url}: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    /// The selected backend cannot serve this kind of search
    #[error("Unsupported search: {0}")]
    UnsupportedSearch(String),

    /// A search is already running for this session
    #[error("A search is already in progress")]
    SearchInProgress,

    /// Invariant violations and worker failures
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates a backend error
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Creates an HTTP status error
    pub fn http(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    /// Creates an unsupported search error
    pub fn unsupported_search(msg: impl Into<String>) -> Self {
        Self::UnsupportedSearch(msg.into())
    }

    /// Creates an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Adds context to any error
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::with_context(context, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_context_wraps_source() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = io.context("Reading settings").unwrap_err();

        assert_eq!(err.to_string(), "Reading settings: missing");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_http_display() {
        let err = Error::http(404, "https://repo.example.com/search", "not found");
        assert_eq!(
            err.to_string(),
            "HTTP 404 from https://repo.example.com/search: not found"
        );
    }
}
