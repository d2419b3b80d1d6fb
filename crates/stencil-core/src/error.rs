//! Error types for template retrieval.

/// Result alias used throughout the retrieval pipeline.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors surfaced by reference parsing and template retrieval.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The reference does not name both an owner and a repository.
    #[error("invalid template reference '{0}': expected at least owner/repo")]
    InvalidReference(String),

    /// A single-file fetch returned HTTP 404.
    #[error("file not found: {url}")]
    NotFound {
        /// URL that answered 404.
        url: String,
    },

    /// Any other non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Status code returned by the server.
        status: u16,
        /// URL that produced the status.
        url: String,
    },

    /// A redirect status arrived without a `Location` header.
    #[error("redirect from {url} has no Location header")]
    MissingRedirectLocation {
        /// URL that answered with the redirect.
        url: String,
    },

    /// The redirect chain exceeded the hop bound.
    #[error("too many redirects (limit {limit}) starting from {url}")]
    TooManyRedirects {
        /// URL of the first request in the chain.
        url: String,
        /// Maximum number of redirects followed.
        limit: usize,
    },

    /// Decompression or tar-format failure, or an unsafe archive entry.
    #[error("archive extraction failed: {0}")]
    Extraction(String),

    /// Connection or body-streaming failure.
    #[error("network error for {url}: {message}")]
    Network {
        /// URL being fetched.
        url: String,
        /// Transport error message.
        message: String,
    },

    /// Local filesystem failure while writing the destination.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The primary clone collaborator failed.
    #[error("clone failed: {0}")]
    PrimaryMechanism(String),

    /// Both the primary clone and the archive fallback failed.
    #[error("clone failed: {primary}; archive fallback failed: {fallback}")]
    FallbackExhausted {
        /// Message of the primary failure.
        primary: String,
        /// Message of the fallback failure.
        fallback: String,
    },
}

impl FetchError {
    /// Build a [`FetchError::Network`] from any displayable transport error.
    pub fn network(url: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Network {
            url: url.into(),
            message: err.to_string(),
        }
    }

    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}
