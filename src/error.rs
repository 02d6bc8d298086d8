//! Error types for the Crossref client.

/// Errors that can occur when interacting with the Crossref API.
///
/// The variants fall into three groups: caller mistakes ([`EmptyQuery`]),
/// an upstream answer of "no match" ([`ZeroWorks`]), and transport or
/// decoding failures (everything else).
///
/// [`EmptyQuery`]: CrossrefError::EmptyQuery
/// [`ZeroWorks`]: CrossrefError::ZeroWorks
#[derive(Debug, thiserror::Error)]
pub enum CrossrefError {
    /// An empty DOI or search phrase was passed in. No request was sent.
    #[error("empty query requested")]
    EmptyQuery,

    /// Crossref was reached but reported no matching works.
    #[error("no works were found")]
    ZeroWorks,

    /// HTTP request failed (network, timeout, etc.)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Crossref returned an unexpected status code.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to parse API response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CrossrefError {
    /// True when the caller passed an empty DOI or search phrase.
    pub fn is_empty_query(&self) -> bool {
        matches!(self, Self::EmptyQuery)
    }

    /// True when Crossref answered but had nothing matching.
    pub fn is_zero_works(&self) -> bool {
        matches!(self, Self::ZeroWorks)
    }
}

/// Convenience alias for Results using [`CrossrefError`].
pub type Result<T> = std::result::Result<T, CrossrefError>;
