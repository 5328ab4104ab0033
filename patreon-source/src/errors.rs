//! Error type for the Patreon question source.

use thiserror::Error;

pub type SourceResult<T> = Result<T, SourceFetchError>;

/// Question source unreachable or returning unusable data.
#[derive(Debug, Error)]
pub enum SourceFetchError {
    /// Post URL without a usable trailing post id.
    #[error("invalid post url: {0}")]
    InvalidPostUrl(String),

    /// Cookie contains characters that cannot go into an HTTP header.
    #[error("invalid PATREON_COOKIE header value")]
    InvalidCookie,

    /// Non-success HTTP status (401/403 usually mean a stale cookie).
    #[error("HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        status: u16,
        url: String,
        snippet: String,
    },

    #[error("timeout fetching {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),

    /// Page body was not the expected JSON:API document.
    #[error("unexpected JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Page cache directory could not be created.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceFetchError {
    pub(crate) fn transport(e: reqwest::Error, url: &str) -> Self {
        if e.is_timeout() {
            return Self::Timeout(url.to_string());
        }
        if let Some(status) = e.status() {
            return Self::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
                snippet: String::new(),
            };
        }
        Self::Network(e.to_string())
    }
}
