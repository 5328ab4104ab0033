//! Error type for rendering output and talking to the Gist API.

use thiserror::Error;

pub type PublishResult<T> = Result<T, PublishError>;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("[Gist] GITHUB_TOKEN is not set")]
    MissingToken,

    #[error("[Gist] token contains characters not allowed in a header")]
    InvalidToken,

    /// URL whose last path segment is not a gist id.
    #[error("[Gist] cannot extract gist id from {0}")]
    InvalidGistUrl(String),

    #[error("[Gist] unauthorized (401): {0}")]
    Unauthorized(String),

    /// Token lacks the `gist` scope, or the gist belongs to someone else.
    #[error("[Gist] forbidden (403): {0}")]
    Forbidden(String),

    #[error("[Gist] not found (404): {0}")]
    NotFound(String),

    #[error("[Gist] rate limited (429)")]
    RateLimited,

    #[error("[Gist] unexpected status {status} (expected {expected}): {snippet}")]
    UnexpectedStatus {
        status: u16,
        expected: u16,
        snippet: String,
    },

    #[error("[Gist] timeout")]
    Timeout,

    #[error("[Gist] network error: {0}")]
    Network(String),

    #[error("[Gist] bad response JSON: {0}")]
    Serde(#[from] serde_json::Error),

    /// Gist URL cache could not be written.
    #[error("[Gist] url cache io: {0}")]
    Io(#[from] std::io::Error),
}

impl PublishError {
    /// Maps a non-expected HTTP status to a variant.
    pub(crate) fn from_status(status: u16, expected: u16, body: &str) -> Self {
        let snippet = make_snippet(body);
        match status {
            401 => Self::Unauthorized(snippet),
            403 => Self::Forbidden(snippet),
            404 => Self::NotFound(snippet),
            429 => Self::RateLimited,
            _ => Self::UnexpectedStatus {
                status,
                expected,
                snippet,
            },
        }
    }

    pub(crate) fn transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Trims a response body to a short single-line snippet for error messages.
fn make_snippet(body: &str) -> String {
    const MAX: usize = 200;
    let flat: String = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX {
        flat
    } else {
        let cut: String = flat.chars().take(MAX).collect();
        format!("{cut}…")
    }
}
