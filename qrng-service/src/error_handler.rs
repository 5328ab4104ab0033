//! Unified error handling for `qrng-service`.
//!
//! A single [`ProviderError`] covers configuration, transport, HTTP status and
//! payload problems. All messages carry the `[QRNG]` prefix to simplify
//! attribution in logs.
//!
//! There is deliberately no variant that means "fell back to pseudo-random":
//! a failed quantum draw is always surfaced to the caller.

use std::time::Duration;

use thiserror::Error;

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Top-level error for the `qrng-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Quantum mode requested without `ANU_QUANTUM_API_KEY`.
    #[error("[QRNG] ANU_QUANTUM_API_KEY not set")]
    MissingApiKey,

    /// API key contains characters that cannot go into an HTTP header.
    #[error("[QRNG] invalid API key header: {0}")]
    InvalidApiKey(String),

    /// Endpoint is empty or does not start with http/https.
    #[error("[QRNG] invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Requested bit width outside `1..=64`.
    #[error("[QRNG] invalid bit width {0}, expected 1..=64")]
    InvalidBits(u32),

    /// HTTP 401.
    #[error("[QRNG] unauthorized: {0}")]
    Unauthorized(String),

    /// HTTP 403 (ANU: bad key or exhausted quota).
    #[error("[QRNG] forbidden (bad key or quota exceeded): {0}")]
    Forbidden(String),

    /// HTTP 429.
    #[error("[QRNG] rate limited")]
    RateLimited { retry_after_secs: Option<u64> },

    /// HTTP 5xx.
    #[error("[QRNG] server error: status {0}")]
    Server(u16),

    /// Any other non-success HTTP status.
    #[error("[QRNG] HTTP {status}: {snippet}")]
    HttpStatus { status: u16, snippet: String },

    /// Request exceeded the client timeout.
    #[error("[QRNG] timed out after {0:?}")]
    Timeout(Duration),

    /// Transport failure without status (DNS/connect/reset).
    #[error("[QRNG] network error: {0}")]
    Network(String),

    /// Response body was not valid JSON of the expected shape.
    #[error("[QRNG] serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Well-formed JSON with unusable content.
    #[error("[QRNG] invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Maps a non-success HTTP status and its body to an error.
    pub fn from_status(status: u16, body: &str, retry_after_secs: Option<u64>) -> Self {
        let snippet = make_snippet(body);
        match status {
            401 => Self::Unauthorized(snippet),
            403 => Self::Forbidden(snippet),
            429 => Self::RateLimited { retry_after_secs },
            500..=599 => Self::Server(status),
            _ => Self::HttpStatus { status, snippet },
        }
    }

    /// Maps a transport error; `timeout` is the configured client timeout.
    pub fn from_transport(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            return Self::Timeout(timeout);
        }
        if let Some(status) = e.status() {
            return Self::from_status(status.as_u16(), "", None);
        }
        Self::Network(e.to_string())
    }
}

/// Trims a response body to a short single-line snippet for error messages.
pub fn make_snippet(body: &str) -> String {
    const MAX: usize = 200;
    let flat: String = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX {
        flat
    } else {
        let cut: String = flat.chars().take(MAX).collect();
        format!("{cut}…")
    }
}
