//! Question records and their content-derived identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// Display name used when the commenter cannot be resolved.
pub const UNKNOWN_AUTHOR: &str = "Unknown User";

/// Stable identifier of a question: lowercase hex SHA-1 of its text.
///
/// Same key as existing `qrng_cache.json` files. A cache key only, not a
/// security boundary.
///
/// Two questions with identical text share an identifier, and therefore a
/// cached random value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Hash question text into its identifier.
    pub fn from_text(text: &str) -> Self {
        let mut h = Sha1::new();
        h.update(text.as_bytes());
        Self(format!("{:x}", h.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single AMA question as delivered by the question source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    /// Permalink of the comment that carried the question.
    pub source_url: String,
    /// Commenter display name (rendering only, not part of the identity).
    pub author: String,
}

impl Question {
    /// Build a question; the identifier is derived from `text`.
    pub fn new(
        text: impl Into<String>,
        source_url: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            id: QuestionId::from_text(&text),
            text,
            source_url: source_url.into(),
            author: author.into(),
        }
    }
}
