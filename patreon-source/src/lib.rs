//! Patreon question source.
//!
//! Pulls every comment of an AMA post through the JSON:API comments endpoint
//! and returns them as [`question_order::Question`] records. Raw pages are
//! mirrored into an on-disk cache so a run can be replayed offline.

pub mod client;
pub mod errors;
pub mod page_cache;
pub mod types;

use std::path::PathBuf;
use std::time::Duration;

use question_order::Question;

pub use client::{PatreonClient, collect_questions, comment_stats, comments_url, post_id};
pub use errors::{SourceFetchError, SourceResult};
pub use types::{CommentStats, CommentsPage};

/// Default AMA post.
pub const DEFAULT_POST_URL: &str = "https://www.patreon.com/posts/132289911";

/// Settings for one fetch run.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub post_url: String,
    /// Session cookie; public posts work without it.
    pub cookie: Option<String>,
    pub cache_dir: PathBuf,
    /// Read pages from `cache_dir` when present (`--cache-urls`).
    pub read_cache: bool,
    pub timeout: Duration,
    /// Pause before each network page.
    pub page_delay: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            post_url: DEFAULT_POST_URL.to_string(),
            cookie: None,
            cache_dir: PathBuf::from("cache"),
            read_cache: false,
            timeout: Duration::from_secs(10),
            page_delay: Duration::from_millis(100),
        }
    }
}

/// Fetches all questions of the configured post.
pub async fn fetch_questions(cfg: SourceConfig) -> SourceResult<Vec<Question>> {
    PatreonClient::new(cfg)?.fetch_questions().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn replays_from_page_cache_without_network() {
        let dir = TempDir::new().unwrap();
        let id = post_id(DEFAULT_POST_URL).unwrap();
        let first = comments_url(&id).unwrap();
        let body = r#"{
            "data": [{"type": "comment", "id": "9",
                      "attributes": {"body": "Why is there something?"},
                      "relationships": {"commenter": {"data": {"id": "u9", "type": "user"}}}}],
            "included": [{"type": "user", "id": "u9", "attributes": {"full_name": "Sean"}}],
            "links": {"next": null}
        }"#;
        page_cache::store_page(dir.path(), &first, body).await.unwrap();

        let cfg = SourceConfig {
            cache_dir: dir.path().to_path_buf(),
            read_cache: true,
            ..SourceConfig::default()
        };
        let questions = fetch_questions(cfg).await.unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].author, "Sean");
        assert_eq!(
            questions[0].source_url,
            "https://www.patreon.com/posts/132289911?comment=9"
        );
    }

    #[test]
    fn control_characters_in_cookie_are_rejected() {
        let cfg = SourceConfig {
            cookie: Some("session=abc\n".into()),
            ..SourceConfig::default()
        };
        // trailing whitespace is trimmed; embedded newlines are not
        assert!(PatreonClient::new(cfg).is_ok());

        let cfg = SourceConfig {
            cookie: Some("session=a\nb".into()),
            ..SourceConfig::default()
        };
        assert!(matches!(
            PatreonClient::new(cfg),
            Err(SourceFetchError::InvalidCookie)
        ));
    }
}
