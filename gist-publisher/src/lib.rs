//! Publishing step: markdown rendering and GitHub Gist upload.
//!
//! - [`render_markdown`] turns an ordered list into the page text.
//! - [`publish`] uploads it, reusing the gist recorded for the post in the
//!   Gist URL cache unless an explicit URL overrides it.

pub mod errors;
pub mod gist;
pub mod render;
pub mod url_cache;

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

pub use errors::{PublishError, PublishResult};
pub use gist::{DEFAULT_API_BASE, GistClient, UploadedGist, gist_id};
pub use render::{DEFAULT_REPO_URL, RenderOptions, render_markdown, source_label, title};
pub use url_cache::GistUrlCache;

#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub token: Option<String>,
    pub api_base: String,
    pub timeout: Duration,
    /// Directory holding `gist-urls.json`.
    pub cache_dir: PathBuf,
    /// Gist to update; wins over the URL cache.
    pub gist_url: Option<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
            cache_dir: PathBuf::from("cache"),
            gist_url: None,
        }
    }
}

/// Uploads `content` for `post_url` and returns the gist.
///
/// A newly created gist is recorded in the URL cache so the next run updates it.
pub async fn publish(
    cfg: &PublishConfig,
    post_url: &str,
    description: &str,
    content: &str,
) -> PublishResult<UploadedGist> {
    let token = cfg.token.as_deref().ok_or(PublishError::MissingToken)?;
    let client = GistClient::new(token, &cfg.api_base, cfg.timeout)?;

    let mut cache = GistUrlCache::load(&cfg.cache_dir).await;
    let existing = cfg
        .gist_url
        .clone()
        .or_else(|| cache.get(post_url).map(str::to_owned));

    let uploaded = client
        .upload(content, description, existing.as_deref())
        .await?;

    if uploaded.created {
        cache.insert(post_url, uploaded.html_url.clone());
        cache.save().await?;
        info!(url = %uploaded.html_url, "created gist");
    } else {
        info!(url = %uploaded.html_url, "updated gist");
    }
    Ok(uploaded)
}
