//! Post URL → Gist URL map, kept in `<cache_dir>/gist-urls.json`.
//!
//! Lets later runs update the gist created for a post instead of creating a
//! new one. Reads never fail; a broken file behaves like an empty one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::warn;

use crate::errors::PublishResult;

pub const GIST_URLS_FILE: &str = "gist-urls.json";

#[derive(Debug, Clone, Default)]
pub struct GistUrlCache {
    path: PathBuf,
    urls: BTreeMap<String, String>,
}

impl GistUrlCache {
    pub fn path_in(cache_dir: &Path) -> PathBuf {
        cache_dir.join(GIST_URLS_FILE)
    }

    pub async fn load(cache_dir: &Path) -> Self {
        let path = Self::path_in(cache_dir);
        let urls = match fs::read(&path).await {
            Ok(data) => serde_json::from_slice(&data).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring unreadable gist url cache");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable gist url cache");
                BTreeMap::new()
            }
        };
        Self { path, urls }
    }

    pub fn get(&self, post_url: &str) -> Option<&str> {
        self.urls.get(post_url).map(String::as_str)
    }

    pub fn insert(&mut self, post_url: impl Into<String>, gist_url: impl Into<String>) {
        self.urls.insert(post_url.into(), gist_url.into());
    }

    /// Writes the whole map as pretty JSON.
    pub async fn save(&self) -> PublishResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_vec_pretty(&self.urls)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }
}
