//! File-based cache of raw Patreon API pages (JSON on disk).
//!
//! Key (stable across re-runs): SHA256(page url), first 32 hex chars.
//! Layout: `<cache_dir>/<hash32>.json`, holding the response body verbatim.
//! Pages are always written after a network fetch; they are only read back
//! when the caller asks for it (`--cache-urls`).

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::warn;

use crate::types::CommentsPage;

/// Computes the deterministic cache path for a page url.
pub fn page_path(cache_dir: &Path, url: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    cache_dir.join(format!("{}.json", &digest[..32]))
}

/// Loads a cached page if present and parseable.
pub async fn load_page(cache_dir: &Path, url: &str) -> Option<CommentsPage> {
    let path = page_path(cache_dir, url);
    if !path.exists() {
        return None;
    }
    let data = match fs::read(&path).await {
        Ok(d) => d,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read cached page, fetching");
            return None;
        }
    };
    match serde_json::from_slice(&data) {
        Ok(page) => Some(page),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not parse cached page, fetching");
            None
        }
    }
}

/// Stores the raw page body.
pub async fn store_page(cache_dir: &Path, url: &str, body: &str) -> std::io::Result<PathBuf> {
    let path = page_path(cache_dir, url);
    fs::create_dir_all(cache_dir).await?;
    fs::write(&path, body).await?;
    Ok(path)
}
