//! Runtime configuration from environment variables.
//!
//! Read once at startup; library crates only ever see the per-crate config
//! structs built here. Empty or whitespace-only values count as unset.

use std::path::{Path, PathBuf};
use std::time::Duration;

use gist_publisher::PublishConfig;
use patreon_source::{DEFAULT_POST_URL, SourceConfig};
use qrng_service::config::DEFAULT_ANU_ENDPOINT;
use qrng_service::{AnuConfig, RandomSourceConfig, SourceKind};

use crate::errors::ConfigError;

pub const DEFAULT_CACHE_DIR: &str = "cache";
pub const DEFAULT_QRNG_CACHE: &str = "qrng_cache.json";
pub const DEFAULT_PRNG_CACHE: &str = "prng_cache.json";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub anu_api_key: Option<String>,
    pub anu_endpoint: String,
    pub github_token: Option<String>,
    pub gist_url: Option<String>,
    pub patreon_cookie: Option<String>,
    pub post_url: String,
    /// Page cache and Gist URL cache.
    pub cache_dir: PathBuf,
    pub qrng_cache: PathBuf,
    pub prng_cache: PathBuf,
    pub http_timeout: Duration,
}

impl AppConfig {
    /// Builds the config from any `key -> value` source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout_secs = match get("HTTP_TIMEOUT_SECS") {
            None => DEFAULT_HTTP_TIMEOUT_SECS,
            Some(v) => match v.parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        key: "HTTP_TIMEOUT_SECS",
                        value: v,
                    });
                }
            },
        };

        Ok(Self {
            anu_api_key: get("ANU_QUANTUM_API_KEY"),
            anu_endpoint: get("ANU_API_URL").unwrap_or_else(|| DEFAULT_ANU_ENDPOINT.to_string()),
            github_token: get("GITHUB_TOKEN"),
            gist_url: get("GIST_URL"),
            patreon_cookie: get("PATREON_COOKIE"),
            post_url: get("PATREON_POST_URL").unwrap_or_else(|| DEFAULT_POST_URL.to_string()),
            cache_dir: get("AMA_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
            qrng_cache: get("QRNG_CACHE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_QRNG_CACHE)),
            prng_cache: get("PRNG_CACHE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PRNG_CACHE)),
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn source_config(&self, read_cache: bool) -> SourceConfig {
        SourceConfig {
            post_url: self.post_url.clone(),
            cookie: self.patreon_cookie.clone(),
            cache_dir: self.cache_dir.clone(),
            read_cache,
            timeout: self.http_timeout,
            ..SourceConfig::default()
        }
    }

    pub fn random_source_config(&self, quantum: bool, seed: Option<u64>) -> RandomSourceConfig {
        if !quantum {
            return RandomSourceConfig::pseudo(seed);
        }
        RandomSourceConfig::quantum(AnuConfig {
            endpoint: self.anu_endpoint.clone(),
            api_key: self.anu_api_key.clone(),
            timeout_secs: self.http_timeout.as_secs(),
            ..AnuConfig::default()
        })
    }

    pub fn publish_config(&self) -> PublishConfig {
        PublishConfig {
            token: self.github_token.clone(),
            timeout: self.http_timeout,
            cache_dir: self.cache_dir.clone(),
            gist_url: self.gist_url.clone(),
            ..PublishConfig::default()
        }
    }

    /// Value cache file for the given source; quantum and pseudo never share one.
    pub fn value_cache_path(&self, kind: SourceKind) -> &Path {
        match kind {
            SourceKind::Quantum => &self.qrng_cache,
            SourceKind::Pseudo => &self.prng_cache,
        }
    }
}
