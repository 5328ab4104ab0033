//! GitHub Gist client (REST, API version 2022-11-28).
//!
//! API:
//! - POST  /gists        create, expects 201
//! - PATCH /gists/{id}   update, expects 200
//!
//! Both return the gist object; only `html_url` is used.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{PublishError, PublishResult};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const GIST_FILENAME: &str = "ama_questions.md";
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Clone, Serialize)]
pub struct GistFile<'a> {
    pub content: &'a str,
}

/// Request body shared by create and update.
#[derive(Debug, Clone, Serialize)]
pub struct GistRequest<'a> {
    pub description: &'a str,
    pub public: bool,
    pub files: BTreeMap<&'a str, GistFile<'a>>,
}

impl<'a> GistRequest<'a> {
    pub fn new(description: &'a str, content: &'a str) -> Self {
        Self {
            description,
            public: false,
            files: BTreeMap::from([(GIST_FILENAME, GistFile { content })]),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GistResponse {
    html_url: String,
}

/// Outcome of one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedGist {
    pub html_url: String,
    /// True when a new gist was created (as opposed to updated).
    pub created: bool,
}

#[derive(Debug, Clone)]
pub struct GistClient {
    http: Client,
    api_base: String,
}

impl GistClient {
    /// Builds a client with auth and GitHub API headers preset.
    pub fn new(token: &str, api_base: &str, timeout: Duration) -> PublishResult<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(PublishError::MissingToken);
        }

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| PublishError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(API_VERSION),
        );

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("quantum-ama/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| PublishError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a gist, or updates `existing_url` when given.
    pub async fn upload(
        &self,
        content: &str,
        description: &str,
        existing_url: Option<&str>,
    ) -> PublishResult<UploadedGist> {
        let body = GistRequest::new(description, content);

        let (req, expected) = match existing_url {
            None => {
                info!("creating new gist");
                let url = format!("{}/gists", self.api_base);
                (self.http.post(url), StatusCode::CREATED)
            }
            Some(existing) => {
                let id = gist_id(existing)?;
                info!(gist_id = %id, "updating existing gist");
                let url = format!("{}/gists/{id}", self.api_base);
                (self.http.patch(url), StatusCode::OK)
            }
        };

        let resp = req
            .json(&body)
            .send()
            .await
            .map_err(PublishError::transport)?;
        let status = resp.status();
        let text = resp.text().await.map_err(PublishError::transport)?;
        debug!(status = status.as_u16(), bytes = text.len(), "gist response");

        if status != expected {
            return Err(PublishError::from_status(
                status.as_u16(),
                expected.as_u16(),
                &text,
            ));
        }

        let parsed: GistResponse = serde_json::from_str(&text)?;
        Ok(UploadedGist {
            html_url: parsed.html_url,
            created: existing_url.is_none(),
        })
    }
}

/// Gist id: last non-empty path segment of a gist URL
/// (`https://gist.github.com/<user>/<id>`).
pub fn gist_id(url: &str) -> PublishResult<String> {
    let id = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(PublishError::InvalidGistUrl(url.to_string()));
    }
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_gist_id() {
        assert_eq!(
            gist_id("https://gist.github.com/someone/0123abcd").unwrap(),
            "0123abcd"
        );
        assert_eq!(
            gist_id("https://gist.github.com/someone/0123abcd/").unwrap(),
            "0123abcd"
        );
        assert_eq!(
            gist_id("https://gist.github.com/someone/0123abcd#file-ama").unwrap(),
            "0123abcd"
        );
        assert!(gist_id("https://gist.github.com/").is_err());
        assert!(gist_id("").is_err());
    }

    #[test]
    fn request_body_shape() {
        let req = GistRequest::new("Mindscape AMA Questions in Quantum Random Order", "# hi\n");
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "description": "Mindscape AMA Questions in Quantum Random Order",
                "public": false,
                "files": {"ama_questions.md": {"content": "# hi\n"}}
            })
        );
    }

    #[test]
    fn blank_token_is_missing() {
        let err = GistClient::new("  ", DEFAULT_API_BASE, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, PublishError::MissingToken));
        assert!(GistClient::new("ghp_x", DEFAULT_API_BASE, Duration::from_secs(1)).is_ok());
    }
}
