//! Patreon comments API client (JSON:API, cursor pagination).
//!
//! Endpoint used:
//! - GET https://www.patreon.com/api/posts/{id}/comments2
//!
//! Pages are followed through `links.next`. Every network page is written to
//! the page cache; cached pages are only read when `read_cache` is set.

use std::collections::{HashMap, HashSet};

use question_order::{Question, UNKNOWN_AUTHOR};
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue, REFERER};
use reqwest::{Client, Url};
use tracing::{debug, info, warn};

use crate::SourceConfig;
use crate::errors::{SourceFetchError, SourceResult};
use crate::page_cache;
use crate::types::{CommentStats, CommentsPage};

const API_BASE: &str = "https://www.patreon.com/api/posts";

const BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.5 Safari/605.1.15";

#[derive(Debug, Clone)]
pub struct PatreonClient {
    http: Client,
    cfg: SourceConfig,
}

impl PatreonClient {
    /// Builds the HTTP client with browser-like default headers.
    pub fn new(cfg: SourceConfig) -> SourceResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/vnd.api+json"),
        );
        headers.insert(
            "accept-language",
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
        headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
        headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));

        if let Some(cookie) = cfg.cookie.as_deref().filter(|c| !c.trim().is_empty()) {
            let mut v =
                HeaderValue::from_str(cookie.trim()).map_err(|_| SourceFetchError::InvalidCookie)?;
            v.set_sensitive(true);
            headers.insert(COOKIE, v);
        }
        if let Ok(referer) = HeaderValue::from_str(&cfg.post_url) {
            headers.insert(REFERER, referer);
        }

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(BROWSER_UA)
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| SourceFetchError::Network(e.to_string()))?;

        Ok(Self { http, cfg })
    }

    /// Fetches every page of the post's comments and turns them into questions.
    pub async fn fetch_questions(&self) -> SourceResult<Vec<Question>> {
        let id = post_id(&self.cfg.post_url)?;
        let first = comments_url(&id)?;
        let pages = self.fetch_pages(first).await?;

        let stats = comment_stats(&pages);
        info!(
            total = stats.total,
            top_level = stats.top_level,
            replies = stats.replies,
            "comments fetched"
        );

        Ok(collect_questions(&self.cfg.post_url, &pages))
    }

    /// Walks `links.next` until it is absent, null or already visited.
    async fn fetch_pages(&self, first: String) -> SourceResult<Vec<CommentsPage>> {
        let mut pages = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(first);

        while let Some(url) = next.take() {
            if !seen.insert(url.clone()) {
                warn!(url = %url, "pagination loop detected, stopping");
                break;
            }
            let page_no = pages.len() + 1;

            let page = match self.cached_page(&url).await {
                Some(p) => {
                    debug!(page = page_no, "page read from disk cache");
                    p
                }
                None => {
                    info!(page = page_no, "fetching comments page");
                    tokio::time::sleep(self.cfg.page_delay).await;
                    self.fetch_page(&url).await?
                }
            };

            next = page.next_url().map(str::to_owned);
            pages.push(page);
        }

        Ok(pages)
    }

    async fn cached_page(&self, url: &str) -> Option<CommentsPage> {
        if !self.cfg.read_cache {
            return None;
        }
        page_cache::load_page(&self.cfg.cache_dir, url).await
    }

    /// One network page: status check, parse, then best-effort cache write.
    async fn fetch_page(&self, url: &str) -> SourceResult<CommentsPage> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SourceFetchError::transport(e, url))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SourceFetchError::transport(e, url))?;

        if !status.is_success() {
            return Err(SourceFetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
                snippet: make_snippet(&body),
            });
        }

        let page: CommentsPage =
            serde_json::from_str(&body).map_err(|source| SourceFetchError::Decode {
                url: url.to_string(),
                source,
            })?;

        match page_cache::store_page(&self.cfg.cache_dir, url, &body).await {
            Ok(path) => debug!(path = %path.display(), "page saved to disk cache"),
            Err(e) => warn!(error = %e, "could not write page cache"),
        }

        Ok(page)
    }
}

/// Post id: last non-empty path segment of the post URL.
///
/// `https://www.patreon.com/posts/ama-call-for-129279432` yields `129279432`
/// (slugged URLs end in `-<id>`).
pub fn post_id(post_url: &str) -> SourceResult<String> {
    let invalid = || SourceFetchError::InvalidPostUrl(post_url.to_string());
    let url = Url::parse(post_url).map_err(|_| invalid())?;
    let segment = url
        .path_segments()
        .and_then(|mut s| s.rfind(|seg| !seg.is_empty()))
        .ok_or_else(invalid)?;
    let id = segment.rsplit('-').next().unwrap_or(segment);

    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    Ok(id.to_string())
}

/// First-page URL of the comments endpoint.
pub fn comments_url(post_id: &str) -> SourceResult<String> {
    let base = format!("{API_BASE}/{post_id}/comments2");
    let url = Url::parse_with_params(
        &base,
        &[
            ("include", "commenter,parent"),
            ("fields[comment]", "body,created,deleted_at,reply_count"),
            ("fields[user]", "full_name,url"),
            ("page[count]", "10"),
            ("sort", "-created"),
            ("json-api-version", "1.0"),
            ("json-api-use-default-includes", "false"),
        ],
    )
    .map_err(|_| SourceFetchError::InvalidPostUrl(base.clone()))?;
    Ok(url.into())
}

/// Counts comment resources across pages, split by the `parent` relationship.
pub fn comment_stats(pages: &[CommentsPage]) -> CommentStats {
    let mut stats = CommentStats::default();
    for c in pages.iter().flat_map(|p| &p.data) {
        stats.total += 1;
        if !c.is_comment() {
            continue;
        }
        if c.is_reply() {
            stats.replies += 1;
        } else {
            stats.top_level += 1;
        }
    }
    stats
}

/// Turns comment resources into questions, resolving commenter names from
/// the `included` users of every page.
pub fn collect_questions(post_url: &str, pages: &[CommentsPage]) -> Vec<Question> {
    let users: HashMap<&str, &str> = pages
        .iter()
        .flat_map(|p| &p.included)
        .filter(|r| r.is_user())
        .filter_map(|r| Some((r.id.as_str(), r.attributes.full_name.as_deref()?)))
        .collect();

    pages
        .iter()
        .flat_map(|p| &p.data)
        .filter(|r| r.is_comment())
        .filter_map(|c| {
            let body = c.attributes.body.as_deref().filter(|b| !b.is_empty())?;
            let author = c
                .commenter_id()
                .and_then(|id| users.get(id).copied())
                .unwrap_or(UNKNOWN_AUTHOR);
            Some(Question::new(
                body,
                format!("{post_url}?comment={}", c.id),
                author,
            ))
        })
        .collect()
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

#[cfg(test)]
mod tests {
    use super::*;

    const POST: &str = "https://www.patreon.com/posts/132289911";

    fn page(json: &str) -> CommentsPage {
        serde_json::from_str(json).unwrap()
    }

    fn sample_pages() -> Vec<CommentsPage> {
        vec![
            page(
                r#"{
                "data": [
                    {"type": "comment", "id": "1",
                     "attributes": {"body": "What is entropy?", "created": "2025-06-01T00:00:00Z"},
                     "relationships": {"commenter": {"data": {"id": "u1", "type": "user"}},
                                       "parent": {"data": null}}},
                    {"type": "comment", "id": "2",
                     "attributes": {"body": ""},
                     "relationships": {"commenter": {"data": {"id": "u2", "type": "user"}}}},
                    {"type": "comment", "id": "3",
                     "attributes": {"body": "Agreed | +1\nsecond line"},
                     "relationships": {"commenter": {"data": {"id": "u2", "type": "user"}},
                                       "parent": {"data": {"id": "1", "type": "comment"}}}}
                ],
                "included": [
                    {"type": "user", "id": "u1", "attributes": {"full_name": "Ada"}},
                    {"type": "campaign", "id": "c1", "attributes": {}}
                ],
                "links": {"next": "https://www.patreon.com/api/posts/132289911/comments2?page%5Bcursor%5D=abc"}
            }"#,
            ),
            page(
                r#"{
                "data": [
                    {"type": "comment", "id": "4",
                     "attributes": {"body": "Is time fundamental?"},
                     "relationships": {"commenter": {"data": null}}}
                ],
                "links": {"next": null}
            }"#,
            ),
        ]
    }

    #[test]
    fn parses_post_id() {
        assert_eq!(post_id(POST).unwrap(), "132289911");
        assert_eq!(
            post_id("https://www.patreon.com/posts/ama-call-for-129279432/").unwrap(),
            "129279432"
        );
        assert!(post_id("https://www.patreon.com/posts/").is_err());
        assert!(post_id("not a url").is_err());
    }

    #[test]
    fn first_page_url_carries_jsonapi_query() {
        let url = comments_url("132289911").unwrap();
        assert!(url.starts_with("https://www.patreon.com/api/posts/132289911/comments2?"));
        assert!(url.contains("include=commenter%2Cparent"));
        assert!(url.contains("page%5Bcount%5D=10"));
        assert!(url.contains("sort=-created"));
    }

    #[test]
    fn next_link_is_followed_until_null() {
        let pages = sample_pages();
        assert!(pages[0].next_url().is_some());
        assert!(pages[1].next_url().is_none());
    }

    #[test]
    fn questions_resolve_authors_and_skip_empty_bodies() {
        let qs = collect_questions(POST, &sample_pages());
        let texts: Vec<&str> = qs.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["What is entropy?", "Agreed | +1\nsecond line", "Is time fundamental?"]
        );

        assert_eq!(qs[0].author, "Ada");
        // u2 is not in `included`
        assert_eq!(qs[1].author, UNKNOWN_AUTHOR);
        assert_eq!(qs[2].author, UNKNOWN_AUTHOR);
        assert_eq!(qs[0].source_url, format!("{POST}?comment=1"));
    }

    #[test]
    fn stats_split_replies() {
        let stats = comment_stats(&sample_pages());
        assert_eq!(
            stats,
            CommentStats {
                total: 4,
                top_level: 3,
                replies: 1
            }
        );
    }

    #[test]
    fn snippet_is_flat_and_bounded() {
        let long = "x".repeat(500);
        let s = make_snippet(&long);
        assert_eq!(s.chars().count(), 201);
        assert_eq!(make_snippet("short"), "short");
        assert_eq!(make_snippet("<html>\n  <body>\tDenied"), "<html> <body> Denied");
    }
}
