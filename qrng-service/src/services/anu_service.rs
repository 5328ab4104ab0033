//! ANU quantum random number service.
//!
//! Endpoint: `GET {endpoint}?length={n}&type=hex8&size=1` with header
//! `x-api-key`. The service returns at most 1024 bytes per call, so a draw
//! issues `ceil(bytes / 1024)` sequential calls and concatenates the bytes.
//!
//! Response shape:
//! ```json
//! { "success": true, "type": "string", "length": "4", "data": ["a3", "0f", "7c", "01"] }
//! ```
//! Elements may also arrive as integers (`uint8`) or as nested lists when
//! `size > 1`; all three forms are accepted.

use std::time::{Duration, Instant};

use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, info};

use crate::bit_stream::{bytes_needed, split_values};
use crate::config::AnuConfig;
use crate::error_handler::{ProviderError, Result};

/// Thin client for the ANU QRNG API.
#[derive(Debug, Clone)]
pub struct AnuQrngService {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    max_bytes_per_call: usize,
}

impl AnuQrngService {
    /// Creates a new client from `cfg`.
    ///
    /// # Errors
    /// - [`ProviderError::MissingApiKey`] if no key is configured
    /// - [`ProviderError::InvalidEndpoint`] if the endpoint is not http(s)
    /// - [`ProviderError::InvalidApiKey`] if the key is not a valid header value
    pub fn new(cfg: AnuConfig) -> Result<Self> {
        let api_key = cfg
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ProviderError::MissingApiKey)?;

        let endpoint = cfg.endpoint.trim().trim_end_matches('/').to_string();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ProviderError::InvalidEndpoint(cfg.endpoint));
        }

        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key.trim())
            .map_err(|e| ProviderError::InvalidApiKey(e.to_string()))?;
        key.set_sensitive(true);
        headers.insert("x-api-key", key);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let timeout = Duration::from_secs(cfg.timeout_secs.max(1));
        let client = reqwest::Client::builder()
            .user_agent(concat!("quantum-ama/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        info!(endpoint = %endpoint, timeout_secs = timeout.as_secs(), "AnuQrngService initialized");

        Ok(Self {
            client,
            endpoint,
            timeout,
            max_bytes_per_call: cfg.max_bytes_per_call.max(1),
        })
    }

    /// Draws `count` values of `bits` bits from quantum bytes.
    pub async fn draw(&self, count: usize, bits: u32) -> Result<Vec<u64>> {
        let total = bytes_needed(count, bits);
        let bytes = self.fetch_bytes(total).await?;
        split_values(&bytes, count, bits).ok_or_else(|| {
            ProviderError::InvalidResponse(format!(
                "{} bytes cannot hold {count} values of {bits} bits",
                bytes.len()
            ))
        })
    }

    /// Fetches exactly `total` random bytes, batching by the per-call limit.
    pub async fn fetch_bytes(&self, total: usize) -> Result<Vec<u8>> {
        let calls = call_sizes(total, self.max_bytes_per_call);
        info!(
            bytes = total,
            calls = calls.len(),
            "requesting quantum random bytes"
        );

        let mut out = Vec::with_capacity(total);
        for (i, len) in calls.iter().enumerate() {
            debug!(call = i + 1, of = calls.len(), bytes = len, "ANU call");
            out.extend(self.fetch_chunk(*len).await?);
        }
        Ok(out)
    }

    async fn fetch_chunk(&self, len: usize) -> Result<Vec<u8>> {
        let started = Instant::now();
        let url = format!("{}?length={len}&type=hex8&size=1", self.endpoint);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(e, self.timeout))?;

        let status = resp.status();
        let retry_after = resp
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::from_transport(e, self.timeout))?;

        if !status.is_success() {
            return Err(ProviderError::from_status(status.as_u16(), &body, retry_after));
        }

        let parsed: AnuResponse = serde_json::from_str(&body)?;
        let bytes = decode_payload(parsed, len)?;
        debug!(
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ANU call ok"
        );
        Ok(bytes)
    }
}

/// Sizes of consecutive calls needed for `total` bytes.
pub fn call_sizes(total: usize, max_per_call: usize) -> Vec<usize> {
    let max = max_per_call.max(1);
    let mut sizes = Vec::with_capacity(total.div_ceil(max));
    let mut left = total;
    while left > 0 {
        let n = left.min(max);
        sizes.push(n);
        left -= n;
    }
    sizes
}

#[derive(Debug, Deserialize)]
struct AnuResponse {
    success: bool,
    #[serde(default)]
    data: Vec<AnuDatum>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnuDatum {
    Int(u64),
    Hex(String),
    Nested(Vec<AnuDatum>),
}

fn flatten_into(datum: AnuDatum, out: &mut Vec<u8>) -> Result<()> {
    match datum {
        AnuDatum::Int(n) => {
            let b = u8::try_from(n)
                .map_err(|_| ProviderError::InvalidResponse(format!("byte out of range: {n}")))?;
            out.push(b);
        }
        AnuDatum::Hex(s) => {
            let b = u8::from_str_radix(s.trim(), 16)
                .map_err(|_| ProviderError::InvalidResponse(format!("not a hex byte: {s:?}")))?;
            out.push(b);
        }
        AnuDatum::Nested(items) => {
            for item in items {
                flatten_into(item, out)?;
            }
        }
    }
    Ok(())
}

/// Decodes an ANU payload into exactly `expected` bytes.
fn decode_payload(resp: AnuResponse, expected: usize) -> Result<Vec<u8>> {
    if !resp.success {
        return Err(ProviderError::InvalidResponse(format!(
            "ANU API call failed: {}",
            resp.message.unwrap_or_else(|| "success=false".into())
        )));
    }

    let mut bytes = Vec::with_capacity(expected);
    for d in resp.data {
        flatten_into(d, &mut bytes)?;
    }
    if bytes.len() != expected {
        return Err(ProviderError::InvalidResponse(format!(
            "returned {} bytes, expected {expected}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn decode(json: &str, expected: usize) -> Result<Vec<u8>> {
        decode_payload(serde_json::from_str(json)?, expected)
    }

    #[test]
    fn decodes_hex_strings() {
        let b = decode(
            r#"{"success":true,"type":"string","length":"3","data":["a3","0F","7"]}"#,
            3,
        )
        .unwrap();
        assert_eq!(b, vec![0xA3, 0x0F, 0x07]);
    }

    #[test]
    fn decodes_integers_and_nested_lists() {
        let b = decode(r#"{"success":true,"data":[[1,2],[255],["ff"]]}"#, 4).unwrap();
        assert_eq!(b, vec![1, 2, 255, 255]);
    }

    #[test]
    fn failure_flag_is_an_error() {
        let err = decode(r#"{"success":false,"message":"quota exceeded"}"#, 4).unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn wrong_length_is_an_error() {
        let err = decode(r#"{"success":true,"data":["00","01"]}"#, 3).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn bad_elements_are_errors() {
        assert!(decode(r#"{"success":true,"data":["zz"]}"#, 1).is_err());
        assert!(decode(r#"{"success":true,"data":[256]}"#, 1).is_err());
        assert!(matches!(
            decode(r#"{"success":true,"data":[true]}"#, 1),
            Err(ProviderError::Serde(_))
        ));
    }

    #[test]
    fn calls_are_batched_by_limit() {
        assert!(call_sizes(0, 1024).is_empty());
        assert_eq!(call_sizes(1000, 1024), vec![1000]);
        assert_eq!(call_sizes(1024, 1024), vec![1024]);
        assert_eq!(call_sizes(1685, 1024), vec![1024, 661]);
        assert_eq!(call_sizes(3, 0), vec![1, 1, 1]);
    }

    #[test]
    fn construction_requires_key_and_http_endpoint() {
        let err = AnuQrngService::new(AnuConfig::default()).unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey));

        let blank = AnuConfig {
            api_key: Some("   ".into()),
            ..AnuConfig::default()
        };
        assert!(matches!(
            AnuQrngService::new(blank),
            Err(ProviderError::MissingApiKey)
        ));

        let bad = AnuConfig {
            api_key: Some("key".into()),
            endpoint: "ftp://example".into(),
            ..AnuConfig::default()
        };
        assert!(matches!(
            AnuQrngService::new(bad),
            Err(ProviderError::InvalidEndpoint(_))
        ));

        let ok = AnuConfig {
            api_key: Some("key".into()),
            ..AnuConfig::default()
        };
        assert!(AnuQrngService::new(ok).is_ok());
    }

    /// Serves one JSON body per connection, in order, and returns the request heads.
    async fn serve_bodies(bodies: Vec<&'static str>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut heads = Vec::new();
            for body in bodies {
                let (mut sock, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = sock.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                heads.push(String::from_utf8_lossy(&buf).to_ascii_lowercase());
                let resp = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                sock.write_all(resp.as_bytes()).await.unwrap();
                sock.shutdown().await.unwrap();
            }
            heads
        });
        (format!("http://{addr}"), handle)
    }

    #[tokio::test]
    async fn bytes_from_several_calls_are_joined_in_order() {
        let (endpoint, server) = serve_bodies(vec![
            r#"{"success":true,"data":["01","02"]}"#,
            r#"{"success":true,"data":["03"]}"#,
        ])
        .await;
        let svc = AnuQrngService::new(AnuConfig {
            endpoint,
            api_key: Some("k".into()),
            max_bytes_per_call: 2,
            ..AnuConfig::default()
        })
        .unwrap();

        assert_eq!(svc.fetch_bytes(3).await.unwrap(), vec![1, 2, 3]);

        let heads = server.await.unwrap();
        assert_eq!(heads.len(), 2);
        assert!(heads[0].starts_with("get /?length=2&type=hex8&size=1 "));
        assert!(heads[1].starts_with("get /?length=1&type=hex8&size=1 "));
        assert!(heads.iter().all(|h| h.contains("x-api-key: k\r\n")));
    }
}
