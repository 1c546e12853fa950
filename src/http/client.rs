use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::debug;

use crate::error::{Error, Result};

use super::request::RequestInput;
use super::response::HttpResponse;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Something that can deliver a request and hand back the response.
pub trait Transport {
    fn send(&self, request: &RequestInput) -> impl Future<Output = Result<HttpResponse>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// `timeout_ms == 0` disables the per-request timeout.
    pub fn new(timeout_ms: u64, bearer_token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = bearer_token.map(str::trim).filter(|token| !token.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| Error::Config(format!("Invalid bearer token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10));

        if timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        let client = builder
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl Transport for HttpClient {
    async fn send(&self, request: &RequestInput) -> Result<HttpResponse> {
        let mut url = reqwest::Url::parse(&request.url)
            .map_err(|e| Error::Http(format!("Invalid URL `{}`: {e}", request.url)))?;

        if !request.query.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                query_pairs.append_pair(key, value);
            }
        }

        debug!(method = %request.method, url = %url, "sending request");

        let mut req_builder = self.client.request(request.method.into(), url);
        if let Some(body) = &request.body {
            req_builder = req_builder.json(body);
        }

        let started = Instant::now();
        let response = req_builder
            .send()
            .await
            .map_err(|e| Error::Http(format!("Request failed: {e}")))?;
        let elapsed = started.elapsed().as_millis();

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Http(format!("Failed to read response: {e}")))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            duration_ms: elapsed,
            size_bytes: bytes.len(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}
