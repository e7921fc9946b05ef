use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use tracing::debug;

use crate::error::{RedditError, Result};
use crate::types::{PageRequest, PageResponse};

const BASE_URL: &str = "https://www.reddit.com";

/// Per-request timeout. Exceeding it surfaces as a network error.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Issues one page request. `Err` means the request never produced an HTTP
/// response (timeout, connection failure); any status code is an `Ok`.
#[async_trait]
pub trait PageTransport: Send + Sync {
    async fn get(&self, request: &PageRequest) -> Result<PageResponse>;
}

/// reqwest-backed transport against the public search endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| RedditError::Setup(e.to_string()))?;
        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn search_url(&self, source: &str) -> String {
        format!("{}/r/{}/search.json", self.base_url, source)
    }
}

#[async_trait]
impl PageTransport for HttpTransport {
    async fn get(&self, request: &PageRequest) -> Result<PageResponse> {
        let url = self.search_url(&request.source);
        debug!(url, after = ?request.after, "Requesting search page");

        let resp = self
            .client
            .get(&url)
            .header(USER_AGENT, &request.user_agent)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(REFERER, "https://www.google.com/")
            .query(&request.params())
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(PageResponse { status, body })
    }
}
