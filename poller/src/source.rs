use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA, USER_AGENT};
use std::time::Duration;
use tracing::debug;

use crate::error::PollerError;
use crate::payload::ServerData;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Where server status comes from. The poller only sees this trait.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(&self, server_id: &str) -> Result<ServerData, PollerError>;
}

/// Client for the public CFX server-list endpoint.
pub struct CfxClient {
    client: reqwest::Client,
    base_url: String,
}

impl CfxClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PollerError> {
        Ok(Self::with_client(base_url, client_builder(timeout).build()?))
    }

    /// Uses a caller-built client. It should send browser-like headers or
    /// the endpoint may refuse it.
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, server_id: &str) -> String {
        format!("{}/{}", self.base_url, server_id)
    }
}

fn client_builder(timeout: Duration) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .default_headers(browser_headers())
        .timeout(timeout)
}

// The endpoint sits behind bot protection that rejects bare clients.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

#[async_trait]
impl StatusSource for CfxClient {
    async fn fetch(&self, server_id: &str) -> Result<ServerData, PollerError> {
        let url = self.url_for(server_id);
        debug!(url = %url, "Fetching server status");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        debug!(status = status.as_u16(), "Status endpoint responded");
        if !status.is_success() {
            return Err(PollerError::Status(status.as_u16()));
        }

        let body = resp.bytes().await?;
        ServerData::from_slice(&body)
    }
}
