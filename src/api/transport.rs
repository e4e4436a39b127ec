//! HTTP transport for API calls.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::error::ApiError;
use super::response::ApiResponse;

pub const USER_AGENT: &str = concat!("champlb/", env!("CARGO_PKG_VERSION"));

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-Riot-Token";

/// Sends a single GET request and reads the whole response.
///
/// Implementations must not retry or throttle; the client does both.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url, api_key: &str) -> Result<ApiResponse, ApiError>;
}

/// Transport backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .gzip(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url, api_key: &str) -> Result<ApiResponse, ApiError> {
        let response = self
            .client
            .get(url.clone())
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?;

        let status = response.status();
        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.to_string(), v.to_string());
            }
        }
        let body = response.text().await?;

        Ok(ApiResponse::new(status, headers, body))
    }
}
