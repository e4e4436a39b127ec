//! API response wrapper.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::ApiError;
use crate::rate_limit::{parse_retry_after, QuotaDescriptor, LIMIT_HEADER, USAGE_HEADER};

/// A fully read API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// Header names are lowercase.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HashMap<String, String>, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v))
                .collect(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    /// Calls made per window, from `X-App-Rate-Limit-Count`.
    pub fn quota_usage(&self) -> Option<QuotaDescriptor> {
        self.quota_header(USAGE_HEADER)
    }

    /// Calls allowed per window, from `X-App-Rate-Limit`.
    pub fn quota_limits(&self) -> Option<QuotaDescriptor> {
        self.quota_header(LIMIT_HEADER)
    }

    fn quota_header(&self, name: &str) -> Option<QuotaDescriptor> {
        let raw = self.header(name)?;
        match raw.parse() {
            Ok(q) => Some(q),
            Err(e) => {
                debug!("Ignoring {} header: {}", name, e);
                None
            }
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        parse_retry_after(self.header("retry-after"))
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}
