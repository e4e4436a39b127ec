//! Scripted transport for driving the API client without a network.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::time::Instant;
use url::Url;

use champlb::api::{ApiClient, ApiError, ApiResponse, Transport};
use champlb::rate_limit::RateLimitConfig;

/// A request seen by the transport.
#[derive(Debug, Clone)]
pub struct Call {
    pub url: Url,
    pub api_key: String,
    pub at: Instant,
}

type Handler = dyn Fn(&Url, usize) -> ApiResponse + Send + Sync;

/// Answers every request with a handler that sees the URL and call index.
pub struct ScriptedTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new(handler: impl Fn(&Url, usize) -> ApiResponse + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &Url, api_key: &str) -> Result<ApiResponse, ApiError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call {
                url: url.clone(),
                api_key: api_key.to_string(),
                at: Instant::now(),
            });
            calls.len() - 1
        };
        Ok((self.handler)(url, index))
    }
}

pub fn client(transport: Arc<ScriptedTransport>) -> ApiClient {
    ApiClient::with_transport("RGAPI-test", RateLimitConfig::default(), transport).unwrap()
}

pub fn json(body: serde_json::Value) -> ApiResponse {
    ApiResponse::new(StatusCode::OK, HashMap::new(), body.to_string())
}

pub fn json_with_usage(body: serde_json::Value, usage: &str) -> ApiResponse {
    let headers = HashMap::from([("X-App-Rate-Limit-Count".to_string(), usage.to_string())]);
    ApiResponse::new(StatusCode::OK, headers, body.to_string())
}

pub fn status(code: u16) -> ApiResponse {
    ApiResponse::new(
        StatusCode::from_u16(code).unwrap(),
        HashMap::new(),
        r#"{"status": {"message": "error"}}"#,
    )
}

pub fn rate_limited(retry_after: Option<&str>) -> ApiResponse {
    let mut headers = HashMap::new();
    if let Some(secs) = retry_after {
        headers.insert("Retry-After".to_string(), secs.to_string());
    }
    ApiResponse::new(StatusCode::TOO_MANY_REQUESTS, headers, "")
}

/// Last path segment, percent-decoded.
pub fn last_segment(url: &Url) -> String {
    let raw = url.path_segments().and_then(|s| s.last()).unwrap_or("");
    urlencoding::decode(raw).unwrap().into_owned()
}

/// Names requested by a batch lookup URL.
pub fn batch_names(url: &Url) -> Vec<String> {
    last_segment(url).split(',').map(str::to_string).collect()
}

/// Mastery endpoint path segments: (summoner id, champion id).
pub fn mastery_target(url: &Url) -> Option<(String, String)> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    let summoner = segments.iter().position(|s| *s == "by-summoner")?;
    let champion = segments.iter().position(|s| *s == "by-champion")?;
    Some((
        segments.get(summoner + 1)?.to_string(),
        segments.get(champion + 1)?.to_string(),
    ))
}
