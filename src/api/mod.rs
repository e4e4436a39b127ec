//! Riot API client with per-region throttling and bounded retry.

mod error;
mod response;
mod transport;

pub use error::ApiError;
pub use response::ApiResponse;
pub use transport::{ReqwestTransport, Transport, API_KEY_HEADER, USER_AGENT};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::batch::BatchReport;
use crate::models::{normalize_name, PlayerRecord, Region, SummonerId};
use crate::rate_limit::{backoff_delay, RateLimitConfig, RateTracker};

/// Most names the batch lookup endpoint accepts in one call.
pub const BATCH_SIZE: usize = 40;

/// Attempts made for a mastery fetch before giving up. Each attempt is one
/// HTTP request, including attempts that follow a 429.
pub const MAX_MASTERY_ATTEMPTS: u32 = 4;

/// Base delay between mastery attempts, doubled after each failure.
pub const MASTERY_BACKOFF_MS: u64 = 500;

#[derive(Debug, Deserialize)]
struct SummonerDto {
    id: SummonerId,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MasteryDto {
    champion_points: u64,
}

/// Client for the summoner and champion mastery endpoints.
///
/// Calls to the same region are serialized so that quota accounting stays
/// coherent; calls to different regions may run concurrently.
pub struct ApiClient {
    api_key: String,
    transport: Arc<dyn Transport>,
    tracker: RateTracker,
    gates: HashMap<Region, Mutex<()>>,
}

impl ApiClient {
    /// Create a client using the reqwest transport.
    pub fn new(
        api_key: impl Into<String>,
        config: RateLimitConfig,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(timeout)?;
        Self::with_transport(api_key, config, Arc::new(transport))
    }

    /// Create a client with a custom transport.
    pub fn with_transport(
        api_key: impl Into<String>,
        config: RateLimitConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ApiError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ApiError::MissingApiKey);
        }

        Ok(Self {
            api_key,
            transport,
            tracker: RateTracker::with_config(config),
            gates: Region::ALL.iter().map(|r| (*r, Mutex::new(()))).collect(),
        })
    }

    /// Get the rate tracker for this client.
    pub fn tracker(&self) -> &RateTracker {
        &self.tracker
    }

    /// Look up a single summoner by name.
    ///
    /// With a champion id, mastery is fetched in the same call; otherwise it
    /// is left at zero. An unknown name is reported immediately, not retried.
    pub async fn resolve_user(
        &self,
        region: Region,
        username: &str,
        champion_id: Option<u32>,
    ) -> Result<PlayerRecord, ApiError> {
        let key = normalize_name(username);
        if key.is_empty() {
            return Err(unknown_user(region, username));
        }

        let url = endpoint(
            region,
            &format!(
                "/lol/summoner/v3/summoners/by-name/{}",
                urlencoding::encode(&key)
            ),
        )?;
        let response = self.send(region, &url).await?;

        if response.is_not_found() {
            return Err(unknown_user(region, username));
        }
        ensure_success(&response, &url)?;

        let summoner: SummonerDto = response.json()?;
        let record = PlayerRecord::new(summoner.id, region, summoner.name);

        match champion_id {
            Some(champion_id) => {
                let mastery = self.fetch_mastery(region, champion_id, &record.id).await?;
                Ok(record.with_mastery(mastery))
            }
            None => Ok(record),
        }
    }

    /// Look up many summoners in one region, `BATCH_SIZE` names per call.
    ///
    /// Names missing from a response, and names whose mastery fetch fails,
    /// are reported per item without affecting the rest.
    pub async fn resolve_users(
        &self,
        region: Region,
        usernames: &[String],
        champion_id: Option<u32>,
    ) -> BatchReport<PlayerRecord, ApiError> {
        let mut report = BatchReport::new();

        let mut seen = HashSet::new();
        let mut wanted: Vec<(String, &str)> = Vec::new();
        for name in usernames {
            let key = normalize_name(name);
            if key.is_empty() {
                report.push_failure(name.clone(), unknown_user(region, name));
            } else if seen.insert(key.clone()) {
                wanted.push((key, name.as_str()));
            }
        }

        let chunk_count = wanted.len().div_ceil(BATCH_SIZE);
        for (index, chunk) in wanted.chunks(BATCH_SIZE).enumerate() {
            debug!(
                "Resolving chunk {}/{} ({} names) in {}",
                index + 1,
                chunk_count,
                chunk.len(),
                region
            );
            let chunk_report = self.resolve_chunk(region, chunk, champion_id).await;
            report.extend(chunk_report);
        }

        info!(
            "Resolved {} of {} summoners in {}",
            report.succeeded.len(),
            report.total(),
            region
        );
        report
    }

    async fn resolve_chunk(
        &self,
        region: Region,
        chunk: &[(String, &str)],
        champion_id: Option<u32>,
    ) -> BatchReport<PlayerRecord, ApiError> {
        let mut report = BatchReport::new();

        let found = match self.lookup_chunk(region, chunk).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Summoner lookup for {} names in {} failed: {}", chunk.len(), region, e);
                let reason = e.to_string();
                for (_, name) in chunk {
                    report.push_failure(
                        *name,
                        ApiError::ChunkFailed {
                            region,
                            reason: reason.clone(),
                        },
                    );
                }
                return report;
            }
        };

        for (key, name) in chunk {
            let Some(summoner) = found.get(key) else {
                report.push_failure(*name, unknown_user(region, name));
                continue;
            };

            let record = PlayerRecord::new(summoner.id.clone(), region, summoner.name.clone());
            match champion_id {
                Some(champion_id) => match self.fetch_mastery(region, champion_id, &record.id).await {
                    Ok(mastery) => report.push_success(record.with_mastery(mastery)),
                    Err(e) => report.push_failure(*name, e),
                },
                None => report.push_success(record),
            }
        }

        report
    }

    /// One batch lookup call. A 404 means none of the names exist.
    async fn lookup_chunk(
        &self,
        region: Region,
        chunk: &[(String, &str)],
    ) -> Result<HashMap<String, SummonerDto>, ApiError> {
        let names: Vec<String> = chunk
            .iter()
            .map(|(key, _)| urlencoding::encode(key).into_owned())
            .collect();
        let url = endpoint(
            region,
            &format!(
                "/api/lol/{}/v1.4/summoner/by-name/{}",
                region.as_str(),
                names.join(",")
            ),
        )?;
        let response = self.send(region, &url).await?;

        if response.is_not_found() {
            return Ok(HashMap::new());
        }
        ensure_success(&response, &url)?;

        let by_name: HashMap<String, SummonerDto> = response.json()?;
        Ok(by_name
            .into_iter()
            .map(|(k, v)| (normalize_name(&k), v))
            .collect())
    }

    /// Fetch a summoner's mastery points on a champion.
    ///
    /// Makes up to `MAX_MASTERY_ATTEMPTS` requests, each throttled like any
    /// other call and spaced by an exponential backoff, then fails with
    /// `FetchFailure`.
    pub async fn fetch_mastery(
        &self,
        region: Region,
        champion_id: u32,
        player_id: &SummonerId,
    ) -> Result<u64, ApiError> {
        let url = endpoint(
            region,
            &format!(
                "/lol/champion-mastery/v3/champion-masteries/by-summoner/{}/by-champion/{}",
                urlencoding::encode(player_id.as_str()),
                champion_id
            ),
        )?;

        let mut last_error = String::new();
        for attempt in 1..=MAX_MASTERY_ATTEMPTS {
            match self.try_fetch_mastery(region, &url).await {
                Ok(points) => return Ok(points),
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < MAX_MASTERY_ATTEMPTS {
                        let delay = backoff_delay(attempt - 1, MASTERY_BACKOFF_MS);
                        warn!(
                            "Mastery fetch for summoner {} in {} failed (attempt {}/{}): {}, retrying in {:?}",
                            player_id, region, attempt, MAX_MASTERY_ATTEMPTS, e, delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(ApiError::FetchFailure {
            region,
            player_id: player_id.clone(),
            champion_id,
            attempts: MAX_MASTERY_ATTEMPTS,
            last_error,
        })
    }

    async fn try_fetch_mastery(&self, region: Region, url: &Url) -> Result<u64, ApiError> {
        let response = self.send_single(region, url).await?;
        ensure_success(&response, url)?;
        let mastery: MasteryDto = response.json()?;
        Ok(mastery.champion_points)
    }

    /// Issue one logical call: wait for the region, send, record usage.
    ///
    /// A 429 gets one more try after backing off; a second 429 is
    /// `RateLimitExceeded`.
    async fn send(&self, region: Region, url: &Url) -> Result<ApiResponse, ApiError> {
        let _gate = self.gates[&region].lock().await;

        let response = self.send_once(region, url).await?;
        if !response.is_rate_limited() {
            return Ok(response);
        }
        self.back_off(region, &response).await;

        let response = self.send_once(region, url).await?;
        if response.is_rate_limited() {
            return Err(ApiError::RateLimitExceeded { region });
        }
        Ok(response)
    }

    /// Issue exactly one request. A 429 holds the region and fails, leaving
    /// the retry to the caller's own attempt budget.
    async fn send_single(&self, region: Region, url: &Url) -> Result<ApiResponse, ApiError> {
        let _gate = self.gates[&region].lock().await;

        let response = self.send_once(region, url).await?;
        if response.is_rate_limited() {
            self.back_off(region, &response).await;
            return Err(ApiError::RateLimitExceeded { region });
        }
        Ok(response)
    }

    async fn back_off(&self, region: Region, response: &ApiResponse) {
        let wait = response
            .retry_after()
            .unwrap_or_else(|| self.tracker.config().longest_cooldown());
        self.tracker.report_rate_limit(region, wait).await;
    }

    async fn send_once(&self, region: Region, url: &Url) -> Result<ApiResponse, ApiError> {
        let wait = self.tracker.should_wait(region).await;
        if wait > Duration::ZERO {
            info!("Waiting {:?} for {} rate limit", wait, region);
            tokio::time::sleep(wait).await;
        }

        debug!("GET {}", url);
        self.tracker.record_call(region).await;
        let response = self.transport.get(url, &self.api_key).await?;

        if let Some(usage) = response.quota_usage() {
            let limits = response.quota_limits();
            self.tracker
                .record_usage(region, &usage, limits.as_ref())
                .await;
        }

        Ok(response)
    }
}

fn endpoint(region: Region, path: &str) -> Result<Url, ApiError> {
    Ok(Url::parse(&format!("{}{}", region.host(), path))?)
}

fn ensure_success(response: &ApiResponse, url: &Url) -> Result<(), ApiError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(ApiError::Status {
            status: response.status.as_u16(),
            url: url.to_string(),
        })
    }
}

fn unknown_user(region: Region, name: &str) -> ApiError {
    ApiError::UnknownUser {
        region,
        name: name.to_string(),
    }
}
