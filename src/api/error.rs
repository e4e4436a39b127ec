//! Errors from Riot API operations.

use thiserror::Error;

use crate::models::{Region, SummonerId};

/// Errors that can occur while talking to the Riot API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Summoner '{name}' not found in {region}")]
    UnknownUser { region: Region, name: String },

    #[error(
        "Could not fetch mastery for summoner {player_id} (champion {champion_id}) in {region} \
         after {attempts} attempts: {last_error}"
    )]
    FetchFailure {
        region: Region,
        player_id: SummonerId,
        champion_id: u32,
        attempts: u32,
        last_error: String,
    },

    #[error("Rate limit exceeded for {region} even after backing off")]
    RateLimitExceeded { region: Region },

    #[error("Request to {url} failed with HTTP {status}")]
    Status { status: u16, url: String },

    #[error("Request for {region} failed: {reason}")]
    ChunkFailed { region: Region, reason: String },

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("No Riot API key configured")]
    MissingApiKey,
}
