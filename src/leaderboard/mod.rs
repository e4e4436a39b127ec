//! Leaderboard state, ranking, and synchronization with the Riot API.

mod ranking;
mod store;
mod sync;

use thiserror::Error;

use crate::api::ApiError;
use crate::models::Region;

pub use ranking::{rank, standings, Standing};
pub use store::{LeaderboardStore, MergeSummary, Partition};
pub use sync::{add_players, update_mastery, MasteryChange, UpdateScope};

/// Errors from leaderboard operations.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("No player '{key}' tracked in {region}")]
    MissingRecord { region: Region, key: String },

    #[error("Invalid summoner name '{0}'")]
    InvalidName(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl LeaderboardError {
    pub(crate) fn missing(region: Region, key: &str) -> Self {
        LeaderboardError::MissingRecord {
            region,
            key: crate::models::normalize_name(key),
        }
    }
}
