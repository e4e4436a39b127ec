//! Data models for the leaderboard.

mod player;
mod region;

pub use player::{normalize_name, PlayerRecord, SummonerId};
pub use region::{Region, RegionParseError};
