//! champlb - champion mastery leaderboards from the Riot Games API.
//!
//! Tracks a set of summoners per region, refreshes their mastery on one
//! champion while staying inside the API's quota, and produces a stable
//! ranking of the results.

pub mod api;
pub mod batch;
pub mod config;
pub mod leaderboard;
pub mod models;
pub mod rate_limit;
pub mod storage;
