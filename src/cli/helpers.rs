//! Shared helper functions for CLI commands.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::Context;
use console::style;

use champlb::api::ApiClient;
use champlb::batch::BatchReport;
use champlb::config::{Config, API_KEY_ENV};
use champlb::leaderboard::LeaderboardStore;
use champlb::storage::{load_store, save_store};

/// Load the leaderboard named by the config.
pub fn open_store(config: &Config) -> anyhow::Result<(PathBuf, LeaderboardStore)> {
    let path = config.data_path();
    let store = load_store(&path)?;
    Ok((path, store))
}

/// Write the leaderboard back.
pub fn commit_store(path: &Path, store: &LeaderboardStore) -> anyhow::Result<()> {
    save_store(path, store).with_context(|| format!("Failed to save {}", path.display()))
}

/// Build an API client; a missing key aborts the run.
pub fn api_client(config: &Config) -> anyhow::Result<ApiClient> {
    let key = config.api_key().with_context(|| {
        format!(
            "No Riot API key configured. Set riot.api_key in the config file or {}.",
            API_KEY_ENV
        )
    })?;
    Ok(ApiClient::new(
        key,
        config.rate_limit.to_config(),
        config.request_timeout(),
    )?)
}

/// Champion tracked by this leaderboard.
pub fn champion_id(config: &Config) -> anyhow::Result<u32> {
    config
        .leaderboard
        .champion_id
        .context("No champion configured. Set leaderboard.champion_id in the config file.")
}

/// Print the per-item failures of a batch.
pub fn print_failures<T, E: Display>(report: &BatchReport<T, E>) {
    for failure in &report.failed {
        println!(
            "  {} {}: {}",
            style("✗").red(),
            failure.item,
            failure.error
        );
    }
}
