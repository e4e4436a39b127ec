//! Mastery refresh command.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use champlb::config::Config;
use champlb::leaderboard::{update_mastery, UpdateScope};
use champlb::models::Region;

use crate::cli::helpers::{api_client, champion_id, commit_store, open_store, print_failures};

/// Refresh mastery for all players, one region, or one player.
pub async fn cmd_update(
    config: &Config,
    region: Option<Region>,
    name: Option<String>,
) -> anyhow::Result<()> {
    let scope = match (region, name) {
        (Some(region), Some(name)) => UpdateScope::Player(region, name),
        (Some(region), None) => UpdateScope::Region(region),
        (None, _) => UpdateScope::All,
    };

    let champion = champion_id(config)?;
    let client = api_client(config)?;
    let (path, mut store) = open_store(config)?;

    if store.is_empty() {
        println!(
            "{} No players tracked yet. Run 'champlb add <region> <names...>' first.",
            style("!").yellow()
        );
        return Ok(());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(match &scope {
        UpdateScope::All => format!("Updating {} players...", store.len()),
        UpdateScope::Region(r) => format!("Updating players in {}...", r),
        UpdateScope::Player(r, n) => format!("Updating {} in {}...", n, r),
    });
    pb.enable_steady_tick(Duration::from_millis(100));

    let report = update_mastery(&client, &mut store, &scope, champion).await;
    pb.finish_and_clear();

    commit_store(&path, &store)?;

    for change in report.succeeded.iter().filter(|c| c.delta() != 0) {
        println!(
            "  {} {} ({}) {} → {} ({:+})",
            style("↑").green(),
            change.name,
            change.region,
            change.previous,
            change.current,
            change.delta()
        );
    }
    print_failures(&report);

    for (region, stats) in client.tracker().get_stats().await {
        info!(
            "{}: {} calls, throttled {} times, {} server rate limits",
            region, stats.total_calls, stats.throttle_count, stats.rate_limit_hits
        );
    }

    println!(
        "\n{} Updated {} of {} players",
        if report.is_clean() {
            style("✓").green()
        } else {
            style("!").yellow()
        },
        report.succeeded.len(),
        report.total()
    );

    Ok(())
}
