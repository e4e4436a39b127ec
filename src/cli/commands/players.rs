//! Player management commands.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use champlb::config::Config;
use champlb::leaderboard::add_players;
use champlb::models::Region;

use crate::cli::helpers::{api_client, champion_id, commit_store, open_store, print_failures};

/// Resolve summoners and add them to the leaderboard.
pub async fn cmd_add(
    config: &Config,
    region: Region,
    names: &[String],
    no_fetch: bool,
) -> anyhow::Result<()> {
    let champion = if no_fetch {
        None
    } else {
        Some(champion_id(config)?)
    };
    let client = api_client(config)?;
    let (path, mut store) = open_store(config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Looking up {} summoners in {}...", names.len(), region));
    pb.enable_steady_tick(Duration::from_millis(100));

    let report = add_players(&client, &mut store, region, names, champion).await;
    pb.finish_and_clear();

    commit_store(&path, &store)?;

    for record in &report.succeeded {
        println!(
            "  {} {} ({}) {}",
            style("✓").green(),
            record.name,
            region.as_str().to_uppercase(),
            style(format!("{} points", record.mastery)).dim()
        );
    }
    print_failures(&report);

    println!(
        "\n{} Added {} of {} summoners to {}",
        if report.is_clean() {
            style("✓").green()
        } else {
            style("!").yellow()
        },
        report.succeeded.len(),
        names.len(),
        path.display()
    );

    Ok(())
}

/// Remove summoners from the leaderboard.
pub fn cmd_remove(config: &Config, region: Region, names: &[String]) -> anyhow::Result<()> {
    let (path, mut store) = open_store(config)?;

    let report = store.remove_many(region, names);
    if !report.succeeded.is_empty() {
        commit_store(&path, &store)?;
    }

    for record in &report.succeeded {
        println!("  {} Removed {}", style("✓").green(), record.name);
    }
    print_failures(&report);

    println!(
        "\n{} Removed {} of {} summoners",
        if report.is_clean() {
            style("✓").green()
        } else {
            style("!").yellow()
        },
        report.succeeded.len(),
        names.len()
    );

    Ok(())
}
