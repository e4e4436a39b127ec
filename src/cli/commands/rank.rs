//! Leaderboard display commands.

use console::style;

use champlb::config::Config;
use champlb::leaderboard::standings;
use champlb::models::Region;

use crate::cli::helpers::open_store;

/// Print the ranked leaderboard.
pub fn cmd_rank(
    config: &Config,
    region: Option<Region>,
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let (_, store) = open_store(config)?;

    let mut ranked = standings(&store, region);
    if limit > 0 {
        ranked.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    if ranked.is_empty() {
        println!("{} No players tracked", style("!").yellow());
        return Ok(());
    }

    for standing in ranked {
        println!(
            "{:>4}  {:<24} {:<5} {:>12}",
            standing.position,
            standing.name,
            standing.region.as_str().to_uppercase(),
            standing.mastery
        );
    }

    Ok(())
}

/// List supported regions and their API hosts.
pub fn cmd_regions() -> anyhow::Result<()> {
    println!("{:<6} Host", "Region");
    for region in Region::ALL {
        println!("{:<6} {}", region.as_str(), region.host());
    }
    Ok(())
}
