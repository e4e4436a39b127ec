//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod players;
mod rank;
mod update;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use champlb::config::Config;
use champlb::models::Region;

#[derive(Parser)]
#[command(name = "champlb")]
#[command(about = "Champion mastery leaderboard for the Riot Games API")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Leaderboard data file (overrides config file)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Look up summoners and add them to the leaderboard
    Add {
        /// Region the summoners play in
        region: Region,
        /// Summoner names
        #[arg(required = true)]
        names: Vec<String>,
        /// Add with zero mastery instead of fetching it now
        #[arg(long)]
        no_fetch: bool,
    },

    /// Remove summoners from the leaderboard
    Remove {
        /// Region the summoners are tracked in
        region: Region,
        /// Summoner names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Refresh mastery scores (all players, one region, or one player)
    Update {
        /// Only update this region
        region: Option<Region>,
        /// Only update this summoner (requires region)
        name: Option<String>,
    },

    /// Show the leaderboard, highest mastery first
    Rank {
        /// Only show this region
        #[arg(short, long)]
        region: Option<Region>,
        /// Show at most this many entries (0 = all)
        #[arg(short, long, default_value = "0")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List supported regions
    Regions,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path).await?,
        None => Config::load().await?,
    };
    if let Some(data) = cli.data {
        config.data_file = data;
    }

    match cli.command {
        Commands::Add {
            region,
            names,
            no_fetch,
        } => players::cmd_add(&config, region, &names, no_fetch).await,
        Commands::Remove { region, names } => players::cmd_remove(&config, region, &names),
        Commands::Update { region, name } => update::cmd_update(&config, region, name).await,
        Commands::Rank {
            region,
            limit,
            json,
        } => rank::cmd_rank(&config, region, limit, json),
        Commands::Regions => rank::cmd_regions(),
    }
}
