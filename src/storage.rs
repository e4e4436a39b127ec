//! Loading and saving the leaderboard data file.
//!
//! The file is a JSON object keyed by region, each holding an object keyed by
//! normalized name:
//!
//! ```json
//! { "euw": { "heavylobster": { "id": "123", "region": "euw", "name": "Heavy Lobster", "mastery": 4200 } } }
//! ```

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::leaderboard::{LeaderboardStore, Partition};
use crate::models::Region;

/// Errors reading or writing the data file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed data file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize leaderboard: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Load the store from `path`. A missing file is an empty store.
pub fn load_store(path: &Path) -> Result<LeaderboardStore, StorageError> {
    if !path.exists() {
        info!("No data file at {}, starting empty", path.display());
        return Ok(LeaderboardStore::new());
    }

    let contents = std::fs::read_to_string(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if contents.trim().is_empty() {
        return Ok(LeaderboardStore::new());
    }

    let partitions: BTreeMap<Region, Partition> =
        serde_json::from_str(&contents).map_err(|source| StorageError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let store = LeaderboardStore::from_partitions(partitions);
    debug!("Loaded {} players from {}", store.len(), path.display());
    Ok(store)
}

/// Write the store to `path`, replacing the old file atomically.
pub fn save_store(path: &Path, store: &LeaderboardStore) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(store)?;

    let write_err = |source: std::io::Error| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(json.as_bytes()).map_err(write_err)?;
    tmp.write_all(b"\n").map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!("Saved {} players to {}", store.len(), path.display());
    Ok(())
}
