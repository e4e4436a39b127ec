//! Deterministic ordering of leaderboard records.

use serde::Serialize;

use super::store::LeaderboardStore;
use crate::models::{PlayerRecord, Region};

/// One row of the ranked view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// 1-based position.
    pub position: usize,
    pub region: Region,
    pub name: String,
    pub mastery: u64,
}

/// Sort records by mastery, highest first.
///
/// The sort is stable: equal scores keep their incoming order, so repeated
/// runs over the same data produce the same ranking.
pub fn rank(mut records: Vec<PlayerRecord>) -> Vec<PlayerRecord> {
    records.sort_by(|a, b| b.mastery.cmp(&a.mastery));
    records
}

/// Ranked view of a store, optionally limited to one region.
pub fn standings(store: &LeaderboardStore, region: Option<Region>) -> Vec<Standing> {
    rank(store.all_records(region))
        .into_iter()
        .enumerate()
        .map(|(i, record)| Standing {
            position: i + 1,
            region: record.region,
            name: record.name,
            mastery: record.mastery,
        })
        .collect()
}
