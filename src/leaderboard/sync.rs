//! Fetch-and-merge operations that combine the API client with the store.

use std::collections::BTreeMap;

use futures::future::join_all;
use tracing::{debug, info, warn};

use super::store::LeaderboardStore;
use super::LeaderboardError;
use crate::api::ApiClient;
use crate::batch::BatchReport;
use crate::models::{PlayerRecord, Region, SummonerId};

/// Which players an update touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateScope {
    All,
    Region(Region),
    Player(Region, String),
}

/// A mastery score that was refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasteryChange {
    pub region: Region,
    pub name: String,
    pub previous: u64,
    pub current: u64,
}

impl MasteryChange {
    pub fn delta(&self) -> i128 {
        self.current as i128 - self.previous as i128
    }
}

struct Target {
    key: String,
    name: String,
    id: SummonerId,
    previous: u64,
}

/// Resolve usernames in one region and add them to the store.
///
/// Existing players are overwritten with the fresh lookup. With a champion
/// id, mastery is fetched before the record is stored; a player whose
/// mastery cannot be fetched is not added. Only records the store accepted
/// are reported as succeeded.
pub async fn add_players(
    client: &ApiClient,
    store: &mut LeaderboardStore,
    region: Region,
    usernames: &[String],
    champion_id: Option<u32>,
) -> BatchReport<PlayerRecord, LeaderboardError> {
    let resolved = client.resolve_users(region, usernames, champion_id).await;

    let mut report = BatchReport::new();
    for failure in resolved.failed {
        report.push_failure(failure.item, failure.error.into());
    }

    let (mut inserted, mut updated) = (0, 0);
    for record in resolved.succeeded {
        match store.add(region, record.clone()) {
            Ok(previous) => {
                if previous.is_some() {
                    updated += 1;
                } else {
                    inserted += 1;
                }
                report.push_success(record);
            }
            Err(e) => {
                warn!("Not adding summoner {} in {}: {}", record.id, region, e);
                report.push_failure(record.name, e);
            }
        }
    }

    info!(
        "Added {} new and refreshed {} existing players in {}",
        inserted, updated, region
    );
    report
}

/// Refresh mastery scores for the players selected by `scope`.
///
/// Regions are fetched concurrently; players within a region one at a
/// time. Scores are written to the store only after every fetch finished.
pub async fn update_mastery(
    client: &ApiClient,
    store: &mut LeaderboardStore,
    scope: &UpdateScope,
    champion_id: u32,
) -> BatchReport<MasteryChange, LeaderboardError> {
    let mut report = BatchReport::new();
    let mut targets: BTreeMap<Region, Vec<Target>> = BTreeMap::new();

    let selected: Vec<PlayerRecord> = match scope {
        UpdateScope::All => store.all_records(None),
        UpdateScope::Region(region) => store.all_records(Some(*region)),
        UpdateScope::Player(region, name) => match store.get(*region, name) {
            Some(record) => vec![record.clone()],
            None => {
                let err = LeaderboardError::missing(*region, name);
                report.push_failure(name.clone(), err);
                return report;
            }
        },
    };

    for record in selected {
        targets.entry(record.region).or_default().push(Target {
            key: record.key(),
            name: record.name,
            id: record.id,
            previous: record.mastery,
        });
    }

    let fetches = targets.into_iter().map(|(region, players)| async move {
        debug!("Updating {} players in {}", players.len(), region);
        let mut results = Vec::with_capacity(players.len());
        for target in players {
            let result = client.fetch_mastery(region, champion_id, &target.id).await;
            results.push((region, target, result));
        }
        results
    });

    for (region, target, result) in join_all(fetches).await.into_iter().flatten() {
        let mastery = match result {
            Ok(mastery) => mastery,
            Err(e) => {
                report.push_failure(target.name, e.into());
                continue;
            }
        };

        match store.update_mastery(region, &target.key, mastery) {
            Ok(()) => report.push_success(MasteryChange {
                region,
                name: target.name,
                previous: target.previous,
                current: mastery,
            }),
            Err(e) => report.push_failure(target.name, e),
        }
    }

    info!(
        "Updated mastery for {} of {} players",
        report.succeeded.len(),
        report.total()
    );
    report
}
