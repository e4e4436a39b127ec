//! In-memory leaderboard, partitioned by region and keyed by normalized name.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use super::LeaderboardError;
use crate::batch::BatchReport;
use crate::models::{normalize_name, PlayerRecord, Region};

/// Records of a single region, in insertion order.
pub type Partition = IndexMap<String, PlayerRecord>;

/// Outcome of merging fetched records into a region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub inserted: usize,
    pub updated: usize,
    pub rejected: usize,
}

/// Every tracked player, grouped by region.
///
/// Keys within a region are never empty and always equal the normalized
/// form of the record's current name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LeaderboardStore {
    regions: BTreeMap<Region, Partition>,
}

impl LeaderboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted partitions, re-keying records by name.
    ///
    /// Records with an empty name are dropped.
    pub fn from_partitions(partitions: BTreeMap<Region, Partition>) -> Self {
        let mut store = Self::new();
        for (region, partition) in partitions {
            for (stored_key, record) in partition {
                if record.key() != stored_key {
                    debug!(
                        "Re-keying {} record '{}' as '{}'",
                        region,
                        stored_key,
                        record.key()
                    );
                }
                let name = record.name.clone();
                match store.add(region, record) {
                    Ok(Some(previous)) => warn!(
                        "Stored records '{}' and '{}' in {} share a key; dropping '{}'",
                        previous.name, name, region, previous.name
                    ),
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Dropping stored record '{}' in {}: {}", stored_key, region, e)
                    }
                }
            }
        }
        store
    }

    /// Insert a record, overwriting any record with the same key.
    ///
    /// The record's region is set to `region`. Returns the record it replaced.
    pub fn add(
        &mut self,
        region: Region,
        mut record: PlayerRecord,
    ) -> Result<Option<PlayerRecord>, LeaderboardError> {
        let key = record.key();
        if key.is_empty() {
            return Err(LeaderboardError::InvalidName(record.name));
        }
        record.region = region;
        Ok(self.regions.entry(region).or_default().insert(key, record))
    }

    /// Remove a player. `name` may be a display name or a key.
    pub fn remove(&mut self, region: Region, name: &str) -> Result<PlayerRecord, LeaderboardError> {
        let key = normalize_name(name);
        let removed = self
            .regions
            .get_mut(&region)
            .and_then(|p| p.shift_remove(&key))
            .ok_or_else(|| LeaderboardError::missing(region, &key))?;

        if self.regions.get(&region).is_some_and(|p| p.is_empty()) {
            self.regions.remove(&region);
        }
        Ok(removed)
    }

    /// Remove several players; absent ones are reported, not fatal.
    pub fn remove_many(
        &mut self,
        region: Region,
        names: &[String],
    ) -> BatchReport<PlayerRecord, LeaderboardError> {
        let mut report = BatchReport::new();
        for name in names {
            match self.remove(region, name) {
                Ok(record) => report.push_success(record),
                Err(e) => report.push_failure(name.clone(), e),
            }
        }
        report
    }

    /// Set the mastery score of an existing player.
    pub fn update_mastery(
        &mut self,
        region: Region,
        name: &str,
        mastery: u64,
    ) -> Result<(), LeaderboardError> {
        let key = normalize_name(name);
        let record = self
            .regions
            .get_mut(&region)
            .and_then(|p| p.get_mut(&key))
            .ok_or_else(|| LeaderboardError::missing(region, &key))?;
        record.mastery = mastery;
        Ok(())
    }

    /// Apply freshly fetched records to a region.
    ///
    /// Known players are refreshed in place, new ones are appended, and
    /// players absent from `records` are left alone.
    pub fn merge(
        &mut self,
        region: Region,
        records: impl IntoIterator<Item = PlayerRecord>,
    ) -> MergeSummary {
        let mut summary = MergeSummary::default();
        for record in records {
            match self.add(region, record) {
                Ok(Some(_)) => summary.updated += 1,
                Ok(None) => summary.inserted += 1,
                Err(e) => {
                    warn!("Skipping fetched record in {}: {}", region, e);
                    summary.rejected += 1;
                }
            }
        }
        summary
    }

    pub fn get(&self, region: Region, name: &str) -> Option<&PlayerRecord> {
        self.regions.get(&region)?.get(&normalize_name(name))
    }

    /// Every record, or only those of one region, in store order.
    pub fn all_records(&self, region: Option<Region>) -> Vec<PlayerRecord> {
        self.regions
            .iter()
            .filter(|(r, _)| region.map_or(true, |wanted| **r == wanted))
            .flat_map(|(_, partition)| partition.values().cloned())
            .collect()
    }

    /// Regions that hold at least one record.
    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.regions.keys().copied()
    }

    pub fn partitions(&self) -> &BTreeMap<Region, Partition> {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.values().map(|p| p.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SummonerId;

    fn player(id: &str, name: &str, mastery: u64) -> PlayerRecord {
        PlayerRecord::new(SummonerId::new(id), Region::Na, name).with_mastery(mastery)
    }

    #[test]
    fn test_add_and_get() {
        let mut store = LeaderboardStore::new();
        assert!(store.add(Region::Euw, player("1", "Big Name", 10)).unwrap().is_none());

        let record = store.get(Region::Euw, "bigname").unwrap();
        assert_eq!(record.region, Region::Euw);
        assert_eq!(record.name, "Big Name");
        assert!(store.get(Region::Na, "bigname").is_none());
    }

    #[test]
    fn test_add_overwrites_same_key() {
        let mut store = LeaderboardStore::new();
        store.add(Region::Na, player("1", "Foo Bar", 10)).unwrap();
        store.add(Region::Na, player("2", "Other", 20)).unwrap();
        let previous = store.add(Region::Na, player("1", "foobar", 99)).unwrap();

        assert_eq!(previous.unwrap().mastery, 10);
        assert_eq!(store.len(), 2);
        let names: Vec<_> = store.all_records(None).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["foobar", "Other"]);
    }

    #[test]
    fn test_add_rejects_blank_name() {
        let mut store = LeaderboardStore::new();
        let err = store.add(Region::Na, player("1", "  ", 0)).unwrap_err();
        assert!(matches!(err, LeaderboardError::InvalidName(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_missing_leaves_store_unchanged() {
        let mut store = LeaderboardStore::new();
        store.add(Region::Na, player("1", "Foo", 10)).unwrap();
        let before = store.clone();

        let err = store.remove(Region::Na, "bar").unwrap_err();
        assert!(matches!(err, LeaderboardError::MissingRecord { .. }));
        let err = store.remove(Region::Euw, "foo").unwrap_err();
        assert!(matches!(err, LeaderboardError::MissingRecord { .. }));
        assert_eq!(store, before);
    }

    #[test]
    fn test_remove_many_reports_missing() {
        let mut store = LeaderboardStore::new();
        store.add(Region::Na, player("1", "Foo", 10)).unwrap();
        store.add(Region::Na, player("2", "Bar", 10)).unwrap();

        let report = store.remove_many(
            Region::Na,
            &["FOO".to_string(), "ghost".to_string(), "bar".to_string()],
        );
        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].item, "ghost");
        assert!(store.is_empty());
        assert_eq!(store.regions().count(), 0);
    }

    #[test]
    fn test_update_mastery() {
        let mut store = LeaderboardStore::new();
        store.add(Region::Na, player("1", "Foo", 10)).unwrap();
        store.update_mastery(Region::Na, "Foo", 500).unwrap();
        assert_eq!(store.get(Region::Na, "foo").unwrap().mastery, 500);
        assert_eq!(store.get(Region::Na, "foo").unwrap().name, "Foo");
    }

    #[test]
    fn test_update_missing_leaves_store_unchanged() {
        let mut store = LeaderboardStore::new();
        store.add(Region::Na, player("1", "Foo", 10)).unwrap();
        let before = store.clone();

        let err = store.update_mastery(Region::Na, "nobody", 1).unwrap_err();
        assert!(matches!(err, LeaderboardError::MissingRecord { .. }));
        assert_eq!(store, before);
    }

    #[test]
    fn test_merge_keeps_untouched_players() {
        let mut store = LeaderboardStore::new();
        store.add(Region::Na, player("1", "Foo", 10)).unwrap();
        store.add(Region::Na, player("2", "Bar", 20)).unwrap();

        let summary = store.merge(
            Region::Na,
            vec![player("1", "Foo", 15), player("3", "Baz", 30), player("4", "", 1)],
        );
        assert_eq!(
            summary,
            MergeSummary {
                inserted: 1,
                updated: 1,
                rejected: 1
            }
        );
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(Region::Na, "foo").unwrap().mastery, 15);
        assert_eq!(store.get(Region::Na, "bar").unwrap().mastery, 20);
    }

    #[test]
    fn test_all_records_filter() {
        let mut store = LeaderboardStore::new();
        store.add(Region::Na, player("1", "Foo", 10)).unwrap();
        store.add(Region::Euw, player("2", "Bar", 20)).unwrap();

        assert_eq!(store.all_records(None).len(), 2);
        let euw = store.all_records(Some(Region::Euw));
        assert_eq!(euw.len(), 1);
        assert_eq!(euw[0].name, "Bar");
        assert!(store.all_records(Some(Region::Kr)).is_empty());
    }

    #[test]
    fn test_from_partitions_rekeys() {
        let mut partition = Partition::new();
        partition.insert("stale".to_string(), player("1", "Fresh Name", 10));
        partition.insert("blank".to_string(), player("2", "", 10));
        let store = LeaderboardStore::from_partitions(BTreeMap::from([(Region::Oce, partition)]));

        assert_eq!(store.len(), 1);
        let record = store.get(Region::Oce, "freshname").unwrap();
        assert_eq!(record.region, Region::Oce);
    }

    #[test]
    fn test_from_partitions_colliding_keys_keep_last() {
        let mut partition = Partition::new();
        partition.insert("bigname".to_string(), player("1", "Big Name", 10));
        partition.insert("big name".to_string(), player("2", "BigName", 20));
        let store = LeaderboardStore::from_partitions(BTreeMap::from([(Region::Na, partition)]));

        assert_eq!(store.len(), 1);
        let record = store.get(Region::Na, "bigname").unwrap();
        assert_eq!(record.id, SummonerId::new("2"));
        assert_eq!(record.mastery, 20);
    }
}
