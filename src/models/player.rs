//! Tracked player records.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::region::Region;

/// Derive the lookup key for a display name: lowercased, whitespace removed.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Opaque remote identifier for a summoner.
///
/// Older data files store ids as integers, newer API versions hand out
/// strings. Both deserialize; serialization is always a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SummonerId(String);

impl SummonerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SummonerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SummonerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SummonerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => SummonerId(s),
            RawId::Number(n) => SummonerId(n.to_string()),
        })
    }
}

/// A player on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: SummonerId,
    pub region: Region,
    /// Display name as returned by the API.
    pub name: String,
    /// Mastery points on the tracked champion. Zero until first fetched.
    #[serde(default)]
    pub mastery: u64,
}

impl PlayerRecord {
    pub fn new(id: SummonerId, region: Region, name: impl Into<String>) -> Self {
        Self {
            id,
            region,
            name: name.into(),
            mastery: 0,
        }
    }

    pub fn with_mastery(mut self, mastery: u64) -> Self {
        self.mastery = mastery;
        self
    }

    /// Lookup key within the record's region, always derived from `name`.
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }
}
