//! Riot API regions (upstream partitions).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A region of the Riot API. Each region has its own platform host and quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Br,
    Eune,
    Euw,
    Jp,
    Kr,
    Lan,
    Las,
    Na,
    Oce,
    Tr,
    Ru,
    Pbe,
}

impl Region {
    /// Every supported region, in catalogue order.
    pub const ALL: [Region; 12] = [
        Region::Br,
        Region::Eune,
        Region::Euw,
        Region::Jp,
        Region::Kr,
        Region::Lan,
        Region::Las,
        Region::Na,
        Region::Oce,
        Region::Tr,
        Region::Ru,
        Region::Pbe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Br => "br",
            Self::Eune => "eune",
            Self::Euw => "euw",
            Self::Jp => "jp",
            Self::Kr => "kr",
            Self::Lan => "lan",
            Self::Las => "las",
            Self::Na => "na",
            Self::Oce => "oce",
            Self::Tr => "tr",
            Self::Ru => "ru",
            Self::Pbe => "pbe",
        }
    }

    /// Platform identifier used in the API host name.
    pub fn platform(&self) -> &'static str {
        match self {
            Self::Br => "br1",
            Self::Eune => "eun1",
            Self::Euw => "euw1",
            Self::Jp => "jp1",
            Self::Kr => "kr",
            Self::Lan => "la1",
            Self::Las => "la2",
            Self::Na => "na1",
            Self::Oce => "oc1",
            Self::Tr => "tr1",
            Self::Ru => "ru",
            Self::Pbe => "pbe1",
        }
    }

    /// Base URL for API calls against this region.
    pub fn host(&self) -> String {
        format!("https://{}.api.riotgames.com", self.platform())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a region name is not in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown region '{0}' (expected one of: br, eune, euw, jp, kr, lan, las, na, oce, tr, ru, pbe)")]
pub struct RegionParseError(pub String);

impl FromStr for Region {
    type Err = RegionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Region::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| RegionParseError(s.to_string()))
    }
}
