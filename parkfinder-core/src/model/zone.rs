use serde::{Deserialize, Serialize};

use super::Coordinate;

/// On-street parking zone from the points-of-interest feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub location: Coordinate,
    pub address: String,
    /// Free text the category is derived from
    pub raw_description: String,
}

impl Zone {
    pub fn new(
        name: impl Into<String>,
        location: Coordinate,
        address: impl Into<String>,
        raw_description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            address: address.into(),
            raw_description: raw_description.into(),
        }
    }

    /// Never stored, always recomputed from the description.
    pub fn category(&self) -> ZoneCategory {
        crate::algo::classify::classify(&self.raw_description)
    }
}

/// Posted restriction type of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneCategory {
    ExtendedBlue,
    WhiteManaged,
    Handicapped,
    Unclassified,
}

impl ZoneCategory {
    pub const ALL: [ZoneCategory; 4] = [
        ZoneCategory::ExtendedBlue,
        ZoneCategory::WhiteManaged,
        ZoneCategory::Handicapped,
        ZoneCategory::Unclassified,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ZoneCategory::ExtendedBlue => "EXTENDED_BLUE",
            ZoneCategory::WhiteManaged => "WHITE_MANAGED",
            ZoneCategory::Handicapped => "HANDICAPPED",
            ZoneCategory::Unclassified => "UNCLASSIFIED",
        }
    }
}

impl std::fmt::Display for ZoneCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
