use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Operating state as published by the occupancy feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FacilityState {
    Open,
    Closed,
}

impl FacilityState {
    /// Only the feed's `offen` marks a garage as open.
    pub fn from_raw(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("offen") {
            FacilityState::Open
        } else {
            FacilityState::Closed
        }
    }
}

/// Parking garage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    /// Display name, unique within one data pull
    pub name: String,
    pub location: Coordinate,
    pub state: FacilityState,
    /// `None` when the feed did not report a count
    pub free_spaces: Option<u32>,
    pub total_spaces: Option<u32>,
}

impl Facility {
    pub fn new(name: impl Into<String>, location: Coordinate, state: FacilityState) -> Self {
        Self {
            name: name.into(),
            location,
            state,
            free_spaces: None,
            total_spaces: None,
        }
    }

    #[must_use]
    pub fn with_spaces(mut self, free: Option<u32>, total: Option<u32>) -> Self {
        self.free_spaces = free;
        self.total_spaces = total;
        self
    }

    pub fn is_open(&self) -> bool {
        self.state == FacilityState::Open
    }
}
