//! Data model for parking search
//!
//! Garages and zones are rebuilt from every data pull and never persisted.

mod coordinate;
mod facility;
mod zone;

pub use coordinate::Coordinate;
pub use facility::{Facility, FacilityState};
pub use zone::{Zone, ZoneCategory};

/// One materialized data pull: the garages and zones a search runs over.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub facilities: Vec<Facility>,
    pub zones: Vec<Zone>,
}

impl Snapshot {
    pub fn new(facilities: Vec<Facility>, zones: Vec<Zone>) -> Self {
        Self { facilities, zones }
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty() && self.zones.is_empty()
    }
}
