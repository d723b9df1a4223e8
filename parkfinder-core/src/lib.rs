//! Parking search and tariff engine for the St. Gallen garage network.
//!
//! The crate works on materialized snapshots only: callers fetch garage
//! occupancy and zone records, decode them with [`loading`], and hand them
//! to the pure functions in [`algo`], [`tariff`] and [`search`].

pub mod algo;
mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod search;
pub mod tariff;

pub use error::Error;

pub use algo::classify::classify;
pub use algo::nearest::{NearestFacility, WalkEstimate, nearest_open_facility, walk_between};
pub use algo::radius::{Locatable, filter_by_radius};
pub use model::{Coordinate, Facility, FacilityState, Snapshot, Zone, ZoneCategory};
pub use search::{SearchRequest, SearchResult, Visibility, search};
pub use tariff::{FeeResult, TariffSchedule, TariffTable};

/// Distance in meters
pub type Meters = f64;
/// Stay length in (possibly fractional) hours
pub type Hours = f64;

/// Assumed pedestrian speed for walking-time estimates
pub const WALKING_SPEED_MPS: f64 = 1.1;
