pub use crate::WALKING_SPEED_MPS;

// Re-export key components
pub use crate::algo::classify::classify;
pub use crate::algo::nearest::{
    NearestFacility, WalkEstimate, nearest_open_facility, walk_between,
};
pub use crate::algo::radius::{Locatable, filter_by_radius};
pub use crate::loading::{SnapshotFormat, load_facilities, load_zones};
pub use crate::search::{
    CategoryCounts, ClassifiedZone, SearchRequest, SearchResult, Visibility, search,
};
pub use crate::tariff::{
    DurationRounding, FacilityTariff, FeeResult, StayBreakdown, TariffSchedule, TariffTable, Tier,
    parse_local_datetime, stay_hours,
};

// Core value types
pub use crate::model::{Coordinate, Facility, FacilityState, Snapshot, Zone, ZoneCategory};
pub use crate::{Error, Hours, Meters};
