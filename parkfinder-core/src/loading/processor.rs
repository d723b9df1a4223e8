use log::warn;

use super::raw_types::{RawFacility, RawGeoPoint, RawZone};
use crate::{Coordinate, Facility, FacilityState, Zone};

const MISSING_NAME: &str = "No Name Provided";

pub(super) fn facility_from_raw(raw: RawFacility) -> Facility {
    let name = raw
        .phname
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| MISSING_NAME.to_string());

    let location = coordinate_or_origin(raw.standort, &name);
    let state = FacilityState::from_raw(raw.phstate.as_deref().unwrap_or_default());

    Facility {
        free_spaces: space_count(raw.shortfree, &name, "free"),
        total_spaces: space_count(raw.shortmax, &name, "total"),
        name,
        location,
        state,
    }
}

pub(super) fn zone_from_raw(raw: RawZone) -> Zone {
    let name = raw
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| MISSING_NAME.to_string());
    let location = coordinate_or_origin(raw.geo_point_2d, &name);

    Zone {
        location,
        address: raw.adresse.unwrap_or_default(),
        raw_description: raw.informatio.unwrap_or_default(),
        name,
    }
}

/// Missing positions become (0, 0), which the filters treat as not locatable.
fn coordinate_or_origin(point: Option<RawGeoPoint>, name: &str) -> Coordinate {
    if let Some(RawGeoPoint { lat, lon }) = point {
        Coordinate::new(lon, lat)
    } else {
        warn!("Record '{name}' has no position");
        Coordinate::new(0.0, 0.0)
    }
}

fn space_count(raw: Option<i64>, name: &str, kind: &str) -> Option<u32> {
    let value = raw?;
    u32::try_from(value)
        .inspect_err(|_| warn!("Invalid {kind} space count {value} for '{name}'"))
        .ok()
}
