use log::debug;
use serde::Serialize;

use crate::{Coordinate, Error, Facility, Meters, WALKING_SPEED_MPS};

/// Walking distance and time between two points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WalkEstimate {
    pub distance_m: Meters,
    pub minutes: f64,
}

impl WalkEstimate {
    pub fn from_distance(distance_m: Meters) -> Self {
        Self {
            distance_m,
            minutes: distance_m / WALKING_SPEED_MPS / 60.0,
        }
    }
}

/// Straight-line walk between two points.
///
/// # Errors
///
/// [`Error::NotLocatable`] when either end has no usable position.
pub fn walk_between(from: Coordinate, to: Coordinate) -> Result<WalkEstimate, Error> {
    if !from.is_locatable() || !to.is_locatable() {
        return Err(Error::NotLocatable);
    }
    Ok(WalkEstimate::from_distance(from.distance_to(&to)))
}

/// The selected garage together with the walk to the destination.
/// Distance lives here, never on the shared record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NearestFacility<'a> {
    pub facility: &'a Facility,
    pub distance_m: Meters,
    pub walking_minutes: f64,
}

/// Closest open garage to `destination`.
///
/// Closed and unlocatable garages are never candidates. On equal
/// distance the garage that comes first in `facilities` wins.
///
/// # Errors
///
/// [`Error::NoDestination`] without a destination,
/// [`Error::NoOpenFacility`] when no candidate is left.
pub fn nearest_open_facility<'a, I>(
    facilities: I,
    destination: Option<Coordinate>,
) -> Result<NearestFacility<'a>, Error>
where
    I: IntoIterator<Item = &'a Facility>,
{
    let destination = destination.ok_or(Error::NoDestination)?;

    let mut best: Option<(&Facility, Meters)> = None;
    for facility in facilities {
        if !facility.is_open() || !facility.location.is_locatable() {
            continue;
        }
        let distance = facility.location.distance_to(&destination);
        // strict comparison keeps the earlier record on ties
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((facility, distance));
        }
    }

    let (facility, distance_m) = best.ok_or(Error::NoOpenFacility)?;
    let walk = WalkEstimate::from_distance(distance_m);
    debug!(
        "Nearest open facility: {} at {:.0} m ({:.1} min walk)",
        facility.name, walk.distance_m, walk.minutes
    );

    Ok(NearestFacility {
        facility,
        distance_m: walk.distance_m,
        walking_minutes: walk.minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FacilityState;

    const DEST: Coordinate = Coordinate::new(9.3767, 47.4245);

    fn garage(name: &str, lon: f64, lat: f64, state: FacilityState) -> Facility {
        Facility::new(name, Coordinate::new(lon, lat), state)
    }

    #[test]
    fn picks_minimum_distance() {
        let data = vec![
            garage("Far", 9.3900, 47.4300, FacilityState::Open),
            garage("Near", 9.3770, 47.4247, FacilityState::Open),
            garage("Middle", 9.3701, 47.4232, FacilityState::Open),
        ];
        let nearest = nearest_open_facility(&data, Some(DEST)).unwrap();
        assert_eq!(nearest.facility.name, "Near");
        for other in &data {
            assert!(nearest.distance_m <= other.location.distance_to(&DEST));
        }
    }

    #[test]
    fn closed_garage_is_skipped_even_when_closest() {
        let data = vec![
            garage("Closed", 9.3767, 47.4245, FacilityState::Closed),
            garage("Open", 9.3701, 47.4232, FacilityState::Open),
        ];
        let nearest = nearest_open_facility(&data, Some(DEST)).unwrap();
        assert_eq!(nearest.facility.name, "Open");
    }

    #[test]
    fn ties_go_to_the_first_record() {
        let data = vec![
            garage("First", 9.3770, 47.4247, FacilityState::Open),
            garage("Second", 9.3770, 47.4247, FacilityState::Open),
        ];
        let nearest = nearest_open_facility(&data, Some(DEST)).unwrap();
        assert_eq!(nearest.facility.name, "First");
    }

    #[test]
    fn walking_time_uses_pedestrian_speed() {
        let walk = WalkEstimate::from_distance(660.0);
        assert!((walk.minutes - 10.0).abs() < 1e-9);
    }

    #[test]
    fn walk_needs_two_locatable_points() {
        let origin = Coordinate::new(9.3701, 47.4232);
        let walk = walk_between(origin, DEST).unwrap();
        assert!((walk.distance_m - origin.distance_to(&DEST)).abs() < 1e-9);
        assert!(matches!(
            walk_between(Coordinate::new(0.0, 0.0), DEST),
            Err(Error::NotLocatable)
        ));
    }

    #[test]
    fn reports_missing_destination_and_no_candidates() {
        let data = vec![garage("Closed", 9.3767, 47.4245, FacilityState::Closed)];
        assert!(matches!(
            nearest_open_facility(&data, None),
            Err(Error::NoDestination)
        ));
        assert!(matches!(
            nearest_open_facility(&data, Some(DEST)),
            Err(Error::NoOpenFacility)
        ));
        let empty: Vec<Facility> = Vec::new();
        assert!(matches!(
            nearest_open_facility(&empty, Some(DEST)),
            Err(Error::NoOpenFacility)
        ));
    }

    #[test]
    fn input_records_are_untouched() {
        let data = vec![garage("Only", 9.3770, 47.4247, FacilityState::Open)];
        let before = data.clone();
        let _ = nearest_open_facility(&data, Some(DEST));
        assert_eq!(data, before);
    }
}
