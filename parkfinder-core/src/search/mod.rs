//! Request-scoped search over one snapshot.
//!
//! A search runs radius filtering, zone classification, nearest-garage
//! selection and pricing in sequence. Each step that cannot produce an
//! answer leaves its error in the result and the remaining steps still run.

mod to_geojson;

use chrono::NaiveDateTime;
use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::algo::nearest::{NearestFacility, WalkEstimate, nearest_open_facility, walk_between};
use crate::algo::radius::filter_by_radius;
use crate::{
    Coordinate, Error, Facility, FeeResult, Hours, Meters, Snapshot, TariffTable, Zone,
    ZoneCategory,
};

/// Planned stay at the selected garage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stay {
    pub arrival: NaiveDateTime,
    pub duration_hours: Hours,
}

/// Inputs of one search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub destination: Option<Coordinate>,
    pub origin: Option<Coordinate>,
    pub radius_m: Meters,
    /// Only keep garages reporting at least one free space
    pub free_only: bool,
    pub stay: Option<Stay>,
}

impl SearchRequest {
    pub fn around(destination: Option<Coordinate>, radius_m: Meters) -> Self {
        Self {
            destination,
            origin: None,
            radius_m,
            free_only: false,
            stay: None,
        }
    }

    #[must_use]
    pub fn free_only(mut self, free_only: bool) -> Self {
        self.free_only = free_only;
        self
    }

    #[must_use]
    pub fn from_origin(mut self, origin: Option<Coordinate>) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn staying(mut self, arrival: NaiveDateTime, duration_hours: Hours) -> Self {
        self.stay = Some(Stay {
            arrival,
            duration_hours,
        });
        self
    }
}

/// Which classified categories a map should draw. The classifier always
/// runs; this only affects rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Visibility {
    pub facilities: bool,
    pub extended_blue: bool,
    pub white_managed: bool,
    pub handicapped: bool,
    pub unclassified: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            facilities: true,
            extended_blue: true,
            white_managed: true,
            handicapped: true,
            unclassified: false,
        }
    }
}

impl Visibility {
    pub fn shows(&self, category: ZoneCategory) -> bool {
        match category {
            ZoneCategory::ExtendedBlue => self.extended_blue,
            ZoneCategory::WhiteManaged => self.white_managed,
            ZoneCategory::Handicapped => self.handicapped,
            ZoneCategory::Unclassified => self.unclassified,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassifiedZone<'a> {
    pub zone: &'a Zone,
    pub category: ZoneCategory,
}

/// Number of zones per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub extended_blue: usize,
    pub white_managed: usize,
    pub handicapped: usize,
    pub unclassified: usize,
}

impl CategoryCounts {
    pub fn tally(categories: impl IntoIterator<Item = ZoneCategory>) -> Self {
        let counts = categories.into_iter().counts();
        let get = |category| counts.get(&category).copied().unwrap_or(0);
        Self {
            extended_blue: get(ZoneCategory::ExtendedBlue),
            white_managed: get(ZoneCategory::WhiteManaged),
            handicapped: get(ZoneCategory::Handicapped),
            unclassified: get(ZoneCategory::Unclassified),
        }
    }

    pub fn get(&self, category: ZoneCategory) -> usize {
        match category {
            ZoneCategory::ExtendedBlue => self.extended_blue,
            ZoneCategory::WhiteManaged => self.white_managed,
            ZoneCategory::Handicapped => self.handicapped,
            ZoneCategory::Unclassified => self.unclassified,
        }
    }

    pub fn total(&self) -> usize {
        ZoneCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

/// Everything one search produced, including the conditions that kept a
/// step from producing an answer
#[derive(Debug)]
pub struct SearchResult<'a> {
    pub destination: Option<Coordinate>,
    pub radius_m: Meters,
    pub facilities: Vec<&'a Facility>,
    pub zones: Vec<ClassifiedZone<'a>>,
    pub category_counts: CategoryCounts,
    pub nearest: Result<NearestFacility<'a>, Error>,
    /// `None` when no stay was requested or no garage was selected
    pub fee: Option<Result<FeeResult, Error>>,
    /// `None` without an origin
    pub origin_walk: Option<Result<WalkEstimate, Error>>,
    pub origin: Option<Coordinate>,
}

/// Runs one search over `snapshot`.
pub fn search<'a>(
    snapshot: &'a Snapshot,
    tariffs: &TariffTable,
    request: &SearchRequest,
) -> SearchResult<'a> {
    let facilities = filter_by_radius(
        &snapshot.facilities,
        request.destination,
        request.radius_m,
        request.free_only,
    );

    let zones: Vec<ClassifiedZone<'a>> =
        filter_by_radius(&snapshot.zones, request.destination, request.radius_m, false)
            .into_iter()
            .map(|zone| ClassifiedZone {
                zone,
                category: zone.category(),
            })
            .collect();
    let category_counts = CategoryCounts::tally(zones.iter().map(|z| z.category));

    debug!(
        "{} of {} facilities and {} of {} zones within {} m",
        facilities.len(),
        snapshot.facilities.len(),
        zones.len(),
        snapshot.zones.len(),
        request.radius_m
    );

    let nearest = nearest_open_facility(facilities.iter().copied(), request.destination);

    let fee = match (&nearest, request.stay) {
        (Ok(nearest), Some(stay)) => Some(tariffs.compute_fee(
            &nearest.facility.name,
            stay.arrival,
            stay.duration_hours,
        )),
        _ => None,
    };
    if let Some(Err(e)) = &fee {
        warn!("Price unavailable: {e}");
    }

    let origin_walk = request.origin.map(|origin| {
        request
            .destination
            .ok_or(Error::NoDestination)
            .and_then(|destination| walk_between(origin, destination))
    });

    SearchResult {
        destination: request.destination,
        radius_m: request.radius_m,
        facilities,
        zones,
        category_counts,
        nearest,
        fee,
        origin_walk,
        origin: request.origin,
    }
}

/// Condition that kept one step of a search from answering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub step: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl Notice {
    fn from_error(step: &'static str, error: &Error) -> Self {
        Self {
            step,
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// Serializable view of a [`SearchResult`]
#[derive(Debug, Serialize)]
pub struct SearchReport<'r> {
    pub destination: Option<Coordinate>,
    pub radius_m: Meters,
    pub facilities: &'r [&'r Facility],
    pub zones: &'r [ClassifiedZone<'r>],
    pub category_counts: CategoryCounts,
    pub nearest: Option<&'r NearestFacility<'r>>,
    pub fee: Option<&'r FeeResult>,
    pub origin_walk: Option<&'r WalkEstimate>,
    pub notices: Vec<Notice>,
}

impl SearchResult<'_> {
    pub fn report(&self) -> SearchReport<'_> {
        let mut notices = Vec::new();
        if let Err(e) = &self.nearest {
            notices.push(Notice::from_error("nearest", e));
        }
        if let Some(Err(e)) = &self.fee {
            notices.push(Notice::from_error("fee", e));
        }
        if let Some(Err(e)) = &self.origin_walk {
            notices.push(Notice::from_error("origin_walk", e));
        }

        SearchReport {
            destination: self.destination,
            radius_m: self.radius_m,
            facilities: &self.facilities,
            zones: &self.zones,
            category_counts: self.category_counts,
            nearest: self.nearest.as_ref().ok(),
            fee: self.fee.as_ref().and_then(|fee| fee.as_ref().ok()),
            origin_walk: self.origin_walk.as_ref().and_then(|walk| walk.as_ref().ok()),
            notices,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::FacilityState;

    const DEST: Coordinate = Coordinate::new(9.3767, 47.4245);

    fn arrival() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(21, 0, 0)
            .unwrap()
    }

    fn snapshot() -> Snapshot {
        Snapshot::new(
            vec![
                Facility::new("Manor", Coordinate::new(9.3768, 47.4246), FacilityState::Closed)
                    .with_spaces(Some(40), Some(210)),
                Facility::new("Rathaus", Coordinate::new(9.3760, 47.4240), FacilityState::Open)
                    .with_spaces(Some(0), Some(190)),
                Facility::new("Bahnhof", Coordinate::new(9.3701, 47.4232), FacilityState::Open)
                    .with_spaces(Some(55), Some(300)),
                Facility::new("Spelterini", Coordinate::new(9.3990, 47.4390), FacilityState::Open)
                    .with_spaces(Some(90), Some(400)),
                Facility::new("Mystery", Coordinate::new(9.3766, 47.4244), FacilityState::Open)
                    .with_spaces(Some(5), Some(10)),
            ],
            vec![
                Zone::new(
                    "Marktgasse",
                    Coordinate::new(9.3770, 47.4247),
                    "Marktgasse 1",
                    "Erweiterte blaue Zone",
                ),
                Zone::new("Bohl", Coordinate::new(9.3775, 47.4250), "Bohl 2", "Invalidenparkplatz"),
                Zone::new(
                    "Spisergasse",
                    Coordinate::new(9.3780, 47.4251),
                    "Spisergasse 5",
                    "Weisse Zone",
                ),
                Zone::new("Velo", Coordinate::new(9.3762, 47.4243), "", "Veloparkplatz"),
                Zone::new(
                    "Olma",
                    Coordinate::new(9.3900, 47.4300),
                    "Splügenstrasse",
                    "Weisse Zone",
                ),
            ],
        )
    }

    #[test]
    fn full_search_prices_the_nearest_open_garage() {
        let mut data = snapshot();
        // drop the unpriced garage so the nearest one has a tariff
        data.facilities.retain(|f| f.name != "Mystery");
        let request = SearchRequest::around(Some(DEST), 600.0)
            .free_only(true)
            .from_origin(Some(Coordinate::new(9.3650, 47.4220)))
            .staying(arrival(), 2.0);

        let result = search(&data, &TariffTable::st_gallen(), &request);

        let names: Vec<&str> = result.facilities.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Manor", "Bahnhof"]);

        let nearest = result.nearest.as_ref().unwrap();
        assert_eq!(nearest.facility.name, "Bahnhof");

        let fee = result.fee.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(fee.facility_id, "Bahnhof");
        // first hour 2.40, then two half hours at 1.20
        assert_eq!(fee.total_fee, Decimal::new(480, 2));

        assert!(result.origin_walk.as_ref().unwrap().is_ok());
        assert!(result.report().notices.is_empty());
    }

    #[test]
    fn zones_are_classified_and_counted() {
        let snapshot = snapshot();
        let result = search(
            &snapshot,
            &TariffTable::st_gallen(),
            &SearchRequest::around(Some(DEST), 300.0),
        );
        assert_eq!(result.zones.len(), 4);
        assert_eq!(
            result.category_counts,
            CategoryCounts {
                extended_blue: 1,
                white_managed: 1,
                handicapped: 1,
                unclassified: 1,
            }
        );
        assert_eq!(result.category_counts.total(), result.zones.len());
        for zone in &result.zones {
            assert!(result.category_counts.get(zone.category) > 0);
        }
    }

    #[test]
    fn unknown_tariff_keeps_the_rest_of_the_result() {
        let snapshot = snapshot();
        let request = SearchRequest::around(Some(DEST), 600.0).staying(arrival(), 2.0);
        let result = search(&snapshot, &TariffTable::st_gallen(), &request);

        assert_eq!(result.nearest.as_ref().unwrap().facility.name, "Mystery");
        assert!(matches!(
            result.fee,
            Some(Err(Error::UnknownFacility(ref name))) if name == "Mystery"
        ));
        let report = result.report();
        assert!(report.nearest.is_some());
        assert!(report.fee.is_none());
        assert_eq!(report.notices.len(), 1);
        assert_eq!(report.notices[0].code, "unknown_facility");
    }

    #[test]
    fn missing_destination_shows_everything_but_selects_nothing() {
        let snapshot = snapshot();
        let request = SearchRequest::around(None, 100.0)
            .from_origin(Some(DEST))
            .staying(arrival(), 1.0);
        let result = search(&snapshot, &TariffTable::st_gallen(), &request);

        assert_eq!(result.facilities.len(), snapshot.facilities.len());
        assert_eq!(result.zones.len(), snapshot.zones.len());
        assert!(matches!(result.nearest, Err(Error::NoDestination)));
        assert!(result.fee.is_none());
        assert!(matches!(result.origin_walk, Some(Err(Error::NoDestination))));

        let codes: Vec<&str> = result.report().notices.iter().map(|n| n.code).collect();
        assert_eq!(codes, ["no_destination", "no_destination"]);
    }

    #[test]
    fn no_open_garage_in_radius() {
        let snapshot = snapshot();
        let request = SearchRequest::around(Some(Coordinate::new(9.3768, 47.4246)), 5.0);
        let result = search(&snapshot, &TariffTable::st_gallen(), &request);
        assert_eq!(result.facilities.len(), 1);
        assert!(matches!(result.nearest, Err(Error::NoOpenFacility)));
    }

    #[test]
    fn report_serializes() {
        let snapshot = snapshot();
        let request = SearchRequest::around(Some(DEST), 600.0);
        let result = search(&snapshot, &TariffTable::st_gallen(), &request);
        let json = serde_json::to_value(result.report()).unwrap();
        assert_eq!(json["nearest"]["facility"]["name"], "Mystery");
        assert_eq!(json["category_counts"]["handicapped"], 1);
        assert_eq!(json["zones"][0]["category"], "EXTENDED_BLUE");
        assert!(json["fee"].is_null());
    }

    #[test]
    fn visibility_defaults_hide_unclassified() {
        let visibility = Visibility::default();
        assert!(visibility.shows(ZoneCategory::Handicapped));
        assert!(!visibility.shows(ZoneCategory::Unclassified));
    }
}
