//! Record shapes of the St. Gallen open-data datasets.

use serde::Deserialize;

use super::de::{lenient_count, lenient_point};

/// Latitude/longitude pair as the portal writes it
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct RawGeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Record of the `freie-parkplatze-in-der-stadt-stgallen-pls` dataset
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RawFacility {
    pub phname: Option<String>,
    pub phstate: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub shortfree: Option<i64>,
    #[serde(deserialize_with = "lenient_count")]
    pub shortmax: Option<i64>,
    #[serde(deserialize_with = "lenient_point")]
    pub standort: Option<RawGeoPoint>,
}

/// Record of the `points-of-interest-` dataset, parking category
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RawZone {
    pub name: Option<String>,
    pub informatio: Option<String>,
    pub adresse: Option<String>,
    #[serde(deserialize_with = "lenient_point")]
    pub geo_point_2d: Option<RawGeoPoint>,
}
