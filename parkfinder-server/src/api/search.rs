use axum::{Json, extract::State};
use chrono::NaiveDateTime;
use geojson::FeatureCollection;
use parkfinder_core::loading::{facilities_from_value, zones_from_value};
use parkfinder_core::search::{SearchReport, search};
use parkfinder_core::tariff::DurationRounding;
use parkfinder_core::{Coordinate, Hours, SearchRequest, Snapshot, Visibility};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiError, AppState, resolve_duration};

/// Snapshots travel in the open-data record shape, either as the portal
/// envelope or as a bare array.
#[derive(Debug, Deserialize)]
pub(super) struct SearchBody {
    facilities: Value,
    #[serde(default)]
    zones: Option<Value>,
    destination: Option<Coordinate>,
    origin: Option<Coordinate>,
    radius_m: Option<f64>,
    #[serde(default)]
    free_only: bool,
    arrival: Option<NaiveDateTime>,
    departure: Option<NaiveDateTime>,
    duration_hours: Option<Hours>,
    #[serde(default)]
    rounding: DurationRounding,
    #[serde(default)]
    visibility: Visibility,
    #[serde(default)]
    geojson: bool,
}

#[derive(Serialize)]
struct SearchResponse<'r> {
    #[serde(flatten)]
    report: SearchReport<'r>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geojson: Option<FeatureCollection>,
}

pub(super) async fn run_search(
    State(state): State<AppState>,
    Json(body): Json<SearchBody>,
) -> Result<Json<Value>, ApiError> {
    let facilities = facilities_from_value(body.facilities)?;
    let zones = match body.zones {
        Some(zones) => zones_from_value(zones)?,
        None => Vec::new(),
    };
    let snapshot = Snapshot::new(facilities, zones);

    let radius = state.config.effective_radius(body.radius_m);
    let mut request = SearchRequest::around(body.destination, radius)
        .free_only(body.free_only)
        .from_origin(body.origin);
    if let Some(arrival) = body.arrival {
        let hours = resolve_duration(arrival, body.duration_hours, body.departure, body.rounding)?;
        request = request.staying(arrival, hours);
    } else if body.departure.is_some() || body.duration_hours.is_some() {
        return Err(ApiError::new("bad_request", "a stay needs an arrival"));
    }

    let tariffs = state.tariffs.clone();
    let value = tokio::task::spawn_blocking(move || -> Result<Value, ApiError> {
        let result = search(&snapshot, &tariffs, &request);
        tracing::debug!(
            facilities = result.facilities.len(),
            zones = result.zones.len(),
            radius_m = radius,
            "search finished"
        );

        let geojson = if body.geojson {
            Some(result.to_geojson(&body.visibility)?)
        } else {
            None
        };
        let response = SearchResponse {
            report: result.report(),
            geojson,
        };
        serde_json::to_value(&response).map_err(|e| {
            tracing::error!(error = %e, "search result did not serialize");
            ApiError::new("internal_error", "search result did not serialize")
        })
    })
    .await
    .map_err(ApiError::worker_failed)??;
    Ok(Json(value))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::post_json;

    fn facilities() -> serde_json::Value {
        json!({
            "total_count": 3,
            "results": [
                {"phname": "Manor", "phstate": "geschlossen", "shortfree": 40, "shortmax": 210,
                 "standort": {"lon": 9.3768, "lat": 47.4246}},
                {"phname": "Rathaus", "phstate": "offen", "shortfree": 0, "shortmax": 190,
                 "standort": {"lon": 9.3760, "lat": 47.4240}},
                {"phname": "Bahnhof", "phstate": "offen", "shortfree": 55, "shortmax": 300,
                 "standort": {"lon": 9.3701, "lat": 47.4232}}
            ]
        })
    }

    fn zones() -> serde_json::Value {
        json!([
            {"name": "Marktgasse", "informatio": "Erweiterte blaue Zone", "adresse": "Marktgasse 1",
             "geo_point_2d": {"lon": 9.3770, "lat": 47.4247}},
            {"name": "Velo", "informatio": "Veloparkplatz",
             "geo_point_2d": {"lon": 9.3762, "lat": 47.4243}}
        ])
    }

    #[tokio::test]
    async fn search_prices_the_nearest_open_garage() {
        let (status, json) = post_json(
            "/api/v1/search",
            json!({
                "facilities": facilities(),
                "zones": zones(),
                "destination": {"longitude": 9.3767, "latitude": 47.4245},
                "radius_m": 600.0,
                "arrival": "2024-05-10T21:00:00",
                "duration_hours": 2.0
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["nearest"]["facility"]["name"], "Rathaus");
        assert_eq!(json["fee"]["total_fee"], "3.60");
        assert_eq!(json["category_counts"]["extended_blue"], 1);
        assert_eq!(json["category_counts"]["unclassified"], 1);
        assert_eq!(json["notices"].as_array().expect("notices").len(), 0);
        assert!(json.get("geojson").is_none());
    }

    #[tokio::test]
    async fn free_only_changes_the_selection() {
        let (status, json) = post_json(
            "/api/v1/search",
            json!({
                "facilities": facilities(),
                "destination": {"longitude": 9.3767, "latitude": 47.4245},
                "radius_m": 600.0,
                "free_only": true
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["nearest"]["facility"]["name"], "Bahnhof");
        assert_eq!(json["facilities"].as_array().expect("facilities").len(), 2);
    }

    #[tokio::test]
    async fn missing_destination_is_a_notice_not_a_failure() {
        let (status, json) = post_json(
            "/api/v1/search",
            json!({ "facilities": facilities(), "geojson": true }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["nearest"].is_null());
        assert_eq!(json["notices"][0]["code"], "no_destination");
        assert_eq!(json["radius_m"], 500.0);
        assert_eq!(json["geojson"]["type"], "FeatureCollection");
    }

    #[tokio::test]
    async fn radius_is_clamped_to_the_configured_maximum() {
        let (_, json) = post_json(
            "/api/v1/search",
            json!({
                "facilities": [],
                "destination": {"longitude": 9.3767, "latitude": 47.4245},
                "radius_m": 50000.0
            }),
        )
        .await;
        assert_eq!(json["radius_m"], 3000.0);
        assert_eq!(json["notices"][0]["code"], "no_open_facility");
    }

    #[tokio::test]
    async fn malformed_snapshot_is_rejected() {
        let (status, json) = post_json(
            "/api/v1/search",
            json!({ "facilities": {"error": "quota exceeded"} }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "invalid_data");
    }
}
