use geo::Point;
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use super::{SearchResult, Visibility};
use crate::{Coordinate, Error};

impl SearchResult<'_> {
    /// Map layers of the search as a `GeoJSON` `FeatureCollection`.
    ///
    /// Zones are drawn per `visibility`; records without a usable position
    /// are left off the map.
    pub fn to_geojson(&self, visibility: &Visibility) -> Result<FeatureCollection, Error> {
        let mut features = Vec::new();

        if let Some(destination) = self.destination.filter(Coordinate::is_locatable) {
            features.push(point_feature(
                destination,
                json!({ "layer": "destination", "radius_m": self.radius_m }),
            )?);
        }

        if let Some(origin) = self.origin.filter(Coordinate::is_locatable) {
            let walk = self.origin_walk.as_ref().and_then(|w| w.as_ref().ok());
            features.push(point_feature(
                origin,
                json!({
                    "layer": "origin",
                    "walk_m": walk.map(|w| w.distance_m),
                    "walk_minutes": walk.map(|w| w.minutes),
                }),
            )?);
        }

        if visibility.facilities {
            let nearest = self.nearest.as_ref().ok().map(|n| n.facility);
            for facility in &self.facilities {
                if !facility.location.is_locatable() {
                    continue;
                }
                let is_nearest = nearest.is_some_and(|n| std::ptr::eq(n, *facility));
                features.push(point_feature(
                    facility.location,
                    json!({
                        "layer": "facility",
                        "name": facility.name,
                        "state": facility.state,
                        "free_spaces": facility.free_spaces,
                        "total_spaces": facility.total_spaces,
                        "nearest": is_nearest,
                    }),
                )?);
            }
        }

        for classified in &self.zones {
            let zone = classified.zone;
            if !visibility.shows(classified.category) || !zone.location.is_locatable() {
                continue;
            }
            features.push(point_feature(
                zone.location,
                json!({
                    "layer": "zone",
                    "name": zone.name,
                    "address": zone.address,
                    "category": classified.category,
                }),
            )?);
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self, visibility: &Visibility) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson(visibility)?)
            .map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn point_feature(location: Coordinate, properties: serde_json::Value) -> Result<Feature, Error> {
    let geometry = Geometry::new(GeoJsonValue::from(&Point::from(location)));
    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": properties,
    });
    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::search::{SearchRequest, search};
    use crate::{Coordinate, Facility, FacilityState, Snapshot, TariffTable, Visibility, Zone};

    const DEST: Coordinate = Coordinate::new(9.3767, 47.4245);

    fn snapshot() -> Snapshot {
        Snapshot::new(
            vec![
                Facility::new("Rathaus", Coordinate::new(9.3760, 47.4240), FacilityState::Open),
                Facility::new("Manor", Coordinate::new(9.3768, 47.4246), FacilityState::Closed),
            ],
            vec![
                Zone::new(
                    "Marktgasse",
                    Coordinate::new(9.3770, 47.4247),
                    "Marktgasse 1",
                    "Erweiterte blaue Zone",
                ),
                Zone::new("Velo", Coordinate::new(9.3762, 47.4243), "", "Veloparkplatz"),
            ],
        )
    }

    fn layers(collection: &geojson::FeatureCollection, layer: &str) -> usize {
        collection
            .features
            .iter()
            .filter(|f| f.property("layer").and_then(|v| v.as_str()) == Some(layer))
            .count()
    }

    #[test]
    fn default_visibility_hides_unclassified_zones() {
        let snapshot = snapshot();
        let request = SearchRequest::around(Some(DEST), 500.0)
            .from_origin(Some(Coordinate::new(9.3701, 47.4232)));
        let result = search(&snapshot, &TariffTable::st_gallen(), &request);
        let collection = result.to_geojson(&Visibility::default()).unwrap();

        assert_eq!(layers(&collection, "destination"), 1);
        assert_eq!(layers(&collection, "origin"), 1);
        assert_eq!(layers(&collection, "facility"), 2);
        assert_eq!(layers(&collection, "zone"), 1);

        let nearest: Vec<_> = collection
            .features
            .iter()
            .filter(|f| f.property("nearest").and_then(|v| v.as_bool()) == Some(true))
            .collect();
        assert_eq!(nearest.len(), 1);
        assert_eq!(nearest[0].property("name").unwrap(), "Rathaus");
    }

    #[test]
    fn toggles_control_layers_only() {
        let snapshot = snapshot();
        let result = search(
            &snapshot,
            &TariffTable::st_gallen(),
            &SearchRequest::around(Some(DEST), 500.0),
        );
        let visibility = Visibility {
            facilities: false,
            unclassified: true,
            ..Visibility::default()
        };
        let collection = result.to_geojson(&visibility).unwrap();
        assert_eq!(layers(&collection, "facility"), 0);
        assert_eq!(layers(&collection, "zone"), 2);
        // classification is unaffected by what is drawn
        assert_eq!(result.category_counts.unclassified, 1);
    }

    #[test]
    fn string_output_is_a_feature_collection() {
        let snapshot = snapshot();
        let result = search(
            &snapshot,
            &TariffTable::st_gallen(),
            &SearchRequest::around(None, 500.0),
        );
        let text = result.to_geojson_string(&Visibility::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(layers(&result.to_geojson(&Visibility::default()).unwrap(), "destination"), 0);
    }
}
