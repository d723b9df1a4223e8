use serde::Deserialize;

use super::raw_types::RawGeoPoint;

#[derive(Deserialize)]
#[serde(untagged)]
enum CountRepr {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Space counts arrive as integers, floats, quoted numbers or nothing.
pub(super) fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let count = match Option::<CountRepr>::deserialize(deserializer)? {
        None => None,
        Some(CountRepr::Int(value)) => Some(value),
        Some(CountRepr::Float(value)) => float_count(value),
        Some(CountRepr::Text(text)) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(float_count))
        }
    };
    Ok(count)
}

#[allow(clippy::cast_possible_truncation)]
fn float_count(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.round() as i64)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Object { lat: f64, lon: f64 },
    Text(String),
}

/// Points are `{lat, lon}` objects in JSON and `"lat, lon"` text in CSV.
pub(super) fn lenient_point<'de, D>(deserializer: D) -> Result<Option<RawGeoPoint>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let point = match Option::<PointRepr>::deserialize(deserializer) {
        Ok(Some(PointRepr::Object { lat, lon })) => Some(RawGeoPoint { lat, lon }),
        Ok(Some(PointRepr::Text(text))) => parse_point_text(&text),
        // half-filled objects degrade to "no position"
        Ok(None) | Err(_) => None,
    };
    Ok(point)
}

fn parse_point_text(text: &str) -> Option<RawGeoPoint> {
    let (lat, lon) = text.split_once(',')?;
    Some(RawGeoPoint {
        lat: lat.trim().parse().ok()?,
        lon: lon.trim().parse().ok()?,
    })
}
