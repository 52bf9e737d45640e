use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accent used for markers and popup titles when a location carries no color.
pub const DEFAULT_ACCENT: &str = "#2DB3C8";

/// One coordinate component as delivered by the backend.
///
/// The upstream usually sends numbers but numeric strings show up as well, so
/// both are accepted and coerced when the pair is normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCoord {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawCoord {
    /// Numeric value of the component, `NaN` when it cannot be coerced.
    pub fn as_f64(&self) -> f64 {
        match self {
            RawCoord::Number(n) => *n,
            RawCoord::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            RawCoord::Other(serde_json::Value::Null) => 0.0,
            RawCoord::Other(serde_json::Value::Bool(b)) => f64::from(u8::from(*b)),
            RawCoord::Other(_) => f64::NAN,
        }
    }
}

impl From<Value> for RawCoord {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(f) => RawCoord::Number(f),
                None => RawCoord::Other(Value::Number(n)),
            },
            Value::String(s) => RawCoord::Text(s),
            other => RawCoord::Other(other),
        }
    }
}

impl From<f64> for RawCoord {
    fn from(value: f64) -> Self {
        RawCoord::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_coordinates")]
    pub coordinates: Vec<RawCoord>,
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Location {
    pub fn accent_color(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_ACCENT)
    }
}

/// Anything but an array reads as no coordinates, which normalizes to the
/// origin instead of failing the whole batch.
fn deserialize_coordinates<'de, D>(deserializer: D) -> Result<Vec<RawCoord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(RawCoord::from).collect(),
        _ => Vec::new(),
    })
}

fn deserialize_null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    #[serde(default)]
    pub locations: Vec<Location>,
}

/// Body of `GET /api/map/locations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapLocationsResponse {
    #[serde(default)]
    pub data: MapData,
}

impl MapLocationsResponse {
    pub fn locations(&self) -> &[Location] {
        &self.data.locations
    }
}

/// The dashboard payload is consumed as-is.
pub type DashboardResponse = serde_json::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upstream_payload_with_optional_fields_missing() {
        let json = r##"{
            "data": {
                "locations": [
                    {
                        "id": "1",
                        "name": "Academia Centro",
                        "coordinates": [-23.55, -46.63],
                        "category": "Academia",
                        "icon": "dumbbell"
                    },
                    {
                        "id": "2",
                        "name": "Hospital Sul",
                        "description": "24h",
                        "coordinates": ["-30.03", "-51.23"],
                        "category": "Saude",
                        "address": "Av. Ipiranga, 1000 - RS",
                        "icon": "hospital",
                        "color": "#ff0066"
                    }
                ]
            }
        }"##;

        let parsed: MapLocationsResponse = serde_json::from_str(json).expect("payload parses");
        let locations = parsed.locations();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].description, None);
        assert_eq!(locations[0].accent_color(), DEFAULT_ACCENT);
        assert_eq!(locations[1].accent_color(), "#ff0066");
        assert_eq!(locations[1].coordinates[0].as_f64(), -30.03);
    }

    #[test]
    fn raw_coord_coercion_matches_numeric_conversion() {
        assert_eq!(RawCoord::Number(1.5).as_f64(), 1.5);
        assert_eq!(RawCoord::Text(" 12.5 ".into()).as_f64(), 12.5);
        assert_eq!(RawCoord::Text(String::new()).as_f64(), 0.0);
        assert!(RawCoord::Text("abc".into()).as_f64().is_nan());
        assert_eq!(RawCoord::Other(serde_json::Value::Null).as_f64(), 0.0);
        assert!(RawCoord::Other(serde_json::json!({"x": 1})).as_f64().is_nan());
    }

    #[test]
    fn malformed_coordinates_keep_the_rest_of_the_batch() {
        let json = r#"{
            "data": {
                "locations": [
                    { "id": "1", "name": "Loja A", "coordinates": [-23.55, -46.63], "category": "Loja", "icon": "store" },
                    { "id": "2", "name": "Loja B", "coordinates": null, "category": null, "icon": null },
                    { "id": "3", "name": "Loja C", "coordinates": { "lat": 1, "lng": 2 } },
                    { "id": "4", "name": "Loja D", "coordinates": 7 }
                ]
            }
        }"#;

        let parsed: MapLocationsResponse = serde_json::from_str(json).expect("batch parses");
        let locations = parsed.locations();
        assert_eq!(locations.len(), 4);
        assert_eq!(locations[0].coordinates.len(), 2);
        assert_eq!(locations[1].category, "");
        assert_eq!(locations[1].icon, "");
        for location in &locations[1..] {
            assert!(location.coordinates.is_empty());
            let ll = crate::normalize_input_coords(&location.coordinates);
            assert_eq!((ll.lon, ll.lat), (0.0, 0.0));
        }
    }

    #[test]
    fn missing_data_defaults_to_no_locations() {
        let parsed: MapLocationsResponse = serde_json::from_str("{}").expect("empty object parses");
        assert!(parsed.locations().is_empty());
    }
}
