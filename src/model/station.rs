use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// External stop number. Some stations are only known by this id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
    /// NaN when the source held something that isn't a number
    #[serde(default = "nan", deserialize_with = "lenient_coordinate")]
    pub lat: f64,
    #[serde(default = "nan", deserialize_with = "lenient_coordinate")]
    pub lng: f64,
}

impl Station {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Station {
            name: Some(name.into()),
            station_id: None,
            lat,
            lng,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

#[derive(Copy, Clone, Debug, Serialize, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

fn nan() -> f64 {
    f64::NAN
}

// The hand-maintained route files sometimes carry "" or null for stops whose position
// wasn't found. Those must not fail the whole dataset, they are filtered out later.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;

    let coordinate = match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    };

    Ok(coordinate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coordinates() {
        let station: Station =
            serde_json::from_str(r#"{"name":"잠실역","lat":37.5133,"lng":127.1001}"#).unwrap();

        assert_eq!(station.name.as_deref(), Some("잠실역"));
        assert_eq!(station.lat, 37.5133);
        assert_eq!(station.lng, 127.1001);
        assert!(station.station_id.is_none());
    }

    #[test]
    fn test_non_numeric_coordinates_become_nan() {
        let station: Station =
            serde_json::from_str(r#"{"stationId":"24101","lat":"abc","lng":null}"#).unwrap();

        assert_eq!(station.station_id.as_deref(), Some("24101"));
        assert!(station.lat.is_nan());
        assert!(station.lng.is_nan());
    }

    #[test]
    fn test_missing_coordinates_become_nan() {
        let station: Station = serde_json::from_str(r#"{"name":"미확인"}"#).unwrap();

        assert!(station.lat.is_nan());
        assert!(station.lng.is_nan());
    }

    #[test]
    fn test_string_coordinates_are_parsed() {
        let station: Station =
            serde_json::from_str(r#"{"name":"a","lat":" 37.5 ","lng":"127.1"}"#).unwrap();

        assert_eq!(station.lat, 37.5);
        assert_eq!(station.lng, 127.1);
    }
}
