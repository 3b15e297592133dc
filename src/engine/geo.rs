use std::fmt;

use crate::model::LatLng;

/// Coordinates are compared at 6 decimal places (~0.11 m)
const KEY_PRECISION: usize = 6;

/// Grouping key of a coordinate pair.
///
/// Two positions share a key iff their 6-decimal renderings are textually identical.
/// This isn't a distance check, so points straddling a rounding boundary get different keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeoKey(String);

impl GeoKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The rounded coordinates the key was built from
    pub fn position(&self) -> LatLng {
        let (lat, lng) = self.0.split_once(',').unwrap_or((self.0.as_str(), ""));

        LatLng {
            lat: lat.parse().unwrap_or(f64::NAN),
            lng: lng.parse().unwrap_or(f64::NAN),
        }
    }
}

impl fmt::Display for GeoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn normalize(lat: f64, lng: f64) -> GeoKey {
    GeoKey(format!("{:.*},{:.*}", KEY_PRECISION, lat, KEY_PRECISION, lng))
}

/// (0, 0) is the placeholder for "position unknown"
pub fn is_valid(lat: f64, lng: f64) -> bool {
    lat.is_finite() && lng.is_finite() && !(lat == 0.0 && lng == 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        assert_eq!(normalize(37.5133, 127.1001).as_str(), "37.513300,127.100100");
        assert_eq!(normalize(-1.5, 0.0).as_str(), "-1.500000,0.000000");
    }

    #[test]
    fn test_same_key_below_precision() {
        assert_eq!(normalize(37.1234561, 127.0), normalize(37.1234564, 127.0));
        assert_ne!(normalize(37.123456, 127.0), normalize(37.123457, 127.0));
    }

    #[test]
    fn test_key_position_round_trip() {
        let position = normalize(37.50123449, 127.02).position();

        assert_eq!(position.lat, 37.501234);
        assert_eq!(position.lng, 127.02);
    }

    #[test]
    fn test_validity() {
        assert!(is_valid(37.5, 127.0));
        assert!(is_valid(0.0, 127.0));
        assert!(is_valid(37.5, 0.0));
        assert!(!is_valid(0.0, 0.0));
        assert!(!is_valid(f64::NAN, 127.0));
        assert!(!is_valid(37.5, f64::INFINITY));
    }
}
