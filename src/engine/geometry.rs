use serde::Serialize;

use super::geo;
use crate::model::{LatLng, Station};

/// Ordered polyline path through the valid stations of a route.
///
/// Empty when fewer than two stations have a usable position. Routes whose last stop
/// isn't at the first stop's position are closed back to the start, since shuttles loop.
pub fn build_path(stations: &[Station]) -> Vec<LatLng> {
    let mut path: Vec<LatLng> = stations
        .iter()
        .filter(|s| geo::is_valid(s.lat, s.lng))
        .map(Station::position)
        .collect();

    if path.len() < 2 {
        return vec![];
    }

    let first = path[0];
    let last = path[path.len() - 1];

    if geo::normalize(first.lat, first.lng) != geo::normalize(last.lat, last.lng) {
        path.push(first);
    }

    path
}

#[derive(Copy, Clone, Debug, Serialize, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn extend(&mut self, point: LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    pub fn union(mut self, other: Bounds) -> Bounds {
        self.extend(other.south_west);
        self.extend(other.north_east);
        self
    }
}

/// Envelope of the given points, used to fit the viewport to what's on the map
pub fn bounds(points: impl IntoIterator<Item = LatLng>) -> Option<Bounds> {
    let mut points = points.into_iter();
    let first = points.next()?;

    let mut bounds = Bounds {
        south_west: first,
        north_east: first,
    };
    for point in points {
        bounds.extend(point);
    }

    Some(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stations(coords: &[(f64, f64)]) -> Vec<Station> {
        coords
            .iter()
            .map(|&(lat, lng)| Station::new("정류소", lat, lng))
            .collect()
    }

    fn coords(path: &[LatLng]) -> Vec<(f64, f64)> {
        path.iter().map(|p| (p.lat, p.lng)).collect()
    }

    #[test]
    fn test_already_closed_loop_is_left_as_is() {
        let path = build_path(&stations(&[(37.0, 127.0), (37.1, 127.1), (37.0, 127.0)]));

        assert_eq!(coords(&path), [(37.0, 127.0), (37.1, 127.1), (37.0, 127.0)]);
    }

    #[test]
    fn test_open_route_gets_closed() {
        let path = build_path(&stations(&[(37.0, 127.0), (37.1, 127.1)]));

        assert_eq!(coords(&path), [(37.0, 127.0), (37.1, 127.1), (37.0, 127.0)]);
    }

    #[test]
    fn test_too_few_valid_stations() {
        assert!(build_path(&[]).is_empty());
        assert!(build_path(&stations(&[(37.0, 127.0)])).is_empty());
        assert!(build_path(&stations(&[(37.0, 127.0), (0.0, 0.0), (f64::NAN, 1.0)])).is_empty());
    }

    #[test]
    fn test_invalid_stations_are_skipped() {
        let path = build_path(&stations(&[
            (0.0, 0.0),
            (37.0, 127.0),
            (f64::NAN, 127.05),
            (37.1, 127.1),
            (0.0, 0.0),
        ]));

        assert_eq!(coords(&path), [(37.0, 127.0), (37.1, 127.1), (37.0, 127.0)]);
    }

    #[test]
    fn test_endpoints_compared_at_key_precision() {
        let path = build_path(&stations(&[(37.0, 127.0), (37.1, 127.1), (37.0000001, 127.0)]));

        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_bounds() {
        assert!(bounds(Vec::<LatLng>::new()).is_none());

        let b = bounds(coords_to_points(&[(37.5, 127.1), (37.4, 127.3), (37.6, 127.0)])).unwrap();
        assert_eq!(b.south_west, LatLng { lat: 37.4, lng: 127.0 });
        assert_eq!(b.north_east, LatLng { lat: 37.6, lng: 127.3 });

        let other = bounds(coords_to_points(&[(37.7, 126.9)])).unwrap();
        let u = b.union(other);
        assert_eq!(u.south_west, LatLng { lat: 37.4, lng: 126.9 });
        assert_eq!(u.north_east, LatLng { lat: 37.7, lng: 127.3 });
    }

    fn coords_to_points(c: &[(f64, f64)]) -> Vec<LatLng> {
        c.iter().map(|&(lat, lng)| LatLng { lat, lng }).collect()
    }
}
