//! Groups stations sharing a position and spreads their markers around it.
//!
//! Loop routes often start and end at the same stop, and opposite-direction stops are
//! frequently recorded with identical coordinates. Without spreading, their markers
//! would be drawn exactly on top of each other.

use std::collections::HashMap;
use std::f64::consts::TAU;

use super::geo::{self, GeoKey};
use crate::model::{LatLng, Station};

/// Degrees (~3 m). Far enough for two markers to be told apart, close enough to the real stop.
pub const DEFAULT_OFFSET_DISTANCE: f64 = 0.00003;

#[derive(Clone, Copy, Debug)]
pub struct GroupMember<'a> {
    pub station: &'a Station,
    /// 1-based position in the route, counted before invalid stations are dropped
    pub index: usize,
}

#[derive(Clone, Debug)]
pub struct LocationGroup<'a> {
    pub key: GeoKey,
    /// Always in stop sequence order
    pub members: Vec<GroupMember<'a>>,
}

impl LocationGroup<'_> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Where a single stop marker ends up after spreading
#[derive(Clone, Copy, Debug)]
pub struct MarkerPlacement<'a> {
    pub station: &'a Station,
    pub index: usize,
    pub position: LatLng,
    /// Number of stops sharing the location, 1 when the stop is alone
    pub group_size: usize,
}

/// Partitions valid stations by their [`GeoKey`].
///
/// Groups come out in order of first occurrence. Stations at (0, 0) or with a
/// non-finite coordinate are skipped silently.
pub fn group(stations: &[Station]) -> Vec<LocationGroup<'_>> {
    let mut groups: Vec<LocationGroup> = vec![];
    let mut by_key: HashMap<GeoKey, usize> = HashMap::new();

    for (i, station) in stations.iter().enumerate() {
        if !geo::is_valid(station.lat, station.lng) {
            continue;
        }

        let key = geo::normalize(station.lat, station.lng);
        let member = GroupMember {
            station,
            index: i + 1,
        };

        match by_key.get(&key) {
            Some(&slot) => groups[slot].members.push(member),
            None => {
                by_key.insert(key.clone(), groups.len());
                groups.push(LocationGroup {
                    key,
                    members: vec![member],
                });
            }
        }
    }

    groups
}

/// Position of member `position` out of `group_size` on a circle of radius `distance` around `center`
pub fn offset(center: LatLng, position: usize, group_size: usize, distance: f64) -> LatLng {
    if group_size <= 1 {
        return center;
    }

    let angle = position as f64 / group_size as f64 * TAU;

    LatLng {
        lat: center.lat + distance * angle.cos(),
        lng: center.lng + distance * angle.sin(),
    }
}

/// Marker positions for every grouped station, in group order then member order
pub fn place<'a>(groups: &[LocationGroup<'a>], distance: f64) -> Vec<MarkerPlacement<'a>> {
    groups
        .iter()
        .flat_map(|group| {
            let center = group.key.position();
            let group_size = group.len();

            group
                .members
                .iter()
                .enumerate()
                .map(move |(position, member)| MarkerPlacement {
                    station: member.station,
                    index: member.index,
                    position: offset(center, position, group_size, distance),
                    group_size,
                })
        })
        .collect()
}
