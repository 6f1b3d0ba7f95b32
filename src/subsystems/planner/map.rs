//! Map view model — what the map SDK needs to draw the route.
//!
//! The SDK itself is external; this only orders markers by day, derives the
//! route segments between them, and resolves a clicked marker back to its
//! location.

use serde::{Deserialize, Serialize};

use super::model::{LatLng, Location};

/// A marker on the map, numbered by day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub name: String,
    pub day: u32,
    pub position: LatLng,
}

/// One leg of the drawn route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub from: LatLng,
    pub to: LatLng,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: LatLng,
    /// Whether an SDK key was configured. The key itself never leaves the process.
    pub has_api_key: bool,
    pub markers: Vec<Marker>,
    pub route: Vec<RouteSegment>,
}

impl MapView {
    pub fn build(center: LatLng, has_api_key: bool, locations: &[Location]) -> Self {
        let mut markers: Vec<Marker> = locations
            .iter()
            .enumerate()
            .map(|(i, loc)| Marker {
                name: loc.name.clone(),
                day: loc.day_or(i),
                position: loc.coords(),
            })
            .collect();
        markers.sort_by_key(|m| m.day);

        let route = markers
            .windows(2)
            .map(|pair| RouteSegment { from: pair[0].position, to: pair[1].position })
            .collect();

        Self { center, has_api_key, markers, route }
    }
}

/// Resolve a marker click (by name, case-insensitive) to its location.
pub fn select<'a>(locations: &'a [Location], name: &str) -> Option<&'a Location> {
    let name = name.trim();
    locations.iter().find(|l| l.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsystems::planner::seed::initial_locations;

    const CENTER: LatLng = LatLng { lat: 7.8731, lng: 80.7718 };

    #[test]
    fn route_joins_consecutive_days() {
        let view = MapView::build(CENTER, false, &initial_locations());
        assert_eq!(view.markers.len(), 6);
        assert_eq!(view.route.len(), 5);
        assert_eq!(view.route[0].from, view.markers[0].position);
        assert_eq!(view.route[0].to, view.markers[1].position);
    }

    #[test]
    fn markers_sorted_by_day() {
        let mut locs = initial_locations();
        locs.reverse();
        let view = MapView::build(CENTER, true, &locs);
        let days: Vec<_> = view.markers.iter().map(|m| m.day).collect();
        assert_eq!(days, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(view.markers[0].name, "Colombo");
        assert!(view.has_api_key);
    }

    #[test]
    fn single_location_has_no_route() {
        let locs: Vec<_> = initial_locations().into_iter().take(1).collect();
        let view = MapView::build(CENTER, false, &locs);
        assert_eq!(view.markers.len(), 1);
        assert!(view.route.is_empty());
    }

    #[test]
    fn select_is_case_insensitive() {
        let locs = initial_locations();
        assert_eq!(select(&locs, " kandy ").map(|l| l.day), Some(Some(2)));
        assert!(select(&locs, "Jaffna").is_none());
    }
}
