//! Built-in mock data: six Sri Lanka destinations and a matching six-day plan.

use super::model::{Category, ItineraryItem, Location};

/// Candidate pool for the map. Days are left unset; the sync rule assigns them.
pub fn sri_lanka_locations() -> Vec<Location> {
    vec![
        Location::new("Colombo", 6.9271, 79.8612),
        Location::new("Kandy", 7.2906, 80.6337),
        Location::new("Sigiriya", 7.9570, 80.7603),
        Location::new("Ella", 6.8667, 81.0467),
        Location::new("Yala", 6.2719, 81.3486),
        Location::new("Galle", 6.0535, 80.2210),
    ]
}

/// Map list shown before any regeneration: the pool in order, days 1..=6.
pub fn initial_locations() -> Vec<Location> {
    sri_lanka_locations()
        .into_iter()
        .enumerate()
        .map(|(i, mut loc)| {
            loc.day = Some(i as u32 + 1);
            loc
        })
        .collect()
}

fn item(
    id: &str,
    day: u32,
    location: &str,
    activities: [&str; 3],
    accommodation: &str,
    category: Category,
) -> ItineraryItem {
    ItineraryItem {
        id: id.to_string(),
        day,
        location: location.to_string(),
        activities: activities.iter().map(|a| a.to_string()).collect(),
        accommodation: accommodation.to_string(),
        duration: "Full Day".to_string(),
        category,
    }
}

/// The full mock itinerary every regeneration draws from.
pub fn mock_itinerary() -> Vec<ItineraryItem> {
    vec![
        item(
            "1",
            1,
            "Colombo",
            ["Gangaramaya Temple visit", "National Museum", "Galle Face Green sunset walk"],
            "Urban Hotel Colombo",
            Category::City,
        ),
        item(
            "2",
            2,
            "Sigiriya",
            ["Climb Sigiriya Rock Fortress", "Dambulla Cave Temples", "Minneriya Safari"],
            "Jungle Eco Retreat",
            Category::Culture,
        ),
        item(
            "3",
            3,
            "Kandy",
            ["Temple of the Tooth", "Royal Botanical Gardens", "Cultural dance performance"],
            "Hilltop Hotel Kandy",
            Category::Culture,
        ),
        item(
            "4",
            4,
            "Ella",
            ["Nine Arch Bridge", "Little Adams Peak hike", "Tea plantation tour"],
            "Mountain View Cottages",
            Category::Nature,
        ),
        item(
            "5",
            5,
            "Yala",
            ["Yala National Park Safari", "Spot leopards and elephants", "Beach relaxation"],
            "Luxury Safari Camp",
            Category::Wildlife,
        ),
        item(
            "6",
            6,
            "Galle",
            ["Explore Galle Fort", "Unawatuna Beach", "Sunset boat ride"],
            "Colonial Heritage Hotel",
            Category::Beach,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_sets_line_up() {
        let plan = mock_itinerary();
        let pool = sri_lanka_locations();
        assert_eq!(plan.len(), 6);
        assert_eq!(pool.len(), 6);
        for entry in &plan {
            assert!(pool.iter().any(|l| l.name == entry.location), "{} missing from pool", entry.location);
        }
    }

    #[test]
    fn initial_locations_are_numbered() {
        let days: Vec<_> = initial_locations().iter().map(|l| l.day).collect();
        assert_eq!(days, (1..=6).map(Some).collect::<Vec<_>>());
    }
}
