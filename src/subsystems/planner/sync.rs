//! Location sync rule — derive a day-aligned map list from an itinerary.
//!
//! Position `i` of the returned list always carries `day = i + 1`, which is
//! also the day of the itinerary entry at position `i` when the itinerary
//! came out of [`super::regenerate::regenerate`].

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use super::PlannerError;
use super::model::{ItineraryItem, Location};

/// How many locations to pick and whether names follow the itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// One location per itinerary day. A pool entry with the same name as
    /// the day's destination is preferred; otherwise the next shuffled pool
    /// entry is used and renamed to the destination.
    MatchItinerary,
    /// A random count in `min..=max`, names left untouched.
    Sample { min: usize, max: usize },
}

/// Select and number locations from `pool` for `itinerary`.
///
/// Never fails: a short pool clamps the selection to what is available.
pub fn sync_locations<R: Rng + ?Sized>(
    itinerary: &[ItineraryItem],
    pool: &[Location],
    selection: Selection,
    rng: &mut R,
) -> Vec<Location> {
    let requested = match selection {
        Selection::MatchItinerary => itinerary.len(),
        Selection::Sample { min, max } => {
            let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
            rng.gen_range(lo..=hi).min(itinerary.len())
        }
    };
    let count = clamp_to_pool(requested, pool.len());

    let mut shuffled = pool.to_vec();
    shuffled.shuffle(rng);

    let picked = match selection {
        Selection::MatchItinerary => match_by_name(&itinerary[..count], shuffled),
        Selection::Sample { .. } => {
            shuffled.truncate(count);
            shuffled
        }
    };

    picked
        .into_iter()
        .enumerate()
        .map(|(i, mut loc)| {
            loc.day = Some(i as u32 + 1);
            loc
        })
        .collect()
}

fn clamp_to_pool(requested: usize, available: usize) -> usize {
    if requested > available {
        let err = PlannerError::CandidatePoolTooSmall { requested, available };
        debug!(%err, "clamping location selection");
        available
    } else {
        requested
    }
}

/// Pair each itinerary day with a pool entry: exact name match first, then
/// any leftover entry renamed to the destination.
fn match_by_name(days: &[ItineraryItem], shuffled: Vec<Location>) -> Vec<Location> {
    let mut unused: Vec<Option<Location>> = shuffled.into_iter().map(Some).collect();
    let mut slots: Vec<Option<Location>> = vec![None; days.len()];

    for (slot, entry) in slots.iter_mut().zip(days) {
        if let Some(found) = unused
            .iter_mut()
            .find(|c| c.as_ref().is_some_and(|l| l.name == entry.location))
        {
            *slot = found.take();
        }
    }

    let mut leftovers = unused.into_iter().flatten();
    slots
        .into_iter()
        .zip(days)
        .filter_map(|(slot, entry)| {
            slot.or_else(|| {
                leftovers.next().map(|mut loc| {
                    loc.name = entry.location.clone();
                    loc
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsystems::planner::regenerate::{check_dense_days, regenerate};
    use crate::subsystems::planner::seed::{mock_itinerary, sri_lanka_locations};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn days(locations: &[Location]) -> Vec<u32> {
        locations.iter().filter_map(|l| l.day).collect()
    }

    #[test]
    fn six_for_six_numbers_one_to_six() {
        let mut rng = StdRng::seed_from_u64(3);
        let plan = regenerate(&mock_itinerary(), &mut rng);
        let locs = sync_locations(&plan, &sri_lanka_locations(), Selection::MatchItinerary, &mut rng);

        assert_eq!(locs.len(), 6);
        assert_eq!(days(&locs), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn match_mode_aligns_names_and_coordinates() {
        let mut rng = StdRng::seed_from_u64(8);
        let plan = regenerate(&mock_itinerary(), &mut rng);
        let pool = sri_lanka_locations();
        let locs = sync_locations(&plan, &pool, Selection::MatchItinerary, &mut rng);

        for (loc, entry) in locs.iter().zip(&plan) {
            assert_eq!(loc.name, entry.location);
            assert_eq!(loc.day, Some(entry.day));
            let seeded = pool.iter().find(|p| p.name == loc.name).unwrap();
            assert_eq!(loc.coords(), seeded.coords());
        }
    }

    #[test]
    fn match_mode_renames_when_destination_not_in_pool() {
        let mut plan = mock_itinerary();
        plan[0].location = "Trincomalee".to_string();
        let pool = sri_lanka_locations();
        let mut rng = StdRng::seed_from_u64(4);
        let locs = sync_locations(&plan, &pool, Selection::MatchItinerary, &mut rng);

        assert_eq!(locs.len(), 6);
        assert_eq!(locs[0].name, "Trincomalee");
        // Colombo's slot went to Trincomalee, so Colombo's coordinates were reused.
        assert_eq!(locs[0].coords(), pool[0].coords());
        for (loc, entry) in locs.iter().zip(&plan) {
            assert_eq!(loc.name, entry.location);
        }
    }

    #[test]
    fn short_pool_clamps_instead_of_failing() {
        let plan = mock_itinerary();
        let pool: Vec<Location> = sri_lanka_locations().into_iter().take(2).collect();
        let mut rng = StdRng::seed_from_u64(6);

        let locs = sync_locations(&plan, &pool, Selection::MatchItinerary, &mut rng);
        assert_eq!(locs.len(), 2);
        assert_eq!(days(&locs), vec![1, 2]);

        let locs = sync_locations(&plan, &pool, Selection::Sample { min: 4, max: 6 }, &mut rng);
        assert_eq!(locs.len(), 2);
    }

    #[test]
    fn empty_pool_yields_empty_list() {
        let mut rng = StdRng::seed_from_u64(6);
        let locs = sync_locations(&mock_itinerary(), &[], Selection::MatchItinerary, &mut rng);
        assert!(locs.is_empty());
    }

    #[test]
    fn sample_mode_stays_within_bounds() {
        let plan = mock_itinerary();
        let pool = sri_lanka_locations();
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..50 {
            let locs = sync_locations(&plan, &pool, Selection::Sample { min: 4, max: 6 }, &mut rng);
            assert!((4..=6).contains(&locs.len()), "got {}", locs.len());
            assert!(check_dense_days(days(&locs)).is_ok());
            assert!(locs.iter().all(|l| pool.iter().any(|p| p.name == l.name)));
        }
    }

    #[test]
    fn sample_mode_never_exceeds_itinerary() {
        let plan: Vec<_> = mock_itinerary().into_iter().take(3).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let locs = sync_locations(&plan, &sri_lanka_locations(), Selection::Sample { min: 4, max: 6 }, &mut rng);
        assert_eq!(locs.len(), 3);
    }
}
