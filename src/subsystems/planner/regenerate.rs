//! Itinerary regeneration: uniform shuffle, then number days by position.

use rand::Rng;
use rand::seq::SliceRandom;

use super::PlannerError;
use super::model::ItineraryItem;

/// Produce a freshly ordered itinerary from `source`.
///
/// Entries are permuted with a Fisher–Yates shuffle and `day` is rewritten
/// to `index + 1`, so the result always carries days `1..=len` exactly once
/// regardless of what days `source` held.
pub fn regenerate<R: Rng + ?Sized>(source: &[ItineraryItem], rng: &mut R) -> Vec<ItineraryItem> {
    let mut plan = source.to_vec();
    plan.shuffle(rng);
    renumber_days(&mut plan);
    plan
}

/// Rewrite `day` to match each entry's position.
pub fn renumber_days(plan: &mut [ItineraryItem]) {
    for (i, entry) in plan.iter_mut().enumerate() {
        entry.day = i as u32 + 1;
    }
}

/// Check that `days` is a permutation of `1..=n`.
pub fn check_dense_days<I>(days: I) -> Result<(), PlannerError>
where
    I: IntoIterator<Item = u32>,
{
    let mut days: Vec<u32> = days.into_iter().collect();
    days.sort_unstable();
    for (i, day) in days.iter().enumerate() {
        let expected = i as u32 + 1;
        if *day != expected {
            return Err(PlannerError::NonDenseDays { expected, found: *day });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsystems::planner::seed::mock_itinerary;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn keeps_cardinality_and_entries() {
        let source = mock_itinerary();
        let mut rng = StdRng::seed_from_u64(1);
        let plan = regenerate(&source, &mut rng);

        assert_eq!(plan.len(), source.len());
        let mut ids: Vec<_> = plan.iter().map(|e| e.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn days_follow_position() {
        let mut rng = StdRng::seed_from_u64(99);
        let plan = regenerate(&mock_itinerary(), &mut rng);
        for (i, entry) in plan.iter().enumerate() {
            assert_eq!(entry.day, i as u32 + 1);
        }
    }

    #[test]
    fn scrambled_source_days_are_repaired() {
        let mut source = mock_itinerary();
        for entry in &mut source {
            entry.day = 3;
        }
        let mut rng = StdRng::seed_from_u64(5);
        let plan = regenerate(&source, &mut rng);
        assert!(check_dense_days(plan.iter().map(|e| e.day)).is_ok());
    }

    #[test]
    fn shuffle_eventually_changes_order() {
        let source = mock_itinerary();
        let mut rng = StdRng::seed_from_u64(2024);
        let moved = (0..20).any(|_| {
            let plan = regenerate(&source, &mut rng);
            plan.iter().zip(&source).any(|(a, b)| a.id != b.id)
        });
        assert!(moved);
    }

    #[test]
    fn empty_source_yields_empty_plan() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(regenerate(&[], &mut rng).is_empty());
    }

    #[test]
    fn dense_check_reports_gaps_and_duplicates() {
        assert!(check_dense_days([2, 1, 3]).is_ok());
        assert!(check_dense_days(Vec::<u32>::new()).is_ok());
        assert_eq!(
            check_dense_days([1, 3]),
            Err(PlannerError::NonDenseDays { expected: 2, found: 3 })
        );
        assert_eq!(
            check_dense_days([1, 1, 2]),
            Err(PlannerError::NonDenseDays { expected: 2, found: 1 })
        );
    }
}
