use crate::core::posted::PostedSet;
use crate::domain::model::CatalogRecord;
use crate::utils::error::{BroadcastError, Result};
use rand::seq::SliceRandom;
use rand::Rng;

/// Eligible records that have not been posted yet.
pub fn eligible<'a>(records: &'a [CatalogRecord], posted: &PostedSet) -> Vec<&'a CatalogRecord> {
    records
        .iter()
        .filter(|record| record.is_eligible() && !posted.contains(&record.id))
        .collect()
}

/// Uniformly draws one unposted record.
pub fn pick_unposted<'a, R: Rng + ?Sized>(
    records: &'a [CatalogRecord],
    posted: &PostedSet,
    rng: &mut R,
) -> Result<&'a CatalogRecord> {
    let pool = eligible(records, posted);
    tracing::debug!("{} unposted cards available", pool.len());

    pool.choose(rng)
        .copied()
        .ok_or(BroadcastError::NoEligibleRecords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn sample_records() -> Vec<CatalogRecord> {
        vec![
            CatalogRecord::new("a", "101", "Batting"),
            CatalogRecord::new("b", "102", "Bowling"),
            CatalogRecord::new("c", "103", "Fielding"),
        ]
    }

    #[test]
    fn test_only_remaining_record_is_returned() {
        let records = sample_records();
        let posted = PostedSet::from_ids(vec!["a".to_string(), "b".to_string()]);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let card = pick_unposted(&records, &posted, &mut rng).unwrap();
            assert_eq!(card.id, "c");
        }
    }

    #[test]
    fn test_never_returns_posted_id() {
        let mut records = sample_records();
        records.extend((0..40).map(|i| CatalogRecord::new(&format!("id-{i}"), "1", "Card")));
        let posted = PostedSet::from_ids((0..40).step_by(2).map(|i| format!("id-{i}")));
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let card = pick_unposted(&records, &posted, &mut rng).unwrap();
            assert!(!posted.contains(&card.id));
        }
    }

    #[test]
    fn test_draws_cover_the_whole_pool() {
        let records = sample_records();
        let posted = PostedSet::new();
        let mut rng = StdRng::seed_from_u64(1);

        let seen: HashSet<_> = (0..100)
            .map(|_| pick_unposted(&records, &posted, &mut rng).unwrap().id.clone())
            .collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_ineligible_records_are_skipped() {
        let records = vec![
            CatalogRecord::new("a", "", "No image"),
            CatalogRecord::new("b", "102", ""),
            CatalogRecord::new("", "103", "No id"),
            CatalogRecord::new("d", "104", "Good"),
        ];
        let mut rng = StdRng::seed_from_u64(3);

        let card = pick_unposted(&records, &PostedSet::new(), &mut rng).unwrap();
        assert_eq!(card.id, "d");
    }

    #[test]
    fn test_all_posted_is_no_eligible_records() {
        let records = sample_records();
        let posted = PostedSet::from_ids(vec!["a".into(), "b".into(), "c".into()]);
        let mut rng = StdRng::seed_from_u64(9);

        let err = pick_unposted(&records, &posted, &mut rng).unwrap_err();
        assert!(matches!(err, BroadcastError::NoEligibleRecords));
    }

    #[test]
    fn test_posted_ineligible_ids_do_not_matter() {
        // Only eligible records count toward the pool.
        let records = vec![
            CatalogRecord::new("a", "", "No image"),
            CatalogRecord::new("b", "102", "Bowling"),
        ];
        let posted = PostedSet::from_ids(vec!["b".to_string()]);
        let mut rng = StdRng::seed_from_u64(5);

        assert!(pick_unposted(&records, &posted, &mut rng).is_err());
    }
}
