//! Movement log tests
//!
//! Tests for the append-only history: signed quantities, newest-first
//! ordering, and keyset cursor paging.

use chrono::Utc;
use proptest::prelude::*;
use uuid::Uuid;

use shared::models::{MovementEntry, MovementType};

fn entry(id: i64, movement_type: MovementType, quantity: i64) -> MovementEntry {
    MovementEntry {
        id,
        movement_type,
        product_id: Uuid::new_v4(),
        product_name: "Widget".to_string(),
        warehouse_id: Some(Uuid::new_v4()),
        warehouse_name: Some("Main".to_string()),
        quantity,
        reason: None,
        operator_id: Uuid::new_v4(),
        operator_name: "tester".to_string(),
        batch_id: None,
        created_at: Utc::now(),
    }
}

/// Keyset page over a log held newest-first, as the history endpoint returns
fn page(log: &[MovementEntry], before_id: Option<i64>, limit: usize) -> Vec<i64> {
    log.iter()
        .filter(|e| before_id.map_or(true, |b| e.id < b))
        .take(limit)
        .map(|e| e.id)
        .collect()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_signed_quantities_by_type() {
        assert_eq!(entry(1, MovementType::In, 8).signed_quantity(), 8);
        assert_eq!(entry(2, MovementType::Out, 8).signed_quantity(), -8);
        assert_eq!(entry(3, MovementType::Delete, 0).signed_quantity(), 0);
    }

    #[test]
    fn test_delete_entries_have_no_warehouse() {
        let mut e = entry(1, MovementType::Delete, 0);
        e.warehouse_id = None;
        e.warehouse_name = None;

        assert!(e.warehouse_id.is_none());
        assert_eq!(e.signed_quantity(), 0);
    }

    #[test]
    fn test_first_page_is_newest_entries() {
        let log: Vec<MovementEntry> = (1..=10)
            .rev()
            .map(|id| entry(id, MovementType::In, 1))
            .collect();

        let ids = page(&log, None, 3);
        assert_eq!(ids, vec![10, 9, 8]);
    }

    #[test]
    fn test_cursor_resumes_without_overlap_or_gap() {
        let log: Vec<MovementEntry> = (1..=10)
            .rev()
            .map(|id| entry(id, MovementType::In, 1))
            .collect();

        let first = page(&log, None, 4);
        let second = page(&log, first.last().copied(), 4);
        let third = page(&log, second.last().copied(), 4);

        assert_eq!(first, vec![10, 9, 8, 7]);
        assert_eq!(second, vec![6, 5, 4, 3]);
        assert_eq!(third, vec![2, 1]);
    }

    #[test]
    fn test_cursor_past_the_end_is_empty() {
        let log: Vec<MovementEntry> = (1..=3)
            .rev()
            .map(|id| entry(id, MovementType::In, 1))
            .collect();

        assert!(page(&log, Some(1), 10).is_empty());
    }

    #[test]
    fn test_export_walk_covers_history_beyond_one_page() {
        // History larger than the maximum page size: an export that walks
        // the cursor until exhaustion must emit every entry, in order,
        // instead of stopping at the first page.
        let total = 1203i64;
        let page_size = 500usize;
        let log: Vec<MovementEntry> = (1..=total)
            .rev()
            .map(|id| entry(id, MovementType::In, 1))
            .collect();

        let mut exported = Vec::new();
        let mut cursor = None;
        loop {
            let ids = page(&log, cursor, page_size);
            let got = ids.len();
            exported.extend(ids);
            if got < page_size {
                break;
            }
            cursor = exported.last().copied();
        }

        assert_eq!(exported.len() as i64, total);
        assert_eq!(exported.first(), Some(&total));
        assert_eq!(exported.last(), Some(&1));
    }

    #[test]
    fn test_limit_clamping() {
        // Mirrors the history endpoint's clamp of the requested page size
        let clamp = |requested: i64| requested.clamp(1, 500);

        assert_eq!(clamp(0), 1);
        assert_eq!(clamp(-5), 1);
        assert_eq!(clamp(100), 100);
        assert_eq!(clamp(9999), 500);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Walking the cursor to exhaustion visits every id exactly once,
        /// in strictly descending order
        #[test]
        fn prop_cursor_walk_is_a_partition(
            count in 1i64..200,
            limit in 1usize..50
        ) {
            let log: Vec<MovementEntry> = (1..=count)
                .rev()
                .map(|id| entry(id, MovementType::In, 1))
                .collect();

            let mut seen = Vec::new();
            let mut cursor = None;
            loop {
                let ids = page(&log, cursor, limit);
                if ids.is_empty() {
                    break;
                }
                cursor = ids.last().copied();
                seen.extend(ids);
            }

            prop_assert_eq!(seen.len() as i64, count);
            for pair in seen.windows(2) {
                prop_assert!(pair[0] > pair[1]);
            }
        }

        /// Net effect of a log equals the sum of signed quantities
        #[test]
        fn prop_net_effect_is_signed_sum(
            quantities in prop::collection::vec((any::<bool>(), 1i64..100), 1..30)
        ) {
            let log: Vec<MovementEntry> = quantities
                .iter()
                .enumerate()
                .map(|(i, (is_in, q))| {
                    let t = if *is_in { MovementType::In } else { MovementType::Out };
                    entry(i as i64 + 1, t, *q)
                })
                .collect();

            let expected: i64 = quantities
                .iter()
                .map(|(is_in, q)| if *is_in { *q } else { -q })
                .sum();
            let net: i64 = log.iter().map(MovementEntry::signed_quantity).sum();

            prop_assert_eq!(net, expected);
        }
    }
}
