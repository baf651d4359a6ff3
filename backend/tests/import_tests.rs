//! Import batch tests
//!
//! Tests for the row-by-row batch loader semantics: a bad row fails alone,
//! earlier and later rows still commit, and the batch status reflects the mix.

use proptest::prelude::*;
use std::collections::HashMap;

use shared::models::{batch_status, ImportRowOutcome, ImportStatus};

/// One import row in the simulation
#[derive(Clone, Debug)]
struct Row {
    sku: &'static str,
    direction: &'static str,
    quantity: i64,
}

/// Apply rows sequentially against a single-warehouse balance map, mirroring
/// the loader: every row goes through the same receive/issue rules, failures
/// are recorded and skipped over.
fn apply_rows(
    balances: &mut HashMap<&'static str, i64>,
    rows: &[Row],
) -> Vec<ImportRowOutcome> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let result: Result<(), String> = if row.quantity <= 0 {
                Err("Quantity must be positive".to_string())
            } else if !balances.contains_key(row.sku) {
                Err(format!("Product with SKU {} not found", row.sku))
            } else {
                match row.direction {
                    "in" => {
                        *balances.get_mut(row.sku).unwrap() += row.quantity;
                        Ok(())
                    }
                    "out" => {
                        let available = balances[row.sku];
                        if available >= row.quantity {
                            *balances.get_mut(row.sku).unwrap() -= row.quantity;
                            Ok(())
                        } else {
                            Err(format!("Insufficient stock: {} available", available))
                        }
                    }
                    other => Err(format!("Unknown direction '{}'", other)),
                }
            };
            ImportRowOutcome {
                row: (index + 1) as u32,
                sku: row.sku.to_string(),
                succeeded: result.is_ok(),
                error: result.err(),
            }
        })
        .collect()
}

fn status_of(outcomes: &[ImportRowOutcome]) -> ImportStatus {
    let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
    batch_status(succeeded, outcomes.len())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn seeded() -> HashMap<&'static str, i64> {
        HashMap::from([("SKU-A", 10), ("SKU-B", 0)])
    }

    #[test]
    fn test_all_rows_succeed() {
        let mut balances = seeded();
        let rows = vec![
            Row { sku: "SKU-A", direction: "in", quantity: 5 },
            Row { sku: "SKU-B", direction: "in", quantity: 3 },
            Row { sku: "SKU-A", direction: "out", quantity: 2 },
        ];

        let outcomes = apply_rows(&mut balances, &rows);
        assert_eq!(status_of(&outcomes), ImportStatus::Success);
        assert_eq!(balances["SKU-A"], 13);
        assert_eq!(balances["SKU-B"], 3);
    }

    #[test]
    fn test_failed_row_does_not_roll_back_neighbors() {
        // Row 3 of 5 references an unknown SKU; the other four must commit.
        let mut balances = seeded();
        let rows = vec![
            Row { sku: "SKU-A", direction: "in", quantity: 1 },
            Row { sku: "SKU-A", direction: "in", quantity: 2 },
            Row { sku: "SKU-X", direction: "in", quantity: 9 },
            Row { sku: "SKU-A", direction: "in", quantity: 3 },
            Row { sku: "SKU-A", direction: "out", quantity: 4 },
        ];

        let outcomes = apply_rows(&mut balances, &rows);

        assert_eq!(status_of(&outcomes), ImportStatus::Partial);
        assert_eq!(outcomes.iter().filter(|o| o.succeeded).count(), 4);
        assert!(!outcomes[2].succeeded);
        assert_eq!(outcomes[2].row, 3);
        // 10 + 1 + 2 + 3 - 4
        assert_eq!(balances["SKU-A"], 12);
    }

    #[test]
    fn test_insufficient_stock_row_fails_alone() {
        let mut balances = seeded();
        let rows = vec![
            Row { sku: "SKU-B", direction: "out", quantity: 1 },
            Row { sku: "SKU-A", direction: "out", quantity: 5 },
        ];

        let outcomes = apply_rows(&mut balances, &rows);

        assert!(!outcomes[0].succeeded);
        assert!(outcomes[0].error.as_deref().unwrap().contains("0 available"));
        assert!(outcomes[1].succeeded);
        assert_eq!(balances["SKU-A"], 5);
        assert_eq!(status_of(&outcomes), ImportStatus::Partial);
    }

    #[test]
    fn test_all_rows_fail() {
        let mut balances = seeded();
        let rows = vec![
            Row { sku: "SKU-X", direction: "in", quantity: 1 },
            Row { sku: "SKU-A", direction: "sideways", quantity: 1 },
        ];

        let outcomes = apply_rows(&mut balances, &rows);
        assert_eq!(status_of(&outcomes), ImportStatus::Failed);
        assert_eq!(balances["SKU-A"], 10);
    }

    #[test]
    fn test_empty_batch_is_failed() {
        let mut balances = seeded();
        let outcomes = apply_rows(&mut balances, &[]);
        assert_eq!(status_of(&outcomes), ImportStatus::Failed);
    }

    #[test]
    fn test_row_numbers_are_one_based_file_order() {
        let mut balances = seeded();
        let rows = vec![
            Row { sku: "SKU-A", direction: "in", quantity: 1 },
            Row { sku: "SKU-A", direction: "in", quantity: 1 },
            Row { sku: "SKU-A", direction: "in", quantity: 1 },
        ];

        let outcomes = apply_rows(&mut balances, &rows);
        let numbers: Vec<u32> = outcomes.iter().map(|o| o.row).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn row_strategy() -> impl Strategy<Value = Row> {
        (
            prop_oneof![Just("SKU-A"), Just("SKU-B"), Just("SKU-X")],
            prop_oneof![Just("in"), Just("out")],
            1i64..100,
        )
            .prop_map(|(sku, direction, quantity)| Row {
                sku,
                direction,
                quantity,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Succeeded + failed always partitions the batch
        #[test]
        fn prop_outcomes_partition_batch(
            rows in prop::collection::vec(row_strategy(), 0..30)
        ) {
            let mut balances = HashMap::from([("SKU-A", 50i64), ("SKU-B", 5i64)]);
            let outcomes = apply_rows(&mut balances, &rows);

            let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
            let failed = outcomes.iter().filter(|o| !o.succeeded).count();
            prop_assert_eq!(succeeded + failed, rows.len());

            let expected = batch_status(succeeded, rows.len());
            prop_assert_eq!(status_of(&outcomes), expected);
        }

        /// Balances stay non-negative under any batch content
        #[test]
        fn prop_batch_preserves_non_negativity(
            rows in prop::collection::vec(row_strategy(), 0..30)
        ) {
            let mut balances = HashMap::from([("SKU-A", 50i64), ("SKU-B", 5i64)]);
            apply_rows(&mut balances, &rows);

            for quantity in balances.values() {
                prop_assert!(*quantity >= 0);
            }
        }

        /// Every failed row carries an error message, no succeeded row does
        #[test]
        fn prop_error_presence_matches_outcome(
            rows in prop::collection::vec(row_strategy(), 0..30)
        ) {
            let mut balances = HashMap::from([("SKU-A", 50i64), ("SKU-B", 5i64)]);
            let outcomes = apply_rows(&mut balances, &rows);

            for outcome in &outcomes {
                prop_assert_eq!(outcome.error.is_some(), !outcome.succeeded);
            }
        }
    }
}
