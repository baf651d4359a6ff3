//! Stock ledger tests
//!
//! Tests for the ledger semantics:
//! - Stock lines never go negative
//! - Issue is a single conditional check-and-decrement
//! - Replaying the movement log reproduces current quantities

use proptest::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

use shared::models::MovementType;

/// In-memory model of the stock ledger with the same conditional-decrement
/// semantics as the SQL implementation
#[derive(Default)]
struct Ledger {
    lines: HashMap<(Uuid, Uuid), i64>,
    log: Vec<(MovementType, Uuid, Uuid, i64)>,
}

impl Ledger {
    fn receive(&mut self, product: Uuid, warehouse: Uuid, quantity: i64) {
        assert!(quantity > 0);
        *self.lines.entry((product, warehouse)).or_insert(0) += quantity;
        self.log.push((MovementType::In, product, warehouse, quantity));
    }

    /// Returns Err(available) when the warehouse does not hold enough
    fn issue(&mut self, product: Uuid, warehouse: Uuid, quantity: i64) -> Result<(), i64> {
        assert!(quantity > 0);
        let line = self.lines.entry((product, warehouse)).or_insert(0);
        if *line >= quantity {
            *line -= quantity;
            self.log.push((MovementType::Out, product, warehouse, quantity));
            Ok(())
        } else {
            Err(*line)
        }
    }

    fn quantity(&self, product: Uuid, warehouse: Uuid) -> i64 {
        *self.lines.get(&(product, warehouse)).unwrap_or(&0)
    }

    /// Rebuild quantities from the movement log alone
    fn replay(&self) -> HashMap<(Uuid, Uuid), i64> {
        let mut rebuilt: HashMap<(Uuid, Uuid), i64> = HashMap::new();
        for (movement_type, product, warehouse, quantity) in &self.log {
            *rebuilt.entry((*product, *warehouse)).or_insert(0) +=
                movement_type.sign() * quantity;
        }
        rebuilt
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_receive_then_issue() {
        let mut ledger = Ledger::default();
        let (p, w) = (Uuid::new_v4(), Uuid::new_v4());

        ledger.receive(p, w, 10);
        assert_eq!(ledger.quantity(p, w), 10);

        ledger.issue(p, w, 4).unwrap();
        assert_eq!(ledger.quantity(p, w), 6);
    }

    #[test]
    fn test_issue_more_than_available_fails_with_available() {
        let mut ledger = Ledger::default();
        let (p, w) = (Uuid::new_v4(), Uuid::new_v4());

        ledger.receive(p, w, 3);
        let err = ledger.issue(p, w, 5).unwrap_err();
        assert_eq!(err, 3);
        // Failed issue must not change the line
        assert_eq!(ledger.quantity(p, w), 3);
    }

    #[test]
    fn test_issue_from_empty_line_reports_zero_available() {
        let mut ledger = Ledger::default();
        let (p, w) = (Uuid::new_v4(), Uuid::new_v4());

        let err = ledger.issue(p, w, 1).unwrap_err();
        assert_eq!(err, 0);
    }

    #[test]
    fn test_issue_to_exactly_zero_then_fail() {
        let mut ledger = Ledger::default();
        let (p, w) = (Uuid::new_v4(), Uuid::new_v4());

        ledger.receive(p, w, 7);
        ledger.issue(p, w, 7).unwrap();
        assert_eq!(ledger.quantity(p, w), 0);

        let err = ledger.issue(p, w, 1).unwrap_err();
        assert_eq!(err, 0);
    }

    #[test]
    fn test_lines_are_per_warehouse() {
        let mut ledger = Ledger::default();
        let p = Uuid::new_v4();
        let (w1, w2) = (Uuid::new_v4(), Uuid::new_v4());

        ledger.receive(p, w1, 10);
        ledger.receive(p, w2, 2);

        // Plenty in w1 does not help an issue from w2
        let err = ledger.issue(p, w2, 5).unwrap_err();
        assert_eq!(err, 2);
        assert_eq!(ledger.quantity(p, w1), 10);
    }

    #[test]
    fn test_racing_issues_at_most_one_wins() {
        // Two requests for the full balance applied in either order: the
        // second must observe the decrement of the first.
        let mut ledger = Ledger::default();
        let (p, w) = (Uuid::new_v4(), Uuid::new_v4());

        ledger.receive(p, w, 5);
        let first = ledger.issue(p, w, 5);
        let second = ledger.issue(p, w, 5);

        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), 0);
        assert_eq!(ledger.quantity(p, w), 0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn op_strategy() -> impl Strategy<Value = (bool, u8, u8, i64)> {
        // (is_receive, product index, warehouse index, quantity)
        (any::<bool>(), 0u8..3, 0u8..3, 1i64..1000)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// No sequence of receives and issues can drive a line negative
        #[test]
        fn prop_quantities_never_negative(
            ops in prop::collection::vec(op_strategy(), 1..50)
        ) {
            let products: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
            let warehouses: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
            let mut ledger = Ledger::default();

            for (is_receive, pi, wi, quantity) in ops {
                let p = products[pi as usize];
                let w = warehouses[wi as usize];
                if is_receive {
                    ledger.receive(p, w, quantity);
                } else {
                    let _ = ledger.issue(p, w, quantity);
                }
            }

            for quantity in ledger.lines.values() {
                prop_assert!(*quantity >= 0);
            }
        }

        /// Replaying the movement log reproduces every line quantity
        #[test]
        fn prop_log_replay_reproduces_quantities(
            ops in prop::collection::vec(op_strategy(), 1..50)
        ) {
            let products: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
            let warehouses: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
            let mut ledger = Ledger::default();

            for (is_receive, pi, wi, quantity) in ops {
                let p = products[pi as usize];
                let w = warehouses[wi as usize];
                if is_receive {
                    ledger.receive(p, w, quantity);
                } else {
                    let _ = ledger.issue(p, w, quantity);
                }
            }

            let replayed = ledger.replay();
            for (key, quantity) in &ledger.lines {
                prop_assert_eq!(*replayed.get(key).unwrap_or(&0), *quantity);
            }
        }

        /// A rejected issue never changes any quantity
        #[test]
        fn prop_failed_issue_has_no_effect(
            initial in 0i64..100,
            requested in 1i64..200
        ) {
            prop_assume!(requested > initial);

            let mut ledger = Ledger::default();
            let (p, w) = (Uuid::new_v4(), Uuid::new_v4());
            if initial > 0 {
                ledger.receive(p, w, initial);
            }

            let err = ledger.issue(p, w, requested).unwrap_err();
            prop_assert_eq!(err, initial);
            prop_assert_eq!(ledger.quantity(p, w), initial);
        }

        /// Receives commute: total is order-independent
        #[test]
        fn prop_receives_commute(
            mut quantities in prop::collection::vec(1i64..1000, 2..10)
        ) {
            let (p, w) = (Uuid::new_v4(), Uuid::new_v4());

            let mut forward = Ledger::default();
            for q in &quantities {
                forward.receive(p, w, *q);
            }

            quantities.reverse();
            let mut backward = Ledger::default();
            for q in &quantities {
                backward.receive(p, w, *q);
            }

            prop_assert_eq!(forward.quantity(p, w), backward.quantity(p, w));
        }
    }
}
