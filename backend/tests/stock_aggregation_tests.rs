//! Stock aggregation tests
//!
//! Tests for the per-warehouse stock overview:
//! - Per-warehouse total = Sum(ENTRY into warehouse) - Sum(EXIT from warehouse)
//! - Transfers move stock between warehouses without changing the total
//! - Slot codes are distinct and sorted

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{aggregate_stock, MovementType, ResolvedMovement, SlotCoordinate, WarehouseRef};
use std::collections::HashMap;
use uuid::Uuid;

fn warehouses() -> Vec<WarehouseRef> {
    ["Central", "Norte", "Sur"]
        .iter()
        .enumerate()
        .map(|(i, name)| WarehouseRef {
            id: Uuid::from_u128(i as u128 + 1),
            name: name.to_string(),
        })
        .collect()
}

fn entry(warehouse: &WarehouseRef, quantity: i64, slot: Option<SlotCoordinate>) -> ResolvedMovement {
    ResolvedMovement {
        movement_type: MovementType::Entry,
        quantity: Decimal::from(quantity),
        origin_warehouse: None,
        destination_warehouse: Some(warehouse.clone()),
        origin_slot: None,
        destination_slot: slot,
    }
}

fn exit(warehouse: &WarehouseRef, quantity: i64) -> ResolvedMovement {
    ResolvedMovement {
        movement_type: MovementType::Exit,
        quantity: Decimal::from(quantity),
        origin_warehouse: Some(warehouse.clone()),
        destination_warehouse: None,
        origin_slot: None,
        destination_slot: None,
    }
}

fn transfer(from: &WarehouseRef, to: &WarehouseRef, quantity: i64) -> ResolvedMovement {
    ResolvedMovement {
        movement_type: MovementType::Transfer,
        quantity: Decimal::from(quantity),
        origin_warehouse: Some(from.clone()),
        destination_warehouse: Some(to.clone()),
        origin_slot: None,
        destination_slot: None,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Empty history yields no warehouses
    #[test]
    fn test_empty_history() {
        assert!(aggregate_stock(&[]).is_empty());
    }

    /// Output is sorted by warehouse name regardless of history order
    #[test]
    fn test_sorted_by_name() {
        let w = warehouses();
        let stock = aggregate_stock(&[entry(&w[2], 1, None), entry(&w[0], 1, None), entry(&w[1], 1, None)]);
        let names: Vec<&str> = stock.iter().map(|s| s.warehouse_name.as_str()).collect();
        assert_eq!(names, vec!["Central", "Norte", "Sur"]);
    }

    /// The same slot entered twice is listed once
    #[test]
    fn test_slot_codes_distinct() {
        let w = warehouses();
        let slot = SlotCoordinate { rack: 'A', column: 'B', level: 1, depth: 2 };
        let other = SlotCoordinate { rack: 'A', column: 'A', level: 3, depth: 1 };
        let stock = aggregate_stock(&[
            entry(&w[0], 4, Some(slot)),
            entry(&w[0], 6, Some(other)),
            entry(&w[0], 1, Some(slot)),
        ]);
        assert_eq!(stock[0].quantity, Decimal::from(11));
        assert_eq!(stock[0].positions, vec!["AA31", "AB12"]);
    }

    /// A transfer touching a warehouse with no prior entries still lists it
    #[test]
    fn test_transfer_creates_destination_bucket() {
        let w = warehouses();
        let stock = aggregate_stock(&[entry(&w[0], 10, None), transfer(&w[0], &w[2], 10)]);
        assert_eq!(stock.len(), 2);
        assert_eq!(stock[0].quantity, Decimal::ZERO);
        assert_eq!(stock[1].warehouse_name, "Sur");
        assert_eq!(stock[1].quantity, Decimal::from(10));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// (kind, origin index, destination index, quantity); kind 0 entry, 1 exit, 2 transfer
    fn step_strategy() -> impl Strategy<Value = (u8, usize, usize, i64)> {
        (0u8..3, 0usize..3, 0usize..3, 1i64..=500)
    }

    fn build(steps: &[(u8, usize, usize, i64)], w: &[WarehouseRef], with_transfers: bool) -> Vec<ResolvedMovement> {
        steps
            .iter()
            .map(|&(kind, from, to, quantity)| match kind {
                0 => entry(&w[to], quantity, None),
                2 if with_transfers => transfer(&w[from], &w[to], quantity),
                _ => exit(&w[from], quantity),
            })
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Per-warehouse total equals entries into it minus exits from it
        #[test]
        fn prop_entry_exit_totals(
            steps in prop::collection::vec(step_strategy(), 0..40)
        ) {
            let w = warehouses();
            let history = build(&steps, &w, false);

            let mut expected: HashMap<Uuid, Decimal> = HashMap::new();
            for movement in &history {
                match movement.movement_type {
                    MovementType::Entry => {
                        let id = movement.destination_warehouse.as_ref().unwrap().id;
                        *expected.entry(id).or_default() += movement.quantity;
                    }
                    MovementType::Exit => {
                        let id = movement.origin_warehouse.as_ref().unwrap().id;
                        *expected.entry(id).or_default() -= movement.quantity;
                    }
                    MovementType::Transfer => unreachable!(),
                }
            }

            let stock = aggregate_stock(&history);
            prop_assert_eq!(stock.len(), expected.len());
            for row in &stock {
                prop_assert_eq!(Some(&row.quantity), expected.get(&row.warehouse_id));
            }
        }

        /// Transfers never change the grand total
        #[test]
        fn prop_transfers_preserve_total(
            steps in prop::collection::vec(step_strategy(), 0..40)
        ) {
            let w = warehouses();
            let with = aggregate_stock(&build(&steps, &w, true));

            let net: Decimal = steps
                .iter()
                .map(|&(kind, _, _, quantity)| match kind {
                    0 => Decimal::from(quantity),
                    1 => -Decimal::from(quantity),
                    _ => Decimal::ZERO,
                })
                .sum();
            let total: Decimal = with.iter().map(|row| row.quantity).sum();

            prop_assert_eq!(total, net);
        }

        /// Output is always sorted by warehouse name with sorted, distinct slots
        #[test]
        fn prop_output_sorted(
            slots in prop::collection::vec((0usize..3, 0u8..4, 0u8..4, 1i32..4, 1i32..4), 0..30)
        ) {
            let w = warehouses();
            let history: Vec<ResolvedMovement> = slots
                .iter()
                .map(|&(i, r, c, level, depth)| {
                    entry(
                        &w[i],
                        1,
                        Some(SlotCoordinate {
                            rack: (b'A' + r) as char,
                            column: (b'A' + c) as char,
                            level,
                            depth,
                        }),
                    )
                })
                .collect();

            let stock = aggregate_stock(&history);
            for pair in stock.windows(2) {
                prop_assert!(pair[0].warehouse_name <= pair[1].warehouse_name);
            }
            for row in &stock {
                let mut sorted = row.positions.clone();
                sorted.sort();
                sorted.dedup();
                prop_assert_eq!(&row.positions, &sorted);
            }
        }
    }
}
