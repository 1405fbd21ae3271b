//! Per-warehouse stock aggregation from movement history

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MovementType, SlotCoordinate};

/// Warehouse reference resolved for a movement endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseRef {
    pub id: Uuid,
    pub name: String,
}

/// A movement with its endpoints resolved to warehouses and slots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedMovement {
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub origin_warehouse: Option<WarehouseRef>,
    pub destination_warehouse: Option<WarehouseRef>,
    pub origin_slot: Option<SlotCoordinate>,
    pub destination_slot: Option<SlotCoordinate>,
}

/// Stock of one product inside one warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseStock {
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub quantity: Decimal,
    /// Distinct slot codes that received this product, sorted
    pub positions: Vec<String>,
}

#[derive(Default)]
struct Bucket {
    name: String,
    quantity: Decimal,
    positions: BTreeSet<String>,
}

fn bucket<'a>(totals: &'a mut BTreeMap<Uuid, Bucket>, warehouse: &WarehouseRef) -> &'a mut Bucket {
    let entry = totals.entry(warehouse.id).or_default();
    if entry.name.is_empty() {
        entry.name = warehouse.name.clone();
    }
    entry
}

/// Replay a product's movement history into per-warehouse totals.
///
/// Entries add to the destination warehouse and record the destination slot,
/// exits subtract from the origin, transfers do both. Rows missing the
/// warehouse they need are skipped. Output is sorted by warehouse name.
pub fn aggregate_stock(movements: &[ResolvedMovement]) -> Vec<WarehouseStock> {
    let mut totals: BTreeMap<Uuid, Bucket> = BTreeMap::new();

    for movement in movements {
        if movement.movement_type.requires_origin() {
            if let Some(origin) = &movement.origin_warehouse {
                bucket(&mut totals, origin).quantity -= movement.quantity;
            }
        }
        if movement.movement_type.requires_destination() {
            if let Some(destination) = &movement.destination_warehouse {
                let entry = bucket(&mut totals, destination);
                entry.quantity += movement.quantity;
                if let Some(slot) = &movement.destination_slot {
                    entry.positions.insert(slot.code());
                }
            }
        }
    }

    let mut stock: Vec<WarehouseStock> = totals
        .into_iter()
        .map(|(warehouse_id, bucket)| WarehouseStock {
            warehouse_id,
            warehouse_name: bucket.name,
            quantity: bucket.quantity,
            positions: bucket.positions.into_iter().collect(),
        })
        .collect();
    stock.sort_by(|a, b| {
        a.warehouse_name
            .cmp(&b.warehouse_name)
            .then(a.warehouse_id.cmp(&b.warehouse_id))
    });
    stock
}

/// Product with its recorded stock and per-warehouse breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductStock {
    pub product_id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub stock: Decimal,
    pub unit_of_measure: String,
    pub warehouses: Vec<WarehouseStock>,
}

/// Flat row for CSV export of the stock overview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockExportRow {
    pub code: String,
    pub name: String,
    pub warehouse: String,
    pub quantity: Decimal,
    pub unit: String,
    pub positions: String,
}

impl ProductStock {
    pub fn export_rows(&self) -> Vec<StockExportRow> {
        self.warehouses
            .iter()
            .map(|w| StockExportRow {
                code: self.code.clone(),
                name: self.name.clone(),
                warehouse: w.warehouse_name.clone(),
                quantity: w.quantity,
                unit: self.unit_of_measure.clone(),
                positions: w.positions.join(", "),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warehouse(name: &str) -> WarehouseRef {
        WarehouseRef {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    fn slot(rack: char, column: char, level: i32, depth: i32) -> SlotCoordinate {
        SlotCoordinate { rack, column, level, depth }
    }

    fn movement(
        movement_type: MovementType,
        quantity: i64,
        origin: Option<&WarehouseRef>,
        destination: Option<&WarehouseRef>,
        destination_slot: Option<SlotCoordinate>,
    ) -> ResolvedMovement {
        ResolvedMovement {
            movement_type,
            quantity: Decimal::from(quantity),
            origin_warehouse: origin.cloned(),
            destination_warehouse: destination.cloned(),
            origin_slot: None,
            destination_slot,
        }
    }

    #[test]
    fn test_entries_and_exits() {
        let central = warehouse("Central");
        let norte = warehouse("Norte");
        let history = vec![
            movement(MovementType::Entry, 10, None, Some(&central), Some(slot('A', 'A', 1, 1))),
            movement(MovementType::Entry, 5, None, Some(&central), Some(slot('A', 'B', 2, 1))),
            movement(MovementType::Entry, 5, None, Some(&central), Some(slot('A', 'A', 1, 1))),
            movement(MovementType::Exit, 7, Some(&central), None, None),
            movement(MovementType::Entry, 3, None, Some(&norte), None),
        ];

        let stock = aggregate_stock(&history);
        assert_eq!(stock.len(), 2);
        assert_eq!(stock[0].warehouse_name, "Central");
        assert_eq!(stock[0].quantity, Decimal::from(13));
        assert_eq!(stock[0].positions, vec!["AA11", "AB21"]);
        assert_eq!(stock[1].warehouse_name, "Norte");
        assert_eq!(stock[1].quantity, Decimal::from(3));
        assert!(stock[1].positions.is_empty());
    }

    #[test]
    fn test_transfer_moves_between_warehouses() {
        let central = warehouse("Central");
        let norte = warehouse("Norte");
        let history = vec![
            movement(MovementType::Entry, 10, None, Some(&central), None),
            movement(MovementType::Transfer, 4, Some(&central), Some(&norte), Some(slot('B', 'C', 1, 2))),
        ];

        let stock = aggregate_stock(&history);
        assert_eq!(stock[0].quantity, Decimal::from(6));
        assert_eq!(stock[1].quantity, Decimal::from(4));
        assert_eq!(stock[1].positions, vec!["BC12"]);

        let total: Decimal = stock.iter().map(|w| w.quantity).sum();
        assert_eq!(total, Decimal::from(10));
    }

    #[test]
    fn test_exit_only_goes_negative() {
        // History may start mid-stream; the aggregate does not clamp
        let central = warehouse("Central");
        let stock = aggregate_stock(&[movement(MovementType::Exit, 2, Some(&central), None, None)]);
        assert_eq!(stock[0].quantity, Decimal::from(-2));
    }

    #[test]
    fn test_unresolved_warehouse_skipped() {
        let stock = aggregate_stock(&[movement(MovementType::Entry, 2, None, None, None)]);
        assert!(stock.is_empty());
    }

    #[test]
    fn test_export_rows() {
        let central = warehouse("Central");
        let product = ProductStock {
            product_id: Uuid::new_v4(),
            code: "P1".to_string(),
            name: "Aceite".to_string(),
            description: None,
            stock: Decimal::from(8),
            unit_of_measure: "UNIT".to_string(),
            warehouses: aggregate_stock(&[
                movement(MovementType::Entry, 8, None, Some(&central), Some(slot('A', 'A', 1, 1))),
                movement(MovementType::Entry, 0, None, Some(&central), Some(slot('A', 'B', 1, 1))),
            ]),
        };
        let rows = product.export_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].positions, "AA11, AB11");
        assert_eq!(rows[0].warehouse, "Central");
    }
}
