//! Stock overview service
//!
//! Replays each product's movement history into per-warehouse totals.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    aggregate_stock, MovementType, Product, ProductStock, ResolvedMovement, SlotCoordinate,
    WarehouseRef,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{parse_stored, ProductService};
use crate::error::{AppError, AppResult};

/// Service for the stock overview screen
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Movement joined with its warehouses and slots
#[derive(Debug, FromRow)]
struct StockMovementRow {
    product_id: Uuid,
    movement_type: String,
    quantity: Decimal,
    origin_warehouse_id: Option<Uuid>,
    origin_warehouse_name: Option<String>,
    destination_warehouse_id: Option<Uuid>,
    destination_warehouse_name: Option<String>,
    origin_rack: Option<String>,
    origin_column: Option<String>,
    origin_level: Option<i32>,
    origin_depth: Option<i32>,
    destination_rack: Option<String>,
    destination_column: Option<String>,
    destination_level: Option<i32>,
    destination_depth: Option<i32>,
}

fn warehouse_ref(id: Option<Uuid>, name: Option<String>) -> Option<WarehouseRef> {
    Some(WarehouseRef { id: id?, name: name? })
}

fn slot(
    rack: Option<String>,
    column: Option<String>,
    level: Option<i32>,
    depth: Option<i32>,
) -> Option<SlotCoordinate> {
    Some(SlotCoordinate {
        rack: rack?.chars().next()?,
        column: column?.chars().next()?,
        level: level?,
        depth: depth?,
    })
}

impl StockMovementRow {
    fn resolve(self) -> AppResult<(Uuid, ResolvedMovement)> {
        let movement_type: MovementType = parse_stored(&self.movement_type)?;
        Ok((
            self.product_id,
            ResolvedMovement {
                movement_type,
                quantity: self.quantity,
                origin_warehouse: warehouse_ref(self.origin_warehouse_id, self.origin_warehouse_name),
                destination_warehouse: warehouse_ref(
                    self.destination_warehouse_id,
                    self.destination_warehouse_name,
                ),
                origin_slot: slot(self.origin_rack, self.origin_column, self.origin_level, self.origin_depth),
                destination_slot: slot(
                    self.destination_rack,
                    self.destination_column,
                    self.destination_level,
                    self.destination_depth,
                ),
            },
        ))
    }
}

impl StockService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Products matching the search, each with its per-warehouse breakdown
    pub async fn overview(&self, name_pattern: Option<&str>) -> AppResult<Vec<ProductStock>> {
        let products = ProductService::new(self.db.clone()).list(name_pattern).await?;
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let rows = sqlx::query_as::<_, StockMovementRow>(
            r#"
            SELECT m.product_id, m.movement_type, m.quantity,
                   m.origin_warehouse_id, wo.name AS origin_warehouse_name,
                   m.destination_warehouse_id, wd.name AS destination_warehouse_name,
                   po.rack AS origin_rack, po.rack_column AS origin_column,
                   po.level AS origin_level, po.depth AS origin_depth,
                   pd.rack AS destination_rack, pd.rack_column AS destination_column,
                   pd.level AS destination_level, pd.depth AS destination_depth
            FROM movements m
            LEFT JOIN warehouses wo ON wo.id = m.origin_warehouse_id
            LEFT JOIN warehouses wd ON wd.id = m.destination_warehouse_id
            LEFT JOIN positions po ON po.id = m.origin_position_id
            LEFT JOIN positions pd ON pd.id = m.destination_position_id
            WHERE m.product_id = ANY($1)
            ORDER BY m.occurred_at ASC, m.created_at ASC
            "#,
        )
        .bind(&product_ids)
        .fetch_all(&self.db)
        .await?;

        let mut history: HashMap<Uuid, Vec<ResolvedMovement>> = HashMap::new();
        for row in rows {
            let (product_id, movement) = row.resolve()?;
            history.entry(product_id).or_default().push(movement);
        }

        Ok(products
            .into_iter()
            .map(|product| {
                let movements = history.remove(&product.id).unwrap_or_default();
                product_stock(product, &movements)
            })
            .collect())
    }

    /// Serialize rows into CSV text
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}

fn product_stock(product: Product, movements: &[ResolvedMovement]) -> ProductStock {
    ProductStock {
        product_id: product.id,
        code: product.code,
        name: product.name,
        description: product.description,
        stock: product.stock,
        unit_of_measure: product.unit_of_measure,
        warehouses: aggregate_stock(movements),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::StockExportRow;

    #[test]
    fn test_slot_requires_every_part() {
        let full = slot(Some("A".into()), Some("C".into()), Some(2), Some(1));
        assert_eq!(full.map(|s| s.code()).as_deref(), Some("AC21"));
        assert!(slot(Some("A".into()), None, Some(2), Some(1)).is_none());
        assert!(slot(Some(String::new()), Some("C".into()), Some(2), Some(1)).is_none());
    }

    #[test]
    fn test_warehouse_ref_needs_id_and_name() {
        let id = Uuid::new_v4();
        assert!(warehouse_ref(Some(id), Some("Central".into())).is_some());
        assert!(warehouse_ref(Some(id), None).is_none());
        assert!(warehouse_ref(None, Some("Central".into())).is_none());
    }

    #[test]
    fn test_export_to_csv_writes_header() {
        let rows = vec![StockExportRow {
            code: "P1".to_string(),
            name: "Yerba".to_string(),
            warehouse: "Central".to_string(),
            quantity: Decimal::new(125, 1),
            unit: "UNIT".to_string(),
            positions: "AA11, AB21".to_string(),
        }];
        let csv = StockService::export_to_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("code,name,warehouse,quantity,unit,positions"));
        assert_eq!(lines.next(), Some("P1,Yerba,Central,12.5,UNIT,\"AA11, AB21\""));
    }
}
