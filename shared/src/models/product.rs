//! Product catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default unit of measure for new products
pub const DEFAULT_UNIT_OF_MEASURE: &str = "UNIT";

/// A product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    /// Unique product code (SKU)
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    /// Running stock counter, mutated by movements
    pub stock: Decimal,
    pub unit_of_measure: String,
    /// Consumption units per box
    pub units_per_box: Option<i32>,
    /// Boxes per pallet
    pub boxes_per_pallet: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Consumption units carried by a full pallet, when both factors are known
    pub fn units_per_pallet(&self) -> Option<i32> {
        match (self.units_per_box, self.boxes_per_pallet) {
            (Some(units), Some(boxes)) => units.checked_mul(boxes),
            _ => None,
        }
    }
}

/// Input for creating a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductInput {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub stock: Decimal,
    pub unit_of_measure: Option<String>,
    pub units_per_box: Option<i32>,
    pub boxes_per_pallet: Option<i32>,
}

/// Input for updating a product; absent fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProductInput {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub stock: Option<Decimal>,
    pub unit_of_measure: Option<String>,
    pub units_per_box: Option<i32>,
    pub boxes_per_pallet: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(units_per_box: Option<i32>, boxes_per_pallet: Option<i32>) -> Product {
        Product {
            id: Uuid::new_v4(),
            code: "P-001".to_string(),
            name: "Yerba".to_string(),
            description: None,
            stock: Decimal::ZERO,
            unit_of_measure: DEFAULT_UNIT_OF_MEASURE.to_string(),
            units_per_box,
            boxes_per_pallet,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_units_per_pallet() {
        assert_eq!(product(Some(12), Some(40)).units_per_pallet(), Some(480));
        assert_eq!(product(Some(12), None).units_per_pallet(), None);
        assert_eq!(product(Some(i32::MAX), Some(2)).units_per_pallet(), None);
    }

    #[test]
    fn test_create_input_defaults_stock() {
        let input: CreateProductInput =
            serde_json::from_str(r#"{"code":"A1","name":"Arroz","description":null}"#).unwrap();
        assert_eq!(input.stock, Decimal::ZERO);
        assert!(input.unit_of_measure.is_none());
    }
}
