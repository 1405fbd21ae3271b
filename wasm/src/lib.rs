//! WebAssembly module for WMS Basic
//!
//! Provides client-side computation for:
//! - Position range previews before submitting a bulk create
//! - Rack layout geometry for the 3D warehouse view
//! - Per-warehouse stock aggregation
//! - Movement form validation and the stock rule
//!
//! Complex values cross the boundary as JSON strings.

use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;
use wasm_bindgen::prelude::*;
use web_sys::console;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

fn to_js(message: String) -> JsValue {
    let value = JsValue::from_str(&message);
    console::error_1(&value);
    value
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|e| format!("Invalid {}: {}", field, e))
}

fn preview_range(range_json: &str, limit: usize) -> Result<String, String> {
    let range: PositionRange =
        serde_json::from_str(range_json).map_err(|e| format!("Invalid range JSON: {}", e))?;
    let positions = range.expand(limit).map_err(|e| e.to_string())?;
    serde_json::to_string(&positions).map_err(|e| e.to_string())
}

fn layout(positions_json: &str, filter_json: &str, selected: Option<String>) -> Result<String, String> {
    let positions: Vec<Position> = serde_json::from_str(positions_json)
        .map_err(|e| format!("Invalid positions JSON: {}", e))?;
    let filter: PositionFilter = if filter_json.trim().is_empty() {
        PositionFilter::default()
    } else {
        serde_json::from_str(filter_json).map_err(|e| format!("Invalid filter JSON: {}", e))?
    };
    let selected = selected
        .filter(|s| !s.is_empty())
        .map(|s| Uuid::parse_str(&s).map_err(|e| format!("Invalid selected id: {}", e)))
        .transpose()?;

    serde_json::to_string(&layout_racks(&positions, &filter, selected)).map_err(|e| e.to_string())
}

fn aggregate(movements_json: &str) -> Result<String, String> {
    let movements: Vec<ResolvedMovement> = serde_json::from_str(movements_json)
        .map_err(|e| format!("Invalid movements JSON: {}", e))?;
    serde_json::to_string(&aggregate_stock(&movements)).map_err(|e| e.to_string())
}

fn apply(stock: &str, movement_type: &str, quantity: &str) -> Result<String, String> {
    let stock = parse_decimal("stock", stock)?;
    let quantity = parse_decimal("quantity", quantity)?;
    let movement_type = MovementType::from_str(movement_type).map_err(|e| e.to_string())?;
    apply_movement(stock, movement_type, quantity)
        .map(|next| next.to_string())
        .map_err(|e| e.to_string())
}

fn check_movement(input_json: &str) -> Result<(), String> {
    let input: MovementInput =
        serde_json::from_str(input_json).map_err(|e| format!("Invalid movement JSON: {}", e))?;
    input
        .normalized()
        .validate()
        .map_err(|e| format!("{}: {}", e.field(), e))
}

/// Expand a position range into the slots it would create (JSON array)
#[wasm_bindgen]
pub fn preview_position_range(range_json: &str, limit: usize) -> Result<String, JsValue> {
    preview_range(range_json, limit).map_err(to_js)
}

/// Number of slots a range describes, without expanding it
#[wasm_bindgen]
pub fn count_position_range(range_json: &str) -> Result<usize, JsValue> {
    let range: PositionRange = serde_json::from_str(range_json)
        .map_err(|e| to_js(format!("Invalid range JSON: {}", e)))?;
    range.position_count().map_err(|e| to_js(e.to_string()))
}

/// Default values for the range form
#[wasm_bindgen]
pub fn default_position_range(warehouse_id: &str) -> Result<String, JsValue> {
    let warehouse_id = Uuid::parse_str(warehouse_id)
        .map_err(|e| to_js(format!("Invalid warehouse id: {}", e)))?;
    serde_json::to_string(&PositionRange::with_defaults(warehouse_id))
        .map_err(|e| to_js(e.to_string()))
}

/// Lay out positions for the 3D rack view
#[wasm_bindgen]
pub fn rack_layout(
    positions_json: &str,
    filter_json: &str,
    selected: Option<String>,
) -> Result<String, JsValue> {
    layout(positions_json, filter_json, selected).map_err(to_js)
}

/// Colour for an occupancy state (`AVAILABLE` or `OCCUPIED`)
#[wasm_bindgen]
pub fn position_state_color(state: &str) -> Result<String, JsValue> {
    let state = PositionState::from_str(state).map_err(|e| to_js(e.to_string()))?;
    Ok(position_color(state).to_string())
}

/// Compact slot code, e.g. `AC21`
#[wasm_bindgen]
pub fn position_code(rack: &str, column: &str, level: i32, depth: i32) -> String {
    format_position_code(rack, column, level, depth)
}

/// Per-warehouse stock from resolved movements (JSON array)
#[wasm_bindgen]
pub fn aggregate_warehouse_stock(movements_json: &str) -> Result<String, JsValue> {
    aggregate(movements_json).map_err(to_js)
}

/// Apply the stock rule; decimals are passed as strings to keep precision
#[wasm_bindgen]
pub fn apply_stock_movement(stock: &str, movement_type: &str, quantity: &str) -> Result<String, JsValue> {
    apply(stock, movement_type, quantity).map_err(to_js)
}

/// Validate a movement form before submitting it
#[wasm_bindgen]
pub fn validate_movement_input(input_json: &str) -> Result<(), JsValue> {
    check_movement(input_json).map_err(to_js)
}

/// Boxes on a pallet for the product's units per box
#[wasm_bindgen]
pub fn pallet_boxes(quantity: i32, units_per_box: Option<i32>) -> String {
    boxes_on_pallet(quantity, units_per_box).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAREHOUSE: &str = "6f1c2b0e-4a8d-4c1e-9d6a-1f2e3d4c5b6a";

    #[test]
    fn test_preview_default_range() {
        let range = serde_json::to_string(&PositionRange::with_defaults(Uuid::nil())).unwrap();
        let json = preview_range(&range, DEFAULT_MAX_POSITIONS_PER_RANGE).unwrap();
        let positions: Vec<NewPosition> = serde_json::from_str(&json).unwrap();
        assert_eq!(positions.len(), 135);
    }

    #[test]
    fn test_preview_rejects_reversed() {
        let mut range = PositionRange::with_defaults(Uuid::nil());
        range.column_start = "O".to_string();
        range.column_end = "A".to_string();
        let json = serde_json::to_string(&range).unwrap();
        let err = preview_range(&json, DEFAULT_MAX_POSITIONS_PER_RANGE).unwrap_err();
        assert!(err.contains("column"));
    }

    #[test]
    fn test_range_state_defaults_to_available() {
        let json = format!(
            r#"{{"warehouse_id":"{}","rack_start":"a","rack_end":"a","column_start":"a","column_end":"b",
                "level_start":1,"level_end":1,"depth_start":1,"depth_end":1}}"#,
            WAREHOUSE
        );
        let positions: Vec<NewPosition> =
            serde_json::from_str(&preview_range(&json, 10).unwrap()).unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[1].column, "B");
        assert_eq!(positions[0].state, PositionState::Available);
    }

    #[test]
    fn test_layout_with_empty_filter() {
        let positions = format!(
            r#"[{{"id":"{}","warehouse_id":"{}","rack":"A","column":"B","level":1,"depth":1,
                 "state":"AVAILABLE","pallet_id":null,"created_at":"2024-05-01T00:00:00Z"}}]"#,
            Uuid::nil(),
            WAREHOUSE
        );
        let scene: RackScene = serde_json::from_str(&layout(&positions, "", None).unwrap()).unwrap();
        assert_eq!(scene.racks.len(), 1);
        assert_eq!(scene.racks[0].cells[0].center, [3.5, 1.0, 0.0]);
        assert_eq!(scene.racks[0].cells[0].color, COLOR_AVAILABLE);

        let selected = layout(&positions, "{}", Some(Uuid::nil().to_string())).unwrap();
        let scene: RackScene = serde_json::from_str(&selected).unwrap();
        assert_eq!(scene.racks[0].cells[0].color, COLOR_SELECTED);
    }

    #[test]
    fn test_apply_stock_rule() {
        assert_eq!(apply("10", "ENTRY", "2.5").unwrap(), "12.5");
        assert_eq!(apply("10", "INTERNAL", "4").unwrap(), "10");
        assert!(apply("1", "EXIT", "2").is_err());
        assert!(apply("1", "SALIDA", "2").is_err());
        assert!(apply("x", "EXIT", "2").is_err());
    }

    #[test]
    fn test_aggregate_round_trip() {
        let movements = format!(
            r#"[{{"movement_type":"ENTRY","quantity":"5","origin_warehouse":null,
                 "destination_warehouse":{{"id":"{}","name":"Central"}},
                 "origin_slot":null,"destination_slot":{{"rack":"A","column":"A","level":1,"depth":1}}}}]"#,
            WAREHOUSE
        );
        let stock: Vec<WarehouseStock> = serde_json::from_str(&aggregate(&movements).unwrap()).unwrap();
        assert_eq!(stock.len(), 1);
        assert_eq!(stock[0].quantity, Decimal::from(5));
        assert_eq!(stock[0].positions, vec!["AA11"]);
    }

    #[test]
    fn test_check_movement() {
        let exit = format!(
            r#"{{"movement_type":"EXIT","product_id":"{}","quantity":"3"}}"#,
            WAREHOUSE
        );
        let err = check_movement(&exit).unwrap_err();
        assert!(err.starts_with("origin_warehouse_id"));

        let entry = format!(
            r#"{{"movement_type":"ENTRY","product_id":"{0}","destination_warehouse_id":"{0}","quantity":"3"}}"#,
            WAREHOUSE
        );
        assert!(check_movement(&entry).is_ok());
    }

    #[test]
    fn test_codes_and_boxes() {
        assert_eq!(position_code("A", "C", 2, 1), "AC21");
        assert_eq!(pallet_boxes(480, Some(12)), "40");
    }
}
