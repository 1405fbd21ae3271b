//! Pallet models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UnknownVariant;

/// Lifecycle state of a pallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PalletState {
    /// Received but not yet stored in a slot
    #[default]
    ToPlace,
    /// Stored in a slot
    Placed,
    /// Shipped out of the warehouse
    Dispatched,
}

impl PalletState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PalletState::ToPlace => "TO_PLACE",
            PalletState::Placed => "PLACED",
            PalletState::Dispatched => "DISPATCHED",
        }
    }
}

impl std::str::FromStr for PalletState {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TO_PLACE" => Ok(PalletState::ToPlace),
            "PLACED" => Ok(PalletState::Placed),
            "DISPATCHED" => Ok(PalletState::Dispatched),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// A physical unit of a product batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pallet {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub product_id: Uuid,
    /// Consumption units on the pallet
    pub quantity: i32,
    pub lot: Option<String>,
    pub manufactured_on: Option<NaiveDate>,
    pub expires_on: Option<NaiveDate>,
    pub state: PalletState,
    pub position_id: Option<Uuid>,
    /// Entry movement that brought the pallet in
    pub movement_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Pallet joined with its product for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PalletView {
    #[serde(flatten)]
    pub pallet: Pallet,
    pub product_code: String,
    pub product_name: String,
    /// Whole and partial boxes on the pallet
    pub boxes: Decimal,
}

/// Input for creating a pallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePalletInput {
    pub code: String,
    pub description: Option<String>,
    /// Defaults to the movement's product when created with an entry
    pub product_id: Option<Uuid>,
    pub quantity: i32,
    pub lot: Option<String>,
    pub manufactured_on: Option<NaiveDate>,
    pub expires_on: Option<NaiveDate>,
}

/// Boxes on a pallet given the product's units per box.
///
/// Missing or zero `units_per_box` counts as one unit per box.
pub fn boxes_on_pallet(quantity: i32, units_per_box: Option<i32>) -> Decimal {
    let per_box = match units_per_box {
        Some(n) if n > 0 => n,
        _ => 1,
    };
    Decimal::from(quantity) / Decimal::from(per_box)
}
