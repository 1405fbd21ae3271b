//! Stock movement models and the stock mutation rule

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::CreatePalletInput;

/// Kind of stock-affecting event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Goods arriving into a destination warehouse
    Entry,
    /// Goods leaving from an origin warehouse
    Exit,
    /// Goods moved between warehouses or slots; total stock unchanged
    #[serde(alias = "INTERNAL")]
    Transfer,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Entry => "ENTRY",
            MovementType::Exit => "EXIT",
            MovementType::Transfer => "TRANSFER",
        }
    }

    /// Signed effect of one unit of this movement on total product stock
    pub fn stock_sign(&self) -> Decimal {
        match self {
            MovementType::Entry => Decimal::ONE,
            MovementType::Exit => Decimal::NEGATIVE_ONE,
            MovementType::Transfer => Decimal::ZERO,
        }
    }

    pub fn requires_origin(&self) -> bool {
        matches!(self, MovementType::Exit | MovementType::Transfer)
    }

    pub fn requires_destination(&self) -> bool {
        matches!(self, MovementType::Entry | MovementType::Transfer)
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MovementType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ENTRY" => Ok(MovementType::Entry),
            "EXIT" => Ok(MovementType::Exit),
            "TRANSFER" | "INTERNAL" => Ok(MovementType::Transfer),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Raised when a stored enum string has no matching variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);

/// A recorded stock movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    pub id: Uuid,
    pub movement_type: MovementType,
    pub product_id: Uuid,
    pub origin_warehouse_id: Option<Uuid>,
    pub destination_warehouse_id: Option<Uuid>,
    pub origin_position_id: Option<Uuid>,
    pub destination_position_id: Option<Uuid>,
    pub quantity: Decimal,
    pub occurred_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Movement joined with display names for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementView {
    #[serde(flatten)]
    pub movement: Movement,
    pub product_code: String,
    pub product_name: String,
    pub origin_warehouse_name: Option<String>,
    pub destination_warehouse_name: Option<String>,
}

/// Input for recording or editing a movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementInput {
    pub movement_type: MovementType,
    pub product_id: Uuid,
    pub origin_warehouse_id: Option<Uuid>,
    pub destination_warehouse_id: Option<Uuid>,
    pub origin_position_id: Option<Uuid>,
    pub destination_position_id: Option<Uuid>,
    pub quantity: Decimal,
    pub occurred_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// Pallets received with an entry
    #[serde(default)]
    pub pallets: Vec<CreatePalletInput>,
}

/// Why a movement input is malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MovementError {
    #[error("quantity must be positive")]
    NonPositiveQuantity,
    #[error("{0} requires an origin warehouse")]
    MissingOrigin(MovementType),
    #[error("{0} requires a destination warehouse")]
    MissingDestination(MovementType),
    #[error("a position was given without its warehouse")]
    PositionWithoutWarehouse,
    #[error("origin and destination are the same location")]
    SameLocation,
    #[error("only entries can carry pallets")]
    PalletsOnNonEntry,
}

impl MovementError {
    /// Input field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            MovementError::NonPositiveQuantity => "quantity",
            MovementError::MissingOrigin(_) => "origin_warehouse_id",
            MovementError::MissingDestination(_) => "destination_warehouse_id",
            MovementError::PositionWithoutWarehouse => "position_id",
            MovementError::SameLocation => "destination_position_id",
            MovementError::PalletsOnNonEntry => "pallets",
        }
    }
}

impl MovementInput {
    /// Check quantity and the endpoints each movement type requires
    pub fn validate(&self) -> Result<(), MovementError> {
        if self.quantity <= Decimal::ZERO {
            return Err(MovementError::NonPositiveQuantity);
        }
        if self.movement_type.requires_origin() && self.origin_warehouse_id.is_none() {
            return Err(MovementError::MissingOrigin(self.movement_type));
        }
        if self.movement_type.requires_destination() && self.destination_warehouse_id.is_none() {
            return Err(MovementError::MissingDestination(self.movement_type));
        }
        if (self.origin_position_id.is_some() && self.origin_warehouse_id.is_none())
            || (self.destination_position_id.is_some() && self.destination_warehouse_id.is_none())
        {
            return Err(MovementError::PositionWithoutWarehouse);
        }
        if self.movement_type == MovementType::Transfer
            && self.origin_warehouse_id == self.destination_warehouse_id
            && self.origin_position_id == self.destination_position_id
        {
            return Err(MovementError::SameLocation);
        }
        if !self.pallets.is_empty() && self.movement_type != MovementType::Entry {
            return Err(MovementError::PalletsOnNonEntry);
        }
        Ok(())
    }

    /// Drop endpoints the movement type does not use
    pub fn normalized(mut self) -> Self {
        if !self.movement_type.requires_origin() {
            self.origin_warehouse_id = None;
            self.origin_position_id = None;
        }
        if !self.movement_type.requires_destination() {
            self.destination_warehouse_id = None;
            self.destination_position_id = None;
        }
        self
    }
}

/// Stock rule violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("insufficient stock: available {available}, requested {requested}")]
    InsufficientStock { available: Decimal, requested: Decimal },
    #[error("stock value overflow")]
    Overflow,
}

/// Apply a movement to a product's current stock.
///
/// Entries add, exits subtract, transfers leave the total unchanged. A result
/// below zero is rejected and the caller must not write anything.
pub fn apply_movement(
    stock: Decimal,
    movement_type: MovementType,
    quantity: Decimal,
) -> Result<Decimal, StockError> {
    let delta = movement_type
        .stock_sign()
        .checked_mul(quantity)
        .ok_or(StockError::Overflow)?;
    let next = stock.checked_add(delta).ok_or(StockError::Overflow)?;
    if next < Decimal::ZERO {
        return Err(StockError::InsufficientStock {
            available: stock,
            requested: quantity,
        });
    }
    Ok(next)
}

/// Undo a previously applied movement (used when editing or deleting one)
pub fn revert_movement(
    stock: Decimal,
    movement_type: MovementType,
    quantity: Decimal,
) -> Result<Decimal, StockError> {
    let inverse = match movement_type {
        MovementType::Entry => MovementType::Exit,
        MovementType::Exit => MovementType::Entry,
        MovementType::Transfer => MovementType::Transfer,
    };
    apply_movement(stock, inverse, quantity)
}

/// Replace one applied movement with another on the same product.
///
/// Only the final stock has to stay at or above zero; the reverted value in
/// between is never stored.
pub fn replace_movement(
    stock: Decimal,
    old_type: MovementType,
    old_quantity: Decimal,
    new_type: MovementType,
    new_quantity: Decimal,
) -> Result<Decimal, StockError> {
    let old_delta = old_type
        .stock_sign()
        .checked_mul(old_quantity)
        .ok_or(StockError::Overflow)?;
    let new_delta = new_type
        .stock_sign()
        .checked_mul(new_quantity)
        .ok_or(StockError::Overflow)?;
    let net = new_delta.checked_sub(old_delta).ok_or(StockError::Overflow)?;
    let next = stock.checked_add(net).ok_or(StockError::Overflow)?;
    if next < Decimal::ZERO {
        return Err(StockError::InsufficientStock {
            available: stock,
            requested: -net,
        });
    }
    Ok(next)
}
