//! Validation utilities for WMS Basic catalog and warehouse data

use chrono::NaiveDate;
use rust_decimal::Decimal;

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate product code: 1-50 characters, no whitespace
pub fn validate_product_code(code: &str) -> Result<(), &'static str> {
    if code.is_empty() {
        return Err("Product code is required");
    }
    if code.chars().count() > 50 {
        return Err("Product code must be at most 50 characters");
    }
    if code.chars().any(char::is_whitespace) {
        return Err("Product code cannot contain spaces");
    }
    Ok(())
}

/// Validate a display name (products, warehouses)
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name is required");
    }
    if name.chars().count() > 200 {
        return Err("Name must be at most 200 characters");
    }
    Ok(())
}

/// Validate a stock value entered by hand
pub fn validate_stock(stock: Decimal) -> Result<(), &'static str> {
    if stock < Decimal::ZERO {
        return Err("Stock cannot be negative");
    }
    Ok(())
}

/// Validate a packaging factor (units per box, boxes per pallet)
pub fn validate_packaging_factor(factor: Option<i32>) -> Result<(), &'static str> {
    match factor {
        Some(n) if n <= 0 => Err("Packaging factors must be positive"),
        _ => Ok(()),
    }
}

// ============================================================================
// Position Validations
// ============================================================================

/// Validate a rack or column letter (single A-Z, upper case)
pub fn validate_slot_letter(letter: &str) -> Result<(), &'static str> {
    let mut chars = letter.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() => Ok(()),
        _ => Err("Rack and column must be a single upper-case letter"),
    }
}

/// Validate a level or depth index
pub fn validate_slot_index(index: i32) -> Result<(), &'static str> {
    if index < 1 {
        return Err("Level and depth start at 1");
    }
    Ok(())
}

// ============================================================================
// Pallet Validations
// ============================================================================

/// Validate the unit count on a pallet
pub fn validate_pallet_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Pallet quantity must be positive");
    }
    Ok(())
}

/// Validate that expiry does not precede manufacture
pub fn validate_pallet_dates(
    manufactured_on: Option<NaiveDate>,
    expires_on: Option<NaiveDate>,
) -> Result<(), &'static str> {
    if let (Some(made), Some(expires)) = (manufactured_on, expires_on) {
        if expires < made {
            return Err("Expiry date cannot be before manufacture date");
        }
    }
    Ok(())
}
