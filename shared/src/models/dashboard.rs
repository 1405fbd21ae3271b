//! Dashboard statistics

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Headline numbers for the dashboard screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_products: i64,
    /// Sum of every product's stock counter
    pub total_stock: Decimal,
    pub total_entries: Decimal,
    pub total_exits: Decimal,
    pub total_transfers: Decimal,
    pub available_positions: i64,
    pub occupied_positions: i64,
    /// Occupied share of all positions, in percent
    pub occupancy: Decimal,
}

impl DashboardStats {
    /// Share of positions currently occupied, in percent
    pub fn occupancy_percent(&self) -> Decimal {
        let total = self.available_positions + self.occupied_positions;
        if total == 0 {
            return Decimal::ZERO;
        }
        (Decimal::from(self.occupied_positions) * Decimal::ONE_HUNDRED / Decimal::from(total))
            .round_dp(2)
    }
}
