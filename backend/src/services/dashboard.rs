//! Dashboard statistics service

use rust_decimal::Decimal;
use shared::{DashboardStats, MovementType, PositionState};
use sqlx::PgPool;

use super::{movement::totals_by_type, parse_stored};
use crate::error::AppResult;

#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

impl DashboardService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Collect the headline numbers
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let (total_products, total_stock) = sqlx::query_as::<_, (i64, Decimal)>(
            "SELECT COUNT(*), COALESCE(SUM(stock), 0) FROM products",
        )
        .fetch_one(&self.db)
        .await?;

        let mut stats = DashboardStats {
            total_products,
            total_stock,
            ..Default::default()
        };

        for (movement_type, total) in totals_by_type(&self.db).await? {
            match movement_type {
                MovementType::Entry => stats.total_entries = total,
                MovementType::Exit => stats.total_exits = total,
                MovementType::Transfer => stats.total_transfers = total,
            }
        }

        let by_state = sqlx::query_as::<_, (String, i64)>(
            "SELECT state, COUNT(*) FROM positions GROUP BY state",
        )
        .fetch_all(&self.db)
        .await?;

        for (state, count) in by_state {
            match parse_stored::<PositionState>(&state)? {
                PositionState::Available => stats.available_positions = count,
                PositionState::Occupied => stats.occupied_positions = count,
            }
        }

        stats.occupancy = stats.occupancy_percent();
        Ok(stats)
    }
}
