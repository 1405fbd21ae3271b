//! Business logic services for the WMS Basic platform

use std::str::FromStr;

use shared::UnknownVariant;

use crate::error::{AppError, AppResult};

pub mod dashboard;
pub mod movement;
pub mod pallet;
pub mod position;
pub mod product;
pub mod stock;
pub mod warehouse;

pub use dashboard::DashboardService;
pub use movement::MovementService;
pub use pallet::PalletService;
pub use position::PositionService;
pub use product::ProductService;
pub use stock::StockService;
pub use warehouse::WarehouseService;

/// Parse an enum stored as text; a mismatch means the schema and code disagree
pub(crate) fn parse_stored<T>(value: &str) -> AppResult<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    value
        .parse()
        .map_err(|e: UnknownVariant| AppError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{MovementType, PalletState, PositionState};

    #[test]
    fn test_parse_stored() {
        assert_eq!(parse_stored::<MovementType>("EXIT").unwrap(), MovementType::Exit);
        assert_eq!(parse_stored::<PalletState>("PLACED").unwrap(), PalletState::Placed);
        assert_eq!(parse_stored::<PositionState>("OCCUPIED").unwrap(), PositionState::Occupied);
        assert!(matches!(
            parse_stored::<PositionState>("FREE"),
            Err(AppError::Internal(_))
        ));
    }
}
