//! HTTP handlers for pallets

use axum::{
    extract::{Path, State},
    Json,
};
use shared::{CreatePalletInput, PalletView};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::PalletService;
use crate::AppState;

pub async fn list_pallets(State(state): State<AppState>) -> AppResult<Json<Vec<PalletView>>> {
    let service = PalletService::new(state.db);
    let pallets = service.list().await?;
    Ok(Json(pallets))
}

pub async fn get_pallet(
    State(state): State<AppState>,
    Path(pallet_id): Path<Uuid>,
) -> AppResult<Json<PalletView>> {
    let service = PalletService::new(state.db);
    let pallet = service.get(pallet_id).await?;
    Ok(Json(pallet))
}

pub async fn create_pallet(
    State(state): State<AppState>,
    Json(input): Json<CreatePalletInput>,
) -> AppResult<Json<PalletView>> {
    let service = PalletService::new(state.db);
    let pallet = service.create(input).await?;
    Ok(Json(pallet))
}

/// Delete a pallet that is not stored in a position
pub async fn delete_pallet(
    State(state): State<AppState>,
    Path(pallet_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = PalletService::new(state.db);
    service.delete(pallet_id).await?;
    Ok(Json(()))
}
