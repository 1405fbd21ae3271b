//! HTTP handlers for stock movements

use axum::{
    extract::{Path, State},
    Json,
};
use shared::{MovementInput, MovementView};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::MovementService;
use crate::AppState;

/// List movements, newest first
pub async fn list_movements(State(state): State<AppState>) -> AppResult<Json<Vec<MovementView>>> {
    let service = MovementService::new(state.db);
    let movements = service.list().await?;
    Ok(Json(movements))
}

/// Get a movement by id
pub async fn get_movement(
    State(state): State<AppState>,
    Path(movement_id): Path<Uuid>,
) -> AppResult<Json<MovementView>> {
    let service = MovementService::new(state.db);
    let movement = service.get(movement_id).await?;
    Ok(Json(movement))
}

/// Record a movement (entry, exit or transfer)
pub async fn record_movement(
    State(state): State<AppState>,
    Json(input): Json<MovementInput>,
) -> AppResult<Json<MovementView>> {
    let service = MovementService::new(state.db);
    let movement = service.record(input).await?;
    Ok(Json(movement))
}

/// Correct a recorded movement
pub async fn update_movement(
    State(state): State<AppState>,
    Path(movement_id): Path<Uuid>,
    Json(input): Json<MovementInput>,
) -> AppResult<Json<MovementView>> {
    let service = MovementService::new(state.db);
    let movement = service.update(movement_id, input).await?;
    Ok(Json(movement))
}

/// Delete a movement, undoing its stock effect
pub async fn delete_movement(
    State(state): State<AppState>,
    Path(movement_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = MovementService::new(state.db);
    service.delete(movement_id).await?;
    Ok(Json(()))
}
