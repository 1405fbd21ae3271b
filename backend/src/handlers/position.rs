//! HTTP handlers for positions, range creation and the rack layout

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{
    AssignPalletInput, NewPosition, Position, PositionFilter, PositionRange, RackScene,
    RangeCreationSummary, UpdatePositionInput,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::PositionService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RackQuery {
    pub warehouse_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ColumnQuery {
    pub warehouse_id: Option<Uuid>,
    pub rack: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LayoutQuery {
    pub warehouse_id: Option<Uuid>,
    pub rack: Option<String>,
    pub column: Option<String>,
    pub level: Option<i32>,
    /// Position drawn in the highlight colour
    pub selected: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct RangePreview {
    pub count: usize,
    pub positions: Vec<NewPosition>,
}

/// List positions filtered by warehouse, rack, column and level
pub async fn list_positions(
    State(state): State<AppState>,
    Query(filter): Query<PositionFilter>,
) -> AppResult<Json<Vec<Position>>> {
    let service = PositionService::new(state.db);
    let positions = service.list(&filter).await?;
    Ok(Json(positions))
}

/// Distinct racks for the picker
pub async fn list_racks(
    State(state): State<AppState>,
    Query(query): Query<RackQuery>,
) -> AppResult<Json<Vec<String>>> {
    let service = PositionService::new(state.db);
    let racks = service.list_racks(query.warehouse_id).await?;
    Ok(Json(racks))
}

/// Distinct columns for the picker
pub async fn list_columns(
    State(state): State<AppState>,
    Query(query): Query<ColumnQuery>,
) -> AppResult<Json<Vec<String>>> {
    let service = PositionService::new(state.db);
    let columns = service
        .list_columns(query.warehouse_id, query.rack.as_deref())
        .await?;
    Ok(Json(columns))
}

/// Create every position of a range, skipping ones that already exist
pub async fn create_position_range(
    State(state): State<AppState>,
    Json(range): Json<PositionRange>,
) -> AppResult<Json<RangeCreationSummary>> {
    let limit = state.config.limits.max_positions_per_range;
    let service = PositionService::new(state.db);
    let summary = service.create_range(range, limit).await?;
    Ok(Json(summary))
}

/// Show what a range would create
pub async fn preview_position_range(
    State(state): State<AppState>,
    Json(range): Json<PositionRange>,
) -> AppResult<Json<RangePreview>> {
    let limit = state.config.limits.max_positions_per_range;
    let service = PositionService::new(state.db);
    let positions = service.preview_range(&range, limit)?;
    Ok(Json(RangePreview {
        count: positions.len(),
        positions,
    }))
}

pub async fn update_position(
    State(state): State<AppState>,
    Path(position_id): Path<Uuid>,
    Json(input): Json<UpdatePositionInput>,
) -> AppResult<Json<Position>> {
    let service = PositionService::new(state.db);
    let position = service.update(position_id, input).await?;
    Ok(Json(position))
}

pub async fn delete_position(
    State(state): State<AppState>,
    Path(position_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = PositionService::new(state.db);
    service.delete(position_id).await?;
    Ok(Json(()))
}

/// Place a pallet in a position
pub async fn assign_pallet(
    State(state): State<AppState>,
    Path(position_id): Path<Uuid>,
    Json(input): Json<AssignPalletInput>,
) -> AppResult<Json<Position>> {
    let service = PositionService::new(state.db);
    let position = service.assign_pallet(position_id, input.pallet_id).await?;
    Ok(Json(position))
}

/// Free a position
pub async fn release_position(
    State(state): State<AppState>,
    Path(position_id): Path<Uuid>,
) -> AppResult<Json<Position>> {
    let service = PositionService::new(state.db);
    let position = service.release(position_id).await?;
    Ok(Json(position))
}

/// Rack layout for the 3D view
pub async fn get_rack_layout(
    State(state): State<AppState>,
    Query(query): Query<LayoutQuery>,
) -> AppResult<Json<RackScene>> {
    let filter = PositionFilter {
        warehouse_id: query.warehouse_id,
        rack: query.rack,
        column: query.column,
        level: query.level,
    };
    let service = PositionService::new(state.db);
    let scene = service.layout(&filter, query.selected).await?;
    Ok(Json(scene))
}
