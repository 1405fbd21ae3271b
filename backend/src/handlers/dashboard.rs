//! HTTP handler for dashboard statistics

use axum::{extract::State, Json};
use shared::DashboardStats;

use crate::error::AppResult;
use crate::services::DashboardService;
use crate::AppState;

pub async fn get_dashboard_stats(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let service = DashboardService::new(state.db);
    let stats = service.stats().await?;
    Ok(Json(stats))
}
