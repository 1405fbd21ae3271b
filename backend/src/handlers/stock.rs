//! HTTP handler for the stock overview

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use shared::{ExportFormat, ProductStock, SearchQuery, StockExportRow};

use crate::error::AppResult;
use crate::services::StockService;
use crate::AppState;

/// Stock per product and warehouse; `?format=csv` downloads a flat export
pub async fn get_stock_overview(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Response> {
    let service = StockService::new(state.db);
    let stock = service.overview(query.like_pattern().as_deref()).await?;

    match query.format {
        ExportFormat::Csv => {
            let rows: Vec<StockExportRow> = stock.iter().flat_map(ProductStock::export_rows).collect();
            let csv = StockService::export_to_csv(&rows)?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv"),
                    (header::CONTENT_DISPOSITION, "attachment; filename=\"stock.csv\""),
                ],
                csv,
            )
                .into_response())
        }
        ExportFormat::Json => Ok(Json(stock).into_response()),
    }
}
