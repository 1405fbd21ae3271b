//! Route definitions for the WMS Basic API

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/products", product_routes())
        .nest("/warehouses", warehouse_routes())
        .nest("/movements", movement_routes())
        .nest("/positions", position_routes())
        .nest("/pallets", pallet_routes())
        .route("/stock", get(handlers::get_stock_overview))
        .route("/dashboard", get(handlers::get_dashboard_stats))
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}

/// Warehouse routes
fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_warehouses).post(handlers::create_warehouse))
        .route(
            "/:warehouse_id",
            get(handlers::get_warehouse)
                .put(handlers::update_warehouse)
                .delete(handlers::delete_warehouse),
        )
}

/// Stock movement routes
fn movement_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_movements).post(handlers::record_movement))
        .route(
            "/:movement_id",
            get(handlers::get_movement)
                .put(handlers::update_movement)
                .delete(handlers::delete_movement),
        )
}

/// Position routes, including range creation and the rack layout
fn position_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_positions))
        .route("/range", post(handlers::create_position_range))
        .route("/range/preview", post(handlers::preview_position_range))
        .route("/racks", get(handlers::list_racks))
        .route("/columns", get(handlers::list_columns))
        .route("/layout", get(handlers::get_rack_layout))
        .route(
            "/:position_id",
            put(handlers::update_position).delete(handlers::delete_position),
        )
        .route("/:position_id/assign", post(handlers::assign_pallet))
        .route("/:position_id/release", post(handlers::release_position))
}

/// Pallet routes
fn pallet_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_pallets).post(handlers::create_pallet))
        .route(
            "/:pallet_id",
            get(handlers::get_pallet).delete(handlers::delete_pallet),
        )
}
