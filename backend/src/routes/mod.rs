//! Route definitions for the Inventory Management Platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - product catalog
        .nest("/products", product_routes())
        // Protected routes - warehouse catalog
        .nest("/warehouses", warehouse_routes())
        // Protected routes - stock ledger
        .nest("/stock", stock_routes())
        // Protected routes - movement history
        .nest("/movements", movement_routes())
        // Protected routes - import batches
        .nest("/imports", import_routes())
        // Protected routes - dashboard reporting
        .nest("/dashboard", dashboard_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
}

/// Product catalog routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Warehouse catalog routes (protected)
fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_warehouses).post(handlers::create_warehouse),
        )
        .route(
            "/:warehouse_id",
            get(handlers::get_warehouse)
                .put(handlers::update_warehouse)
                .delete(handlers::delete_warehouse),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock ledger routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/receive", post(handlers::receive_stock))
        .route("/issue", post(handlers::issue_stock))
        .route("/products/:product_id", get(handlers::get_product_stock))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Movement history routes (protected)
fn movement_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_movements))
        .route("/export", get(handlers::export_movements))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Import batch routes (protected)
fn import_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_imports).post(handlers::apply_import),
        )
        .route("/:batch_id", get(handlers::get_import))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Dashboard reporting routes (protected)
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/overview", get(handlers::get_dashboard_overview))
        .route("/movement-series", get(handlers::get_movement_series))
        .route("/distribution", get(handlers::get_distribution))
        .route("/low-stock", get(handlers::get_low_stock))
        .route_layer(middleware::from_fn(auth_middleware))
}
