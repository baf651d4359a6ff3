//! HTTP handlers for warehouse catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::Warehouse;
use crate::services::warehouse::{CreateWarehouseInput, UpdateWarehouseInput, WarehouseService};
use crate::AppState;

/// List all warehouses
pub async fn list_warehouses(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Warehouse>>> {
    let service = WarehouseService::new(state.db);
    let warehouses = service.list().await?;
    Ok(Json(warehouses))
}

/// Create a warehouse
pub async fn create_warehouse(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateWarehouseInput>,
) -> AppResult<(StatusCode, Json<Warehouse>)> {
    let service = WarehouseService::new(state.db);
    let warehouse = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

/// Get a single warehouse
pub async fn get_warehouse(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Warehouse>> {
    let service = WarehouseService::new(state.db);
    let warehouse = service.get(warehouse_id).await?;
    Ok(Json(warehouse))
}

/// Edit a warehouse
pub async fn update_warehouse(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
    Json(input): Json<UpdateWarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    let service = WarehouseService::new(state.db);
    let warehouse = service.update(warehouse_id, input).await?;
    Ok(Json(warehouse))
}

/// Delete a warehouse; blocked while it still holds stock
pub async fn delete_warehouse(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = WarehouseService::new(state.db);
    service.delete(warehouse_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
