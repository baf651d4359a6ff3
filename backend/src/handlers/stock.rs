//! HTTP handlers for stock ledger endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::MovementEntry;
use crate::services::ledger::{IssueInput, LedgerService, ReceiveInput, WarehouseStock};
use crate::AppState;

/// Stock view for one product: the total plus the per-warehouse breakdown
#[derive(Serialize)]
pub struct ProductStockResponse {
    pub product_id: Uuid,
    pub total_stock: i64,
    pub stocks: Vec<WarehouseStock>,
}

/// Receive stock into a warehouse
pub async fn receive_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ReceiveInput>,
) -> AppResult<Json<MovementEntry>> {
    let service = LedgerService::new(state.db);
    let entry = service.receive(&current_user.0, input).await?;
    Ok(Json(entry))
}

/// Issue stock out of a warehouse
pub async fn issue_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<IssueInput>,
) -> AppResult<Json<MovementEntry>> {
    let service = LedgerService::new(state.db);
    let entry = service.issue(&current_user.0, input).await?;
    Ok(Json(entry))
}

/// Get the stock view for one product
pub async fn get_product_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductStockResponse>> {
    let service = LedgerService::new(state.db);
    let total_stock = service.total_stock(product_id).await?;
    let stocks = service.stock_by_warehouse(product_id).await?;
    Ok(Json(ProductStockResponse {
        product_id,
        total_stock,
        stocks,
    }))
}
