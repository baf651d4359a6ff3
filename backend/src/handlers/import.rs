//! HTTP handlers for import batch endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::ImportBatch;
use crate::services::import::{ApplyBatchInput, BatchResult, ImportService};
use crate::AppState;

/// Filter for listing import batches
#[derive(Deserialize)]
pub struct ImportListQuery {
    pub warehouse_id: Option<Uuid>,
}

/// Apply an import batch
pub async fn apply_import(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ApplyBatchInput>,
) -> AppResult<(StatusCode, Json<BatchResult>)> {
    let service = ImportService::new(state.db);
    let result = service.apply_batch(&current_user.0, input).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// List past import batches
pub async fn list_imports(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ImportListQuery>,
) -> AppResult<Json<Vec<ImportBatch>>> {
    let service = ImportService::new(state.db);
    let batches = service.list_batches(query.warehouse_id).await?;
    Ok(Json(batches))
}

/// Get one import batch with its per-row outcomes
pub async fn get_import(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<BatchResult>> {
    let service = ImportService::new(state.db);
    let result = service.get_batch(batch_id).await?;
    Ok(Json(result))
}
