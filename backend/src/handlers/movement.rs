//! HTTP handlers for movement history endpoints

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::MovementEntry;
use crate::services::movement::{MovementFilter, MovementService};
use crate::AppState;

/// Query the movement history, most recent first
pub async fn list_movements(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<MovementFilter>,
) -> AppResult<Json<Vec<MovementEntry>>> {
    let service = MovementService::new(state.db, state.config.reporting.utc_offset_hours);
    let entries = service.query(&filter).await?;
    Ok(Json(entries))
}

/// Export the filtered movement history as a CSV download
pub async fn export_movements(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<MovementFilter>,
) -> AppResult<impl IntoResponse> {
    let service = MovementService::new(state.db, state.config.reporting.utc_offset_hours);
    let csv_data = service.export_csv(&filter).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"movements.csv\"",
            ),
        ],
        csv_data,
    ))
}
