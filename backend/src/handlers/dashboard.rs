//! HTTP handlers for dashboard reporting endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::{DistributionMode, MovementSeriesPoint, WarehouseDistribution};
use crate::services::aggregation::{AggregationService, DashboardOverview, LowStockProduct};
use crate::AppState;

/// Query parameters for the movement series
#[derive(Deserialize)]
pub struct SeriesQuery {
    #[serde(default = "default_range")]
    pub range: String,
}

fn default_range() -> String {
    "7d".to_string()
}

/// Query parameters for the distribution view
#[derive(Deserialize)]
pub struct DistributionQuery {
    pub mode: Option<String>,
}

/// Daily IN/OUT movement series
pub async fn get_movement_series(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<SeriesQuery>,
) -> AppResult<Json<Vec<MovementSeriesPoint>>> {
    let service =
        AggregationService::new(state.db, state.config.reporting.utc_offset_hours);
    let series = service.movement_series(&query.range).await?;
    Ok(Json(series))
}

/// Stock distribution across warehouses
pub async fn get_distribution(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<DistributionQuery>,
) -> AppResult<Json<Vec<WarehouseDistribution>>> {
    let mode_str = query
        .mode
        .unwrap_or_else(|| state.config.reporting.distribution_mode.clone());
    let mode: DistributionMode = mode_str.parse().map_err(|_| AppError::Validation {
        field: "mode".to_string(),
        message: "Mode must be 'lines' or 'units'".to_string(),
    })?;

    let service =
        AggregationService::new(state.db, state.config.reporting.utc_offset_hours);
    let distribution = service.distribution(mode).await?;
    Ok(Json(distribution))
}

/// Products at or below their reorder point
pub async fn get_low_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<LowStockProduct>>> {
    let service =
        AggregationService::new(state.db, state.config.reporting.utc_offset_hours);
    let products = service.low_stock().await?;
    Ok(Json(products))
}

/// Headline counters for the dashboard landing view
pub async fn get_dashboard_overview(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<DashboardOverview>> {
    let service =
        AggregationService::new(state.db, state.config.reporting.utc_offset_hours);
    let overview = service.overview().await?;
    Ok(Json(overview))
}
