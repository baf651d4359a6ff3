//! Read-only aggregation service backing the dashboard
//!
//! Everything here is derived from the catalog, the stock lines and the
//! movement log; nothing in this module writes.

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    fill_daily_series, DistributionMode, MovementSeriesPoint, WarehouseDistribution,
};

/// Read-only aggregation service
#[derive(Clone)]
pub struct AggregationService {
    db: PgPool,
    utc_offset_hours: i32,
}

/// A product at or below its reorder point
#[derive(Debug, Serialize, FromRow)]
pub struct LowStockProduct {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub reorder_point: i64,
    pub total_stock: i64,
}

/// Headline counters for the dashboard landing view
#[derive(Debug, Serialize, FromRow)]
pub struct DashboardOverview {
    pub total_products: i64,
    pub total_warehouses: i64,
    pub total_units: i64,
    pub low_stock_count: i64,
    pub movements_today: i64,
}

#[derive(Debug, FromRow)]
struct SeriesRow {
    day: NaiveDate,
    stock_in: i64,
    stock_out: i64,
}

#[derive(Debug, FromRow)]
struct DistributionRow {
    warehouse_id: Uuid,
    warehouse: String,
    value: i64,
}

impl AggregationService {
    /// Create a new AggregationService instance
    pub fn new(db: PgPool, utc_offset_hours: i32) -> Self {
        Self {
            db,
            utc_offset_hours,
        }
    }

    /// Daily IN/OUT movement counts for the trailing window.
    ///
    /// Accepts "7d" or "30d". Every day of the window appears in the result;
    /// days without movements are zero-filled. Buckets are calendar days in
    /// the configured reporting offset.
    pub async fn movement_series(&self, range: &str) -> AppResult<Vec<MovementSeriesPoint>> {
        let days: i64 = match range {
            "7d" => 7,
            "30d" => 30,
            _ => {
                return Err(AppError::Validation {
                    field: "range".to_string(),
                    message: "Range must be '7d' or '30d'".to_string(),
                })
            }
        };

        let today = (Utc::now() + Duration::hours(self.utc_offset_hours as i64)).date_naive();
        let start = today - Duration::days(days - 1);

        let rows = sqlx::query_as::<_, SeriesRow>(
            r#"
            SELECT (created_at AT TIME ZONE 'UTC' + make_interval(hours => $1))::date AS day,
                   COUNT(*) FILTER (WHERE movement_type = 'in')::bigint AS stock_in,
                   COUNT(*) FILTER (WHERE movement_type = 'out')::bigint AS stock_out
            FROM movements
            WHERE movement_type IN ('in', 'out')
              AND (created_at AT TIME ZONE 'UTC' + make_interval(hours => $1))::date >= $2
              AND (created_at AT TIME ZONE 'UTC' + make_interval(hours => $1))::date <= $3
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(self.utc_offset_hours)
        .bind(start)
        .bind(today)
        .fetch_all(&self.db)
        .await?;

        let activity: Vec<(NaiveDate, i64, i64)> = rows
            .into_iter()
            .map(|r| (r.day, r.stock_in, r.stock_out))
            .collect();

        Ok(fill_daily_series(today, days as u32, &activity))
    }

    /// Stock distribution across warehouses.
    ///
    /// Every warehouse appears, including empty ones. `Lines` counts distinct
    /// products with stock on hand; `Units` sums quantities.
    pub async fn distribution(&self, mode: DistributionMode) -> AppResult<Vec<WarehouseDistribution>> {
        let sql = match mode {
            DistributionMode::Lines => {
                r#"
                SELECT w.id AS warehouse_id, w.name AS warehouse,
                       COUNT(s.product_id) FILTER (WHERE s.quantity > 0)::bigint AS value
                FROM warehouses w
                LEFT JOIN stock_lines s ON s.warehouse_id = w.id
                GROUP BY w.id, w.name
                ORDER BY w.name
                "#
            }
            DistributionMode::Units => {
                r#"
                SELECT w.id AS warehouse_id, w.name AS warehouse,
                       COALESCE(SUM(s.quantity), 0)::bigint AS value
                FROM warehouses w
                LEFT JOIN stock_lines s ON s.warehouse_id = w.id
                GROUP BY w.id, w.name
                ORDER BY w.name
                "#
            }
        };

        let rows = sqlx::query_as::<_, DistributionRow>(sql)
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| WarehouseDistribution {
                warehouse_id: r.warehouse_id,
                warehouse: r.warehouse,
                value: r.value,
            })
            .collect())
    }

    /// Products whose total stock is at or below their reorder point.
    ///
    /// The boundary is inclusive: total stock equal to the reorder point
    /// already flags the product.
    pub async fn low_stock(&self) -> AppResult<Vec<LowStockProduct>> {
        let rows = sqlx::query_as::<_, LowStockProduct>(
            r#"
            SELECT p.id, p.sku, p.name, p.category, p.unit, p.reorder_point,
                   COALESCE(SUM(s.quantity), 0)::bigint AS total_stock
            FROM products p
            LEFT JOIN stock_lines s ON s.product_id = p.id
            GROUP BY p.id, p.sku, p.name, p.category, p.unit, p.reorder_point
            HAVING COALESCE(SUM(s.quantity), 0) <= p.reorder_point
            ORDER BY COALESCE(SUM(s.quantity), 0) - p.reorder_point, p.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Headline counters for the dashboard landing view
    pub async fn overview(&self) -> AppResult<DashboardOverview> {
        let overview = sqlx::query_as::<_, DashboardOverview>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM products)::bigint AS total_products,
                (SELECT COUNT(*) FROM warehouses)::bigint AS total_warehouses,
                (SELECT COALESCE(SUM(quantity), 0) FROM stock_lines)::bigint AS total_units,
                (SELECT COUNT(*)
                 FROM (
                     SELECT p.id
                     FROM products p
                     LEFT JOIN stock_lines s ON s.product_id = p.id
                     GROUP BY p.id, p.reorder_point
                     HAVING COALESCE(SUM(s.quantity), 0) <= p.reorder_point
                 ) low)::bigint AS low_stock_count,
                (SELECT COUNT(*)
                 FROM movements
                 WHERE movement_type IN ('in', 'out')
                   AND (created_at AT TIME ZONE 'UTC' + make_interval(hours => $1))::date =
                       ($2::timestamptz AT TIME ZONE 'UTC' + make_interval(hours => $1))::date
                )::bigint AS movements_today
            "#,
        )
        .bind(self.utc_offset_hours)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(overview)
    }
}
