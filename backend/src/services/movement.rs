//! Movement log service: the append-only audit trail of every ledger mutation
//!
//! Entries are never edited or deleted; corrections are new offsetting
//! entries, and product removal is itself recorded as a DELETE-type entry.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{MovementEntry, MovementType};

/// Default page size for history queries
const DEFAULT_LIMIT: i64 = 100;
/// Upper bound on a single history page
const MAX_LIMIT: i64 = 500;

/// Movement log service
#[derive(Clone)]
pub struct MovementService {
    db: PgPool,
    utc_offset_hours: i32,
}

/// A movement entry staged for insertion. Only the ledger and the import
/// loader construct these; presentation code never appends directly.
#[derive(Debug)]
pub(crate) struct NewMovementEntry {
    pub movement_type: MovementType,
    pub product_id: Uuid,
    pub product_name: String,
    pub warehouse_id: Option<Uuid>,
    pub warehouse_name: Option<String>,
    pub quantity: i64,
    pub reason: Option<String>,
    pub operator_id: Uuid,
    pub operator_name: String,
    pub batch_id: Option<Uuid>,
}

/// Row as stored in the movements table
#[derive(Debug, FromRow)]
struct MovementRow {
    id: i64,
    movement_type: String,
    product_id: Uuid,
    product_name: String,
    warehouse_id: Option<Uuid>,
    warehouse_name: Option<String>,
    quantity: i64,
    reason: Option<String>,
    operator_id: Uuid,
    operator_name: String,
    batch_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl MovementRow {
    fn into_entry(self) -> AppResult<MovementEntry> {
        let movement_type: MovementType = self
            .movement_type
            .parse()
            .map_err(|e| AppError::Internal(format!("Corrupt movement row: {}", e)))?;
        Ok(MovementEntry {
            id: self.id,
            movement_type,
            product_id: self.product_id,
            product_name: self.product_name,
            warehouse_id: self.warehouse_id,
            warehouse_name: self.warehouse_name,
            quantity: self.quantity,
            reason: self.reason,
            operator_id: self.operator_id,
            operator_name: self.operator_name,
            batch_id: self.batch_id,
            created_at: self.created_at,
        })
    }
}

/// Filters for history queries. `before_id` is a keyset cursor: pass the
/// smallest id of the previous page to resume the sequence.
#[derive(Debug, Default, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub before_id: Option<i64>,
    pub limit: Option<i64>,
}

/// Append a movement entry within the caller's transaction, so the entry is
/// causally ordered after the stock-line mutation it describes.
pub(crate) async fn append<'e, E>(executor: E, entry: NewMovementEntry) -> AppResult<MovementEntry>
where
    E: sqlx::PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, MovementRow>(
        r#"
        INSERT INTO movements (
            movement_type, product_id, product_name, warehouse_id, warehouse_name,
            quantity, reason, operator_id, operator_name, batch_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, movement_type, product_id, product_name, warehouse_id, warehouse_name,
                  quantity, reason, operator_id, operator_name, batch_id, created_at
        "#,
    )
    .bind(entry.movement_type.as_str())
    .bind(entry.product_id)
    .bind(&entry.product_name)
    .bind(entry.warehouse_id)
    .bind(&entry.warehouse_name)
    .bind(entry.quantity)
    .bind(&entry.reason)
    .bind(entry.operator_id)
    .bind(&entry.operator_name)
    .bind(entry.batch_id)
    .fetch_one(executor)
    .await?;

    row.into_entry()
}

impl MovementService {
    /// Create a new MovementService instance
    pub fn new(db: PgPool, utc_offset_hours: i32) -> Self {
        Self {
            db,
            utc_offset_hours,
        }
    }

    /// Query the movement history, most recent first.
    ///
    /// Date filters bucket by calendar day in the configured reporting
    /// offset, matching the dashboard series.
    pub async fn query(&self, filter: &MovementFilter) -> AppResult<Vec<MovementEntry>> {
        let limit = filter.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, movement_type, product_id, product_name, warehouse_id, warehouse_name,
                   quantity, reason, operator_id, operator_name, batch_id, created_at
            FROM movements
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::uuid IS NULL OR warehouse_id = $2)
              AND ($3::date IS NULL
                   OR (created_at AT TIME ZONE 'UTC' + make_interval(hours => $5))::date >= $3)
              AND ($4::date IS NULL
                   OR (created_at AT TIME ZONE 'UTC' + make_interval(hours => $5))::date <= $4)
              AND ($6::bigint IS NULL OR id < $6)
            ORDER BY id DESC
            LIMIT $7
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.warehouse_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(self.utc_offset_hours)
        .bind(filter.before_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(MovementRow::into_entry).collect()
    }

    /// Export the filtered movement history as CSV.
    ///
    /// Walks the keyset cursor until the filter is exhausted, so the export
    /// covers the full matching history rather than a single page.
    pub async fn export_csv(&self, filter: &MovementFilter) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        let mut cursor = filter.before_id;

        loop {
            let page = MovementFilter {
                product_id: filter.product_id,
                warehouse_id: filter.warehouse_id,
                start_date: filter.start_date,
                end_date: filter.end_date,
                before_id: cursor,
                limit: Some(MAX_LIMIT),
            };
            let entries = self.query(&page).await?;

            for entry in &entries {
                wtr.serialize(entry).map_err(|e| {
                    AppError::Internal(format!("CSV serialization error: {}", e))
                })?;
            }

            if entries.len() < MAX_LIMIT as usize {
                break;
            }
            cursor = entries.last().map(|e| e.id);
        }

        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
