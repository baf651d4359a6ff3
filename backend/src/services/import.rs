//! Import batch loader
//!
//! Applies bulk stock movements row by row through the ledger. Each row
//! commits or fails independently; a bad row never rolls back its
//! predecessors, and the per-row outcomes are persisted with the batch.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{batch_status, ImportBatch, ImportRowOutcome, ImportStatus};
use crate::services::ledger::{IssueInput, LedgerService, ReceiveInput};

/// Import batch loader
#[derive(Clone)]
pub struct ImportService {
    db: PgPool,
}

/// One row of an import file: a product reference, a direction and a quantity
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRowInput {
    pub sku: String,
    pub direction: String,
    pub quantity: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Input for applying an import batch. Rows arrive either pre-parsed as JSON
/// or as raw CSV text with a `sku,direction,quantity,reason` header.
#[derive(Debug, Deserialize)]
pub struct ApplyBatchInput {
    pub warehouse_id: Uuid,
    pub file_type: String,
    pub rows: Option<Vec<ImportRowInput>>,
    pub csv_data: Option<String>,
}

/// Result of an applied batch: the stored summary plus every row outcome
#[derive(Debug, serde::Serialize)]
pub struct BatchResult {
    #[serde(flatten)]
    pub batch: ImportBatch,
    pub row_results: Vec<ImportRowOutcome>,
}

#[derive(Debug, FromRow)]
struct ImportBatchRow {
    id: Uuid,
    warehouse_id: Uuid,
    file_type: String,
    total_records: i32,
    succeeded_records: i32,
    failed_records: i32,
    status: String,
    operator_id: Uuid,
    operator_name: String,
    created_at: DateTime<Utc>,
}

impl ImportBatchRow {
    fn into_batch(self) -> AppResult<ImportBatch> {
        let status: ImportStatus = self
            .status
            .parse()
            .map_err(|e| AppError::Internal(format!("Corrupt import batch row: {}", e)))?;
        Ok(ImportBatch {
            id: self.id,
            warehouse_id: self.warehouse_id,
            file_type: self.file_type,
            total_records: self.total_records,
            succeeded_records: self.succeeded_records,
            failed_records: self.failed_records,
            status,
            operator_id: self.operator_id,
            operator_name: self.operator_name,
            created_at: self.created_at,
        })
    }
}

impl ImportService {
    /// Create a new ImportService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Apply an import batch row by row and persist the summary.
    ///
    /// Rows are applied in file order through the same ledger operations as
    /// interactive receive/issue, so every invariant (non-negativity, the
    /// movement entry per mutation) holds for imported rows too.
    pub async fn apply_batch(
        &self,
        operator: &AuthUser,
        input: ApplyBatchInput,
    ) -> AppResult<BatchResult> {
        let warehouse_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)",
        )
        .bind(input.warehouse_id)
        .fetch_one(&self.db)
        .await?;
        if !warehouse_exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        let rows = match (input.rows, input.csv_data) {
            (Some(rows), _) => rows,
            (None, Some(csv_data)) => parse_csv_rows(&csv_data)?,
            (None, None) => {
                return Err(AppError::Validation {
                    field: "rows".to_string(),
                    message: "Either rows or csv_data must be provided".to_string(),
                })
            }
        };

        let batch_id = Uuid::new_v4();
        let ledger = LedgerService::new(self.db.clone());
        let mut outcomes = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let row_number = (index + 1) as u32;
            let result = self
                .apply_row(&ledger, operator, input.warehouse_id, row, batch_id)
                .await;
            outcomes.push(ImportRowOutcome {
                row: row_number,
                sku: row.sku.clone(),
                succeeded: result.is_ok(),
                error: result.err().map(|e| e.to_string()),
            });
        }

        let total = outcomes.len();
        let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
        let status = batch_status(succeeded, total);

        let row_results = serde_json::to_value(&outcomes)
            .map_err(|e| AppError::Internal(format!("Row outcome serialization error: {}", e)))?;

        let stored = sqlx::query_as::<_, ImportBatchRow>(
            r#"
            INSERT INTO import_batches (
                id, warehouse_id, file_type, total_records, succeeded_records,
                failed_records, status, row_results, operator_id, operator_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, warehouse_id, file_type, total_records, succeeded_records,
                      failed_records, status, operator_id, operator_name, created_at
            "#,
        )
        .bind(batch_id)
        .bind(input.warehouse_id)
        .bind(&input.file_type)
        .bind(total as i32)
        .bind(succeeded as i32)
        .bind((total - succeeded) as i32)
        .bind(status.as_str())
        .bind(row_results)
        .bind(operator.user_id)
        .bind(&operator.name)
        .fetch_one(&self.db)
        .await?;

        Ok(BatchResult {
            batch: stored.into_batch()?,
            row_results: outcomes,
        })
    }

    /// List past batches, most recent first, optionally scoped to a warehouse
    pub async fn list_batches(&self, warehouse_id: Option<Uuid>) -> AppResult<Vec<ImportBatch>> {
        let rows = sqlx::query_as::<_, ImportBatchRow>(
            r#"
            SELECT id, warehouse_id, file_type, total_records, succeeded_records,
                   failed_records, status, operator_id, operator_name, created_at
            FROM import_batches
            WHERE ($1::uuid IS NULL OR warehouse_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ImportBatchRow::into_batch).collect()
    }

    /// Get one batch with its persisted row outcomes
    pub async fn get_batch(&self, batch_id: Uuid) -> AppResult<BatchResult> {
        let row = sqlx::query_as::<_, ImportBatchRow>(
            r#"
            SELECT id, warehouse_id, file_type, total_records, succeeded_records,
                   failed_records, status, operator_id, operator_name, created_at
            FROM import_batches
            WHERE id = $1
            "#,
        )
        .bind(batch_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Import batch".to_string()))?;

        let raw: serde_json::Value = sqlx::query_scalar(
            "SELECT row_results FROM import_batches WHERE id = $1",
        )
        .bind(batch_id)
        .fetch_one(&self.db)
        .await?;

        let row_results: Vec<ImportRowOutcome> = serde_json::from_value(raw)
            .map_err(|e| AppError::Internal(format!("Corrupt row outcomes: {}", e)))?;

        Ok(BatchResult {
            batch: row.into_batch()?,
            row_results,
        })
    }

    async fn apply_row(
        &self,
        ledger: &LedgerService,
        operator: &AuthUser,
        warehouse_id: Uuid,
        row: &ImportRowInput,
        batch_id: Uuid,
    ) -> AppResult<()> {
        let product_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM products WHERE sku = $1",
        )
        .bind(&row.sku)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product with SKU {}", row.sku)))?;

        match row.direction.as_str() {
            "in" => {
                ledger
                    .apply_receive(
                        operator,
                        ReceiveInput {
                            product_id,
                            warehouse_id,
                            quantity: row.quantity,
                            reason: row.reason.clone(),
                        },
                        Some(batch_id),
                    )
                    .await?;
            }
            "out" => {
                ledger
                    .apply_issue(
                        operator,
                        IssueInput {
                            product_id,
                            warehouse_id,
                            quantity: row.quantity,
                            reason: row.reason.clone(),
                        },
                        Some(batch_id),
                    )
                    .await?;
            }
            other => {
                return Err(AppError::Validation {
                    field: "direction".to_string(),
                    message: format!("Unknown direction '{}', expected 'in' or 'out'", other),
                })
            }
        }
        Ok(())
    }
}

/// Parse CSV import data. The file must carry a header row naming at least
/// `sku`, `direction` and `quantity`.
fn parse_csv_rows(csv_data: &str) -> AppResult<Vec<ImportRowInput>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<ImportRowInput>().enumerate() {
        let row = record.map_err(|e| AppError::Validation {
            field: "csv_data".to_string(),
            message: format!("CSV parse error on data row {}: {}", index + 1, e),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::parse_csv_rows;

    #[test]
    fn parses_csv_with_header() {
        let data = "sku,direction,quantity,reason\nSKU-001,in,5,Restock\nSKU-002,out,2,\n";
        let rows = parse_csv_rows(data).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sku, "SKU-001");
        assert_eq!(rows[0].direction, "in");
        assert_eq!(rows[0].quantity, 5);
        assert_eq!(rows[0].reason.as_deref(), Some("Restock"));
        assert_eq!(rows[1].direction, "out");
    }

    #[test]
    fn rejects_malformed_quantity() {
        let data = "sku,direction,quantity\nSKU-001,in,lots\n";
        assert!(parse_csv_rows(data).is_err());
    }

    #[test]
    fn empty_file_yields_no_rows() {
        let data = "sku,direction,quantity\n";
        assert!(parse_csv_rows(data).unwrap().is_empty());
    }
}
