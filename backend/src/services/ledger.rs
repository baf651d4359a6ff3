//! Stock ledger service: the single source of truth for per-warehouse
//! quantities and the sole gate for mutating them
//!
//! Receive is additive and commutes, so a plain atomic upsert suffices. Issue
//! is the one place a race can corrupt the non-negativity invariant: the
//! availability check and the decrement are a single conditional UPDATE, so
//! two racing issuers can never both observe sufficient stock.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{MovementEntry, MovementType};
use crate::services::movement::{self, NewMovementEntry};

/// Stock ledger service
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

/// Input for receiving stock into a warehouse
#[derive(Debug, Deserialize)]
pub struct ReceiveInput {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: i64,
    pub reason: Option<String>,
}

/// Input for issuing stock out of a warehouse
#[derive(Debug, Deserialize)]
pub struct IssueInput {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: i64,
    pub reason: Option<String>,
}

/// Per-warehouse quantity line for a product
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WarehouseStock {
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub quantity: i64,
}

impl LedgerService {
    /// Create a new LedgerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Receive stock into a warehouse and append the IN movement entry.
    ///
    /// Always succeeds when the product and warehouse exist and the quantity
    /// is positive; there is no upper bound check.
    pub async fn receive(&self, operator: &AuthUser, input: ReceiveInput) -> AppResult<MovementEntry> {
        self.apply_receive(operator, input, None).await
    }

    /// Issue stock out of a warehouse and append the OUT movement entry.
    ///
    /// Fails with `InsufficientStock` carrying the available quantity when
    /// the warehouse does not hold enough.
    pub async fn issue(&self, operator: &AuthUser, input: IssueInput) -> AppResult<MovementEntry> {
        self.apply_issue(operator, input, None).await
    }

    /// Receive on behalf of an import batch
    pub(crate) async fn apply_receive(
        &self,
        operator: &AuthUser,
        input: ReceiveInput,
        batch_id: Option<Uuid>,
    ) -> AppResult<MovementEntry> {
        shared::validation::validate_quantity(input.quantity).map_err(|msg| {
            AppError::Validation {
                field: "quantity".to_string(),
                message: msg.to_string(),
            }
        })?;

        let mut tx = self.db.begin().await?;

        let (product_name, warehouse_name) = self
            .lookup_names(&mut tx, input.product_id, input.warehouse_id)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO stock_lines (product_id, warehouse_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (product_id, warehouse_id)
            DO UPDATE SET quantity = stock_lines.quantity + EXCLUDED.quantity,
                          updated_at = NOW()
            "#,
        )
        .bind(input.product_id)
        .bind(input.warehouse_id)
        .bind(input.quantity)
        .execute(&mut *tx)
        .await?;

        let entry = movement::append(
            &mut *tx,
            NewMovementEntry {
                movement_type: MovementType::In,
                product_id: input.product_id,
                product_name,
                warehouse_id: Some(input.warehouse_id),
                warehouse_name: Some(warehouse_name),
                quantity: input.quantity,
                reason: input.reason,
                operator_id: operator.user_id,
                operator_name: operator.name.clone(),
                batch_id,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(entry)
    }

    /// Issue on behalf of an import batch
    pub(crate) async fn apply_issue(
        &self,
        operator: &AuthUser,
        input: IssueInput,
        batch_id: Option<Uuid>,
    ) -> AppResult<MovementEntry> {
        shared::validation::validate_quantity(input.quantity).map_err(|msg| {
            AppError::Validation {
                field: "quantity".to_string(),
                message: msg.to_string(),
            }
        })?;

        let mut tx = self.db.begin().await?;

        let (product_name, warehouse_name) = self
            .lookup_names(&mut tx, input.product_id, input.warehouse_id)
            .await?;

        // Conditional decrement: the availability check and the write are one
        // atomic statement, so there is no time-of-check/time-of-use gap.
        let updated = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE stock_lines
            SET quantity = quantity - $3, updated_at = NOW()
            WHERE product_id = $1 AND warehouse_id = $2 AND quantity >= $3
            RETURNING quantity
            "#,
        )
        .bind(input.product_id)
        .bind(input.warehouse_id)
        .bind(input.quantity)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            let available = sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COALESCE(
                    (SELECT quantity FROM stock_lines WHERE product_id = $1 AND warehouse_id = $2),
                    0
                )
                "#,
            )
            .bind(input.product_id)
            .bind(input.warehouse_id)
            .fetch_one(&mut *tx)
            .await?;

            return Err(AppError::InsufficientStock { available });
        }

        let entry = movement::append(
            &mut *tx,
            NewMovementEntry {
                movement_type: MovementType::Out,
                product_id: input.product_id,
                product_name,
                warehouse_id: Some(input.warehouse_id),
                warehouse_name: Some(warehouse_name),
                quantity: input.quantity,
                reason: input.reason,
                operator_id: operator.user_id,
                operator_name: operator.name.clone(),
                batch_id,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(entry)
    }

    /// Total quantity of a product across all warehouses
    pub async fn total_stock(&self, product_id: Uuid) -> AppResult<i64> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(quantity), 0)::bigint FROM stock_lines WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        Ok(total)
    }

    /// Per-warehouse breakdown for a product. Only warehouses holding stock
    /// are listed; callers treat absence as zero, never as an error.
    pub async fn stock_by_warehouse(&self, product_id: Uuid) -> AppResult<Vec<WarehouseStock>> {
        let stocks = sqlx::query_as::<_, WarehouseStock>(
            r#"
            SELECT w.id AS warehouse_id, w.name AS warehouse_name, s.quantity
            FROM stock_lines s
            JOIN warehouses w ON w.id = s.warehouse_id
            WHERE s.product_id = $1 AND s.quantity > 0
            ORDER BY w.name
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(stocks)
    }

    /// Resolve the name snapshots recorded on movement entries; both lookups
    /// fail before any mutation happens.
    async fn lookup_names(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        product_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<(String, String)> {
        let product_name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let warehouse_name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM warehouses WHERE id = $1",
        )
        .bind(warehouse_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;

        Ok((product_name, warehouse_name))
    }
}
