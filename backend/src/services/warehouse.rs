//! Warehouse catalog service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Warehouse;

/// Warehouse catalog service
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

/// Input for creating a warehouse
#[derive(Debug, Deserialize)]
pub struct CreateWarehouseInput {
    pub name: String,
    pub location: Option<String>,
}

/// Input for editing a warehouse
#[derive(Debug, Deserialize)]
pub struct UpdateWarehouseInput {
    pub name: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, FromRow)]
struct WarehouseRow {
    id: Uuid,
    name: String,
    location: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WarehouseRow {
    fn into_warehouse(self) -> Warehouse {
        Warehouse {
            id: self.id,
            name: self.name,
            location: self.location,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl WarehouseService {
    /// Create a new WarehouseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a warehouse
    pub async fn create(&self, input: CreateWarehouseInput) -> AppResult<Warehouse> {
        shared::validation::validate_name(&input.name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;

        let duplicate = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM warehouses WHERE name = $1)",
        )
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;
        if duplicate {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let row = sqlx::query_as::<_, WarehouseRow>(
            r#"
            INSERT INTO warehouses (name, location)
            VALUES ($1, $2)
            RETURNING id, name, location, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.location)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into_warehouse())
    }

    /// List all warehouses
    pub async fn list(&self) -> AppResult<Vec<Warehouse>> {
        let rows = sqlx::query_as::<_, WarehouseRow>(
            "SELECT id, name, location, created_at, updated_at FROM warehouses ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(WarehouseRow::into_warehouse).collect())
    }

    /// Get a single warehouse
    pub async fn get(&self, warehouse_id: Uuid) -> AppResult<Warehouse> {
        let row = sqlx::query_as::<_, WarehouseRow>(
            "SELECT id, name, location, created_at, updated_at FROM warehouses WHERE id = $1",
        )
        .bind(warehouse_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;

        Ok(row.into_warehouse())
    }

    /// Edit a warehouse's name or location
    pub async fn update(
        &self,
        warehouse_id: Uuid,
        input: UpdateWarehouseInput,
    ) -> AppResult<Warehouse> {
        let existing = self.get(warehouse_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let location = input.location.or(existing.location);

        shared::validation::validate_name(&name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;

        let row = sqlx::query_as::<_, WarehouseRow>(
            r#"
            UPDATE warehouses
            SET name = $1, location = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, name, location, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&location)
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into_warehouse())
    }

    /// Delete a warehouse. Blocked while it still holds any stock; the
    /// caller must issue or transfer the remaining units first.
    pub async fn delete(&self, warehouse_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)",
        )
        .bind(warehouse_id)
        .fetch_one(&mut *tx)
        .await?;
        if !exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        let remaining = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(quantity), 0)::bigint FROM stock_lines WHERE warehouse_id = $1",
        )
        .bind(warehouse_id)
        .fetch_one(&mut *tx)
        .await?;

        if remaining > 0 {
            return Err(AppError::Conflict {
                resource: "warehouse".to_string(),
                message: format!("Warehouse still holds {} units", remaining),
            });
        }

        // Only zero-quantity lines go with the warehouse. A line that gained
        // stock after the check above survives this sweep, and the RESTRICT
        // foreign key then fails the catalog delete instead of losing units.
        sqlx::query("DELETE FROM stock_lines WHERE warehouse_id = $1 AND quantity = 0")
            .bind(warehouse_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(warehouse_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e.as_database_error().and_then(|d| d.code()) {
                Some(code) if code == "23503" => AppError::Conflict {
                    resource: "warehouse".to_string(),
                    message: "Warehouse received stock during deletion".to_string(),
                },
                _ => AppError::DatabaseError(e),
            })?;

        tx.commit().await?;
        Ok(())
    }
}
