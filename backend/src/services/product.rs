//! Product catalog service
//!
//! Catalog CRUD plus the stock-aware views the back-office lists render.
//! Stock quantities themselves are only ever changed through the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{MovementType, Product, ProductCategory};
use crate::services::ledger::{LedgerService, ReceiveInput, WarehouseStock};
use crate::services::movement::{self, NewMovementEntry};

/// Product catalog service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Input for creating a product. When `initial_stock` is set the created
/// product is immediately received into `warehouse_id` through the ledger.
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub sku: String,
    pub name: String,
    pub category: ProductCategory,
    pub unit: String,
    pub cost_price: i64,
    pub sale_price: i64,
    pub reorder_point: i64,
    pub image_url: Option<String>,
    pub barcode_image_url: Option<String>,
    pub initial_stock: Option<i64>,
    pub warehouse_id: Option<Uuid>,
}

/// Input for editing a product. The SKU is immutable once created.
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub category: Option<ProductCategory>,
    pub unit: Option<String>,
    pub cost_price: Option<i64>,
    pub sale_price: Option<i64>,
    pub reorder_point: Option<i64>,
    pub image_url: Option<String>,
    pub barcode_image_url: Option<String>,
}

/// Product with its ledger view embedded, as rendered by catalog lists
#[derive(Debug, Serialize)]
pub struct ProductWithStock {
    #[serde(flatten)]
    pub product: Product,
    pub total_stock: i64,
    pub stocks: Vec<WarehouseStock>,
}

/// Row as stored in the products table
#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    sku: String,
    name: String,
    category: String,
    unit: String,
    cost_price: i64,
    sale_price: i64,
    reorder_point: i64,
    image_url: Option<String>,
    barcode_image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> AppResult<Product> {
        let category: ProductCategory = self
            .category
            .parse()
            .map_err(|e| AppError::Internal(format!("Corrupt product row: {}", e)))?;
        Ok(Product {
            id: self.id,
            sku: self.sku,
            name: self.name,
            category,
            unit: self.unit,
            cost_price: self.cost_price,
            sale_price: self.sale_price,
            reorder_point: self.reorder_point,
            image_url: self.image_url,
            barcode_image_url: self.barcode_image_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Stock line joined with its warehouse name, for embedding
#[derive(Debug, FromRow)]
struct StockLineRow {
    product_id: Uuid,
    warehouse_id: Uuid,
    warehouse_name: String,
    quantity: i64,
}

const PRODUCT_COLUMNS: &str = "id, sku, name, category, unit, cost_price, sale_price, \
                               reorder_point, image_url, barcode_image_url, created_at, updated_at";

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product, optionally receiving its initial stock
    pub async fn create(
        &self,
        operator: &AuthUser,
        input: CreateProductInput,
    ) -> AppResult<ProductWithStock> {
        Self::validate_catalog_fields(
            Some(&input.sku),
            Some(&input.name),
            Some(input.cost_price),
            Some(input.sale_price),
            Some(input.reorder_point),
        )?;

        let initial_stock = input.initial_stock.unwrap_or(0);
        if initial_stock < 0 {
            return Err(AppError::Validation {
                field: "initial_stock".to_string(),
                message: "Initial stock cannot be negative".to_string(),
            });
        }
        let initial_receive = match (initial_stock, input.warehouse_id) {
            (0, _) => None,
            (_, Some(warehouse_id)) => Some((warehouse_id, initial_stock)),
            (_, None) => {
                return Err(AppError::Validation {
                    field: "warehouse_id".to_string(),
                    message: "A warehouse is required when initial stock is provided".to_string(),
                })
            }
        };

        // Validate the target warehouse before touching the catalog, so a bad
        // request never leaves a product without its initial stock.
        if let Some(warehouse_id) = input.warehouse_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)",
            )
            .bind(warehouse_id)
            .fetch_one(&self.db)
            .await?;
            if !exists {
                return Err(AppError::NotFound("Warehouse".to_string()));
            }
        }

        let duplicate = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1)",
        )
        .bind(&input.sku)
        .fetch_one(&self.db)
        .await?;
        if duplicate {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (
                sku, name, category, unit, cost_price, sale_price,
                reorder_point, image_url, barcode_image_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&input.sku)
        .bind(&input.name)
        .bind(input.category.as_str())
        .bind(&input.unit)
        .bind(input.cost_price)
        .bind(input.sale_price)
        .bind(input.reorder_point)
        .bind(&input.image_url)
        .bind(&input.barcode_image_url)
        .fetch_one(&self.db)
        .await?;

        let product = row.into_product()?;

        if let Some((warehouse_id, quantity)) = initial_receive {
            let ledger = LedgerService::new(self.db.clone());
            ledger
                .receive(
                    operator,
                    ReceiveInput {
                        product_id: product.id,
                        warehouse_id,
                        quantity,
                        reason: Some("Initial stock".to_string()),
                    },
                )
                .await?;
        }

        self.with_stock(product).await
    }

    /// List all products with embedded total stock and per-warehouse breakdown
    pub async fn list(&self) -> AppResult<Vec<ProductWithStock>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY name",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        let lines = sqlx::query_as::<_, StockLineRow>(
            r#"
            SELECT s.product_id, w.id AS warehouse_id, w.name AS warehouse_name, s.quantity
            FROM stock_lines s
            JOIN warehouses w ON w.id = s.warehouse_id
            WHERE s.quantity > 0
            ORDER BY w.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut by_product: HashMap<Uuid, Vec<WarehouseStock>> = HashMap::new();
        for line in lines {
            by_product
                .entry(line.product_id)
                .or_default()
                .push(WarehouseStock {
                    warehouse_id: line.warehouse_id,
                    warehouse_name: line.warehouse_name,
                    quantity: line.quantity,
                });
        }

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let product = row.into_product()?;
            let stocks = by_product.remove(&product.id).unwrap_or_default();
            let total_stock = stocks.iter().map(|s| s.quantity).sum();
            products.push(ProductWithStock {
                product,
                total_stock,
                stocks,
            });
        }
        Ok(products)
    }

    /// Get a single product with its stock view
    pub async fn get(&self, product_id: Uuid) -> AppResult<ProductWithStock> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        self.with_stock(row.into_product()?).await
    }

    /// Edit a product's catalog attributes. The SKU is immutable.
    pub async fn update(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<ProductWithStock> {
        let existing = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let name = input.name.unwrap_or(existing.name);
        let category = input
            .category
            .map(|c| c.as_str().to_string())
            .unwrap_or(existing.category);
        let unit = input.unit.unwrap_or(existing.unit);
        let cost_price = input.cost_price.unwrap_or(existing.cost_price);
        let sale_price = input.sale_price.unwrap_or(existing.sale_price);
        let reorder_point = input.reorder_point.unwrap_or(existing.reorder_point);
        let image_url = input.image_url.or(existing.image_url);
        let barcode_image_url = input.barcode_image_url.or(existing.barcode_image_url);

        Self::validate_catalog_fields(
            None,
            Some(&name),
            Some(cost_price),
            Some(sale_price),
            Some(reorder_point),
        )?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET name = $1, category = $2, unit = $3, cost_price = $4, sale_price = $5,
                reorder_point = $6, image_url = $7, barcode_image_url = $8, updated_at = NOW()
            WHERE id = $9
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&name)
        .bind(&category)
        .bind(&unit)
        .bind(cost_price)
        .bind(sale_price)
        .bind(reorder_point)
        .bind(&image_url)
        .bind(&barcode_image_url)
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        self.with_stock(row.into_product()?).await
    }

    /// Delete a product. Blocked while any stock line is nonzero; a
    /// successful removal is itself recorded as a DELETE movement entry so
    /// prior IN/OUT history is never erased.
    pub async fn delete(&self, operator: &AuthUser, product_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let product_name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let remaining = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(quantity), 0)::bigint FROM stock_lines WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        if remaining > 0 {
            return Err(AppError::Conflict {
                resource: "product".to_string(),
                message: format!("Product still has {} units on hand", remaining),
            });
        }

        // Only zero-quantity lines are swept. A line that gained stock after
        // the check above survives, and the RESTRICT foreign key then fails
        // the catalog delete instead of losing units.
        sqlx::query("DELETE FROM stock_lines WHERE product_id = $1 AND quantity = 0")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        movement::append(
            &mut *tx,
            NewMovementEntry {
                movement_type: MovementType::Delete,
                product_id,
                product_name,
                warehouse_id: None,
                warehouse_name: None,
                quantity: 0,
                reason: Some("Product removed".to_string()),
                operator_id: operator.user_id,
                operator_name: operator.name.clone(),
                batch_id: None,
            },
        )
        .await?;

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e.as_database_error().and_then(|d| d.code()) {
                Some(code) if code == "23503" => AppError::Conflict {
                    resource: "product".to_string(),
                    message: "Product received stock during deletion".to_string(),
                },
                _ => AppError::DatabaseError(e),
            })?;

        tx.commit().await?;
        Ok(())
    }

    async fn with_stock(&self, product: Product) -> AppResult<ProductWithStock> {
        let ledger = LedgerService::new(self.db.clone());
        let stocks = ledger.stock_by_warehouse(product.id).await?;
        let total_stock = stocks.iter().map(|s| s.quantity).sum();
        Ok(ProductWithStock {
            product,
            total_stock,
            stocks,
        })
    }

    fn validate_catalog_fields(
        sku: Option<&str>,
        name: Option<&str>,
        cost_price: Option<i64>,
        sale_price: Option<i64>,
        reorder_point: Option<i64>,
    ) -> AppResult<()> {
        if let Some(sku) = sku {
            shared::validation::validate_sku(sku).map_err(|msg| AppError::Validation {
                field: "sku".to_string(),
                message: msg.to_string(),
            })?;
        }
        if let Some(name) = name {
            shared::validation::validate_name(name).map_err(|msg| AppError::Validation {
                field: "name".to_string(),
                message: msg.to_string(),
            })?;
        }
        if let Some(price) = cost_price {
            shared::validation::validate_price(price).map_err(|msg| AppError::Validation {
                field: "cost_price".to_string(),
                message: msg.to_string(),
            })?;
        }
        if let Some(price) = sale_price {
            shared::validation::validate_price(price).map_err(|msg| AppError::Validation {
                field: "sale_price".to_string(),
                message: msg.to_string(),
            })?;
        }
        if let Some(reorder_point) = reorder_point {
            shared::validation::validate_reorder_point(reorder_point).map_err(|msg| {
                AppError::Validation {
                    field: "reorder_point".to_string(),
                    message: msg.to_string(),
                }
            })?;
        }
        Ok(())
    }
}
