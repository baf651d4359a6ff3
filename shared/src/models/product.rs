//! Product catalog models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// A catalog product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    /// Stock keeping unit, unique and immutable once created
    pub sku: String,
    pub name: String,
    pub category: ProductCategory,
    /// Unit of measure (e.g., "piece", "box", "kg")
    pub unit: String,
    /// Cost price in integer minor units
    pub cost_price: i64,
    /// Sale price in integer minor units
    pub sale_price: i64,
    /// Threshold at or below which the product is flagged low-stock
    pub reorder_point: i64,
    pub image_url: Option<String>,
    pub barcode_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fixed set of product categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Electronics,
    Apparel,
    Food,
    RawMaterial,
    Consumable,
    Other,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Electronics => "electronics",
            ProductCategory::Apparel => "apparel",
            ProductCategory::Food => "food",
            ProductCategory::RawMaterial => "raw_material",
            ProductCategory::Consumable => "consumable",
            ProductCategory::Other => "other",
        }
    }

    /// All known categories, for listing in pickers
    pub fn all() -> &'static [ProductCategory] {
        &[
            ProductCategory::Electronics,
            ProductCategory::Apparel,
            ProductCategory::Food,
            ProductCategory::RawMaterial,
            ProductCategory::Consumable,
            ProductCategory::Other,
        ]
    }
}

/// Error returned when parsing an unknown category string
#[derive(Debug, Error)]
#[error("unknown product category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for ProductCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "electronics" => Ok(ProductCategory::Electronics),
            "apparel" => Ok(ProductCategory::Apparel),
            "food" => Ok(ProductCategory::Food),
            "raw_material" => Ok(ProductCategory::RawMaterial),
            "consumable" => Ok(ProductCategory::Consumable),
            "other" => Ok(ProductCategory::Other),
            other => Err(ParseCategoryError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for category in ProductCategory::all() {
            let parsed: ProductCategory = category.as_str().parse().unwrap();
            assert_eq!(parsed, *category);
        }
    }

    #[test]
    fn test_category_unknown() {
        assert!("gadgets".parse::<ProductCategory>().is_err());
    }
}
