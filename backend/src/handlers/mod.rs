//! HTTP request handlers
//!
//! Thin wrappers that construct the relevant service and translate between
//! HTTP and service inputs/outputs

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod import;
pub mod movement;
pub mod product;
pub mod stock;
pub mod warehouse;

pub use auth::{login, register};
pub use dashboard::{
    get_dashboard_overview, get_distribution, get_low_stock, get_movement_series,
};
pub use health::health_check;
pub use import::{apply_import, get_import, list_imports};
pub use movement::{export_movements, list_movements};
pub use product::{create_product, delete_product, get_product, list_products, update_product};
pub use stock::{get_product_stock, issue_stock, receive_stock};
pub use warehouse::{
    create_warehouse, delete_warehouse, get_warehouse, list_warehouses, update_warehouse,
};
