//! Business logic services
//!
//! Each service owns a connection pool handle and is constructed per request
//! by its handler. All stock mutations flow through the ledger service, which
//! appends the matching movement entry in the same transaction.

pub mod aggregation;
pub mod auth;
pub mod import;
pub mod ledger;
pub mod movement;
pub mod product;
pub mod warehouse;

pub use aggregation::AggregationService;
pub use auth::AuthService;
pub use import::ImportService;
pub use ledger::LedgerService;
pub use movement::MovementService;
pub use product::ProductService;
pub use warehouse::WarehouseService;
