//! Domain models for the Inventory Management Platform

pub mod import;
pub mod product;
pub mod report;
pub mod stock;
pub mod warehouse;

pub use import::*;
pub use product::*;
pub use report::*;
pub use stock::*;
pub use warehouse::*;
