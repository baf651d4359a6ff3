//! Shared types and models for the Inventory Management Platform
//!
//! This crate contains domain models, derived-computation helpers, and
//! validation utilities shared between the backend and other components
//! of the system.

pub mod models;
pub mod validation;

pub use models::*;
