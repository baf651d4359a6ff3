//! Stock ledger and movement log models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Type of a movement log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    In,
    Out,
    /// Administrative product-removal event; does not change quantities
    Delete,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Delete => "delete",
        }
    }

    /// Sign applied to the entry quantity to obtain the stock-line delta
    pub fn sign(&self) -> i64 {
        match self {
            MovementType::In => 1,
            MovementType::Out => -1,
            MovementType::Delete => 0,
        }
    }
}

/// Error returned when parsing an unknown movement type string
#[derive(Debug, Error)]
#[error("unknown movement type: {0}")]
pub struct ParseMovementTypeError(pub String);

impl FromStr for MovementType {
    type Err = ParseMovementTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(MovementType::In),
            "out" => Ok(MovementType::Out),
            "delete" => Ok(MovementType::Delete),
            other => Err(ParseMovementTypeError(other.to_string())),
        }
    }
}

/// An immutable movement log entry.
///
/// Product and warehouse names are snapshots taken at write time so history
/// stays stable under later renames. Corrections are modeled as new
/// offsetting entries, never edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementEntry {
    pub id: i64,
    pub movement_type: MovementType,
    pub product_id: Uuid,
    pub product_name: String,
    /// None for DELETE entries, which are not tied to a single warehouse
    pub warehouse_id: Option<Uuid>,
    pub warehouse_name: Option<String>,
    /// Quantity magnitude; the signed effect is derived from the type
    pub quantity: i64,
    pub reason: Option<String>,
    pub operator_id: Uuid,
    pub operator_name: String,
    /// Set when the entry was created by an import batch
    pub batch_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl MovementEntry {
    /// Stock-line delta this entry describes (IN positive, OUT negative)
    pub fn signed_quantity(&self) -> i64 {
        self.movement_type.sign() * self.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_type_round_trip() {
        for t in [MovementType::In, MovementType::Out, MovementType::Delete] {
            let parsed: MovementType = t.as_str().parse().unwrap();
            assert_eq!(parsed, t);
        }
        assert!("transfer".parse::<MovementType>().is_err());
    }

    #[test]
    fn test_signed_quantity() {
        let entry = MovementEntry {
            id: 1,
            movement_type: MovementType::Out,
            product_id: Uuid::new_v4(),
            product_name: "Widget".to_string(),
            warehouse_id: Some(Uuid::new_v4()),
            warehouse_name: Some("Main".to_string()),
            quantity: 5,
            reason: None,
            operator_id: Uuid::new_v4(),
            operator_name: "tester".to_string(),
            batch_id: None,
            created_at: Utc::now(),
        };
        assert_eq!(entry.signed_quantity(), -5);

        let entry = MovementEntry {
            movement_type: MovementType::In,
            ..entry
        };
        assert_eq!(entry.signed_quantity(), 5);

        let entry = MovementEntry {
            movement_type: MovementType::Delete,
            quantity: 0,
            ..entry
        };
        assert_eq!(entry.signed_quantity(), 0);
    }
}
