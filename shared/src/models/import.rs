//! Import batch models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Aggregate outcome of an import batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Success,
    Partial,
    Failed,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Success => "success",
            ImportStatus::Partial => "partial",
            ImportStatus::Failed => "failed",
        }
    }
}

/// Error returned when parsing an unknown import status string
#[derive(Debug, Error)]
#[error("unknown import status: {0}")]
pub struct ParseImportStatusError(pub String);

impl FromStr for ImportStatus {
    type Err = ParseImportStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ImportStatus::Success),
            "partial" => Ok(ImportStatus::Partial),
            "failed" => Ok(ImportStatus::Failed),
            other => Err(ParseImportStatusError(other.to_string())),
        }
    }
}

/// Compute the batch status from row outcomes.
///
/// A failed row never rolls back the rows that already committed, so the
/// batch status reflects the mix: all rows committed -> success, some ->
/// partial, none (including an empty batch) -> failed.
pub fn batch_status(succeeded: usize, total: usize) -> ImportStatus {
    if succeeded == 0 {
        ImportStatus::Failed
    } else if succeeded == total {
        ImportStatus::Success
    } else {
        ImportStatus::Partial
    }
}

/// A persisted import batch record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub file_type: String,
    pub total_records: i32,
    pub succeeded_records: i32,
    pub failed_records: i32,
    pub status: ImportStatus,
    pub operator_id: Uuid,
    pub operator_name: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of one row within an import batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRowOutcome {
    /// 1-based row number within the input
    pub row: u32,
    pub sku: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_status_all_succeeded() {
        assert_eq!(batch_status(5, 5), ImportStatus::Success);
        assert_eq!(batch_status(1, 1), ImportStatus::Success);
    }

    #[test]
    fn test_batch_status_partial() {
        assert_eq!(batch_status(4, 5), ImportStatus::Partial);
        assert_eq!(batch_status(1, 2), ImportStatus::Partial);
    }

    #[test]
    fn test_batch_status_none_succeeded() {
        assert_eq!(batch_status(0, 5), ImportStatus::Failed);
        assert_eq!(batch_status(0, 0), ImportStatus::Failed);
    }

    #[test]
    fn test_import_status_round_trip() {
        for s in [
            ImportStatus::Success,
            ImportStatus::Partial,
            ImportStatus::Failed,
        ] {
            let parsed: ImportStatus = s.as_str().parse().unwrap();
            assert_eq!(parsed, s);
        }
        assert!("aborted".parse::<ImportStatus>().is_err());
    }
}
