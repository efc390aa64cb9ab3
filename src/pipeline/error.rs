//! Error types for claim ingestion and configuration.
//!
//! Row-level problems are classified as schema or data-format errors so the
//! ingest report can count them by kind. Configuration problems are detected
//! before any data is loaded.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Classification of a row-level ingestion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required field is missing, or the row violates a dataset invariant
    Schema,
    /// A field is present but cannot be parsed into its type
    DataFormat,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Schema => write!(f, "SchemaError"),
            ErrorKind::DataFormat => write!(f, "DataFormatError"),
        }
    }
}

/// A single row that could not be turned into a claim record.
///
/// `row` is the 1-based data row number (the header is not counted).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: &'static str },

    #[error("row {row}: duplicate claim_id '{claim_id}'")]
    DuplicateClaimId { row: usize, claim_id: String },

    #[error("claim {claim_id}: invalid claim_date '{value}' (expected dd/mm/yyyy)")]
    InvalidDate { claim_id: String, value: String },

    #[error("claim {claim_id}: invalid {field} '{value}': {reason}")]
    InvalidNumber {
        claim_id: String,
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl RowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RowError::MissingField { .. } | RowError::DuplicateClaimId { .. } => ErrorKind::Schema,
            RowError::InvalidDate { .. } | RowError::InvalidNumber { .. } => ErrorKind::DataFormat,
        }
    }
}

/// Errors that stop ingestion as a whole.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("input is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("aborted on first bad row ({}): {}", .0.kind(), .0)]
    Aborted(RowError),
}

/// Invalid configuration, reported at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("deep_dive_threshold must be at least 1, got {0}")]
    InvalidThreshold(usize),

    #[error("age_bucket_edges must not be empty")]
    EmptyBucketEdges,

    #[error("age_bucket_edges must be strictly increasing, got {0:?}")]
    UnorderedBucketEdges(Vec<u32>),

    #[error("warranty '{0}' is listed as both tiered and fixed deep-dive")]
    ConflictingWarranty(String),

    #[error("constant imputation value for {0} must not be blank")]
    BlankSentinel(String),

    #[error("histogram_bins must be at least 1")]
    InvalidHistogramBins,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_error_kinds() {
        let missing = RowError::MissingField { row: 3, field: "warranty" };
        assert_eq!(missing.kind(), ErrorKind::Schema);

        let duplicate = RowError::DuplicateClaimId {
            row: 7,
            claim_id: "C-1".to_string(),
        };
        assert_eq!(duplicate.kind(), ErrorKind::Schema);

        let date = RowError::InvalidDate {
            claim_id: "C-2".to_string(),
            value: "2023-01-31".to_string(),
        };
        assert_eq!(date.kind(), ErrorKind::DataFormat);
    }

    #[test]
    fn test_invalid_date_display_names_claim() {
        let err = RowError::InvalidDate {
            claim_id: "C-42".to_string(),
            value: "31/02/2023".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "claim C-42: invalid claim_date '31/02/2023' (expected dd/mm/yyyy)"
        );
    }

    #[test]
    fn test_missing_columns_display() {
        let err = IngestError::MissingColumns(vec!["WARRANTY".to_string(), "CLAIM_DATE".to_string()]);
        assert_eq!(
            err.to_string(),
            "input is missing required column(s): WARRANTY, CLAIM_DATE"
        );
    }

    #[test]
    fn test_aborted_display_includes_kind() {
        let err = IngestError::Aborted(RowError::MissingField { row: 1, field: "claim_id" });
        assert_eq!(
            err.to_string(),
            "aborted on first bad row (SchemaError): row 1: missing required field 'claim_id'"
        );
    }
}
