//! Row parsing under the configured error policy

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::config::ErrorPolicy;
use super::error::{ErrorKind, IngestError, RowError};
use super::record::{ParsedClaim, RawClaimRow};

/// Number of individual row errors kept in the report for display
pub const MAX_SAMPLE_ERRORS: usize = 10;

/// Outcome of ingesting a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub rows_read: usize,
    pub accepted: usize,
    /// Rejected rows per error kind
    pub skipped: BTreeMap<ErrorKind, usize>,
    /// First few row errors, formatted
    pub sample_errors: Vec<String>,
    /// Accepted records without a policyholder age
    pub missing_age: usize,
    /// Accepted records without a recorded premium
    pub missing_premium: usize,
}

impl IngestReport {
    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn skipped_of(&self, kind: ErrorKind) -> usize {
        self.skipped.get(&kind).copied().unwrap_or(0)
    }

    fn record_error(&mut self, err: &RowError) {
        *self.skipped.entry(err.kind()).or_insert(0) += 1;
        if self.sample_errors.len() < MAX_SAMPLE_ERRORS {
            self.sample_errors.push(err.to_string());
        }
    }
}

/// Parse raw rows into claims.
///
/// Under [`ErrorPolicy::Skip`] bad rows are dropped and counted; under
/// [`ErrorPolicy::Abort`] the first bad row ends ingestion. A repeated
/// claim_id is rejected on every occurrence after the first.
pub fn ingest(
    rows: Vec<RawClaimRow>,
    policy: ErrorPolicy,
) -> Result<(Vec<ParsedClaim>, IngestReport), IngestError> {
    let mut report = IngestReport {
        rows_read: rows.len(),
        ..Default::default()
    };
    let mut seen_ids: HashSet<String> = HashSet::with_capacity(rows.len());
    let mut claims = Vec::with_capacity(rows.len());

    for raw in rows {
        let parsed = raw.parse().and_then(|claim| {
            if seen_ids.insert(claim.claim_id.clone()) {
                Ok(claim)
            } else {
                Err(RowError::DuplicateClaimId {
                    row: raw.row,
                    claim_id: claim.claim_id,
                })
            }
        });

        match parsed {
            Ok(claim) => {
                if claim.policyholder_age.is_none() {
                    report.missing_age += 1;
                }
                if claim.premium_amount_paid.is_none() {
                    report.missing_premium += 1;
                }
                claims.push(claim);
            }
            Err(err) => match policy {
                ErrorPolicy::Abort => return Err(IngestError::Aborted(err)),
                ErrorPolicy::Skip => {
                    log::warn!("skipping row ({}): {}", err.kind(), err);
                    report.record_error(&err);
                }
            },
        }
    }

    report.accepted = claims.len();
    log::info!(
        "ingested {} of {} row(s), {} skipped",
        report.accepted,
        report.rows_read,
        report.total_skipped()
    );

    Ok((claims, report))
}
