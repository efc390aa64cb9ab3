//! Illustrative loss indicator per warranty
//!
//! The indicator compares what was paid out on a warranty's claims with the
//! premiums paid by those same claimants. Policies without claims are not in
//! the dataset, so this is not a portfolio loss ratio.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use super::record::ClaimRecord;

/// Caveat attached to every rendering of the indicator
pub const LOSS_INDICATOR_CAVEAT: &str = "Illustrative only: compares claims paid with the premiums of \
     claimant policies. Policies without claims are not included, so this is not a portfolio loss ratio.";

/// Column header for the indicator
pub const LOSS_INDICATOR_COLUMN: &str = "ILLUSTRATIVE_CLAIMANT_PAYOUT_VS_PREMIUM_PCT";

/// Claims paid as a percentage of claimant premiums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LossIndicator {
    Percent(Decimal),
    /// The claimants' premium sum is zero
    NotApplicable,
}

impl LossIndicator {
    pub fn percent(&self) -> Option<Decimal> {
        match self {
            LossIndicator::Percent(p) => Some(*p),
            LossIndicator::NotApplicable => None,
        }
    }

    /// Descending by percentage with `NotApplicable` last
    fn rank_cmp(&self, other: &Self) -> Ordering {
        match (self.percent(), other.percent()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl fmt::Display for LossIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossIndicator::Percent(p) => write!(f, "{:.2}", p.round_dp(2)),
            LossIndicator::NotApplicable => write!(f, "N/A"),
        }
    }
}

/// One row of the loss indicator table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LossIndicatorRow {
    pub warranty: String,
    pub number_of_claims: usize,
    /// Claims whose claimant has a recorded premium
    pub claims_with_premium: usize,
    /// Paid amount over claims with a recorded premium
    pub total_claim_amount_paid: Decimal,
    pub total_premium_paid_by_claimers: Decimal,
    pub indicator: LossIndicator,
}

/// Sums over the claims of `warranty` that have a recorded premium
fn restricted_totals<'a, I>(warranty: &str, records: I) -> (usize, usize, Decimal, Decimal)
where
    I: IntoIterator<Item = &'a ClaimRecord>,
{
    let mut claims = 0;
    let mut with_premium = 0;
    let mut paid = Decimal::ZERO;
    let mut premium = Decimal::ZERO;
    for record in records.into_iter().filter(|r| r.warranty == warranty) {
        claims += 1;
        if let Some(p) = record.premium_amount_paid {
            with_premium += 1;
            paid += record.claim_amount_paid;
            premium += p;
        }
    }
    (claims, with_premium, paid, premium)
}

fn indicator_from(paid: Decimal, premium: Decimal) -> LossIndicator {
    if premium.is_zero() {
        LossIndicator::NotApplicable
    } else {
        LossIndicator::Percent(paid * Decimal::ONE_HUNDRED / premium)
    }
}

/// Loss indicator for one warranty.
///
/// Only claims with a recorded premium are considered. A zero premium sum
/// gives [`LossIndicator::NotApplicable`].
pub fn loss_indicator(warranty: &str, records: &[ClaimRecord]) -> LossIndicator {
    let (_, _, paid, premium) = restricted_totals(warranty, records);
    indicator_from(paid, premium)
}

/// Loss indicator rows for every warranty present in `records`.
///
/// Ordered by indicator descending, `NotApplicable` last, ties by warranty.
pub fn loss_indicator_table(records: &[ClaimRecord]) -> Vec<LossIndicatorRow> {
    let mut by_warranty: BTreeMap<&str, Vec<&ClaimRecord>> = BTreeMap::new();
    for record in records {
        by_warranty.entry(record.warranty.as_str()).or_default().push(record);
    }

    let mut rows: Vec<LossIndicatorRow> = by_warranty
        .into_iter()
        .map(|(warranty, members)| {
            let (claims, with_premium, paid, premium) =
                restricted_totals(warranty, members.iter().copied());
            LossIndicatorRow {
                warranty: warranty.to_string(),
                number_of_claims: claims,
                claims_with_premium: with_premium,
                total_claim_amount_paid: paid,
                total_premium_paid_by_claimers: premium,
                indicator: indicator_from(paid, premium),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.indicator
            .rank_cmp(&b.indicator)
            .then_with(|| a.warranty.cmp(&b.warranty))
    });
    rows
}
