//! Full analysis run over normalized records
//!
//! Warranties are listed by claim count, each is assigned a plan and the plan
//! outputs are computed in parallel. Results are collected in list order so
//! repeated runs on the same input produce identical reports.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use indicatif::ProgressBar;
use rayon::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use super::binning::AgeBuckets;
use super::config::AnalysisConfig;
use super::error::ConfigError;
use super::loss::{loss_indicator_table, LossIndicatorRow};
use super::plan::{AnalysisPlan, PlanPolicy};
use super::record::ClaimRecord;
use super::segment::{Dimension, RecordFilter, SegmentAggregator, SegmentTable};
use super::stats::{DatasetProfile, Histogram, NumericSummary};

/// Dimension sets tabulated over the whole dataset
pub const OVERALL_DIMENSIONS: [&[Dimension]; 10] = [
    &[Dimension::Warranty],
    &[Dimension::Gender],
    &[Dimension::AgeBucket],
    &[Dimension::AgeBucket, Dimension::Gender],
    &[Dimension::VehicleBrand],
    &[Dimension::Region],
    &[Dimension::Region, Dimension::Province],
    &[Dimension::ClaimYear],
    &[Dimension::ClaimQuarter],
    &[Dimension::ClaimMonth],
];

/// Premium distribution of a tiered warranty
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PremiumDistribution {
    pub summary: NumericSummary,
    /// Number of distinct premium amounts
    pub distinct: usize,
}

/// Outputs of the plan chosen for a warranty
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "plan", rename_all = "snake_case")]
pub enum PlanOutcome {
    DeepDive {
        by_age_group: SegmentTable,
        by_brand: SegmentTable,
        by_region: SegmentTable,
        by_province: SegmentTable,
    },
    Tiered {
        premiums: Option<PremiumDistribution>,
        claims: Option<NumericSummary>,
        histogram: Option<Histogram>,
    },
    BasicSummary {
        claims: Option<NumericSummary>,
        premiums: Option<NumericSummary>,
    },
}

impl PlanOutcome {
    pub fn plan(&self) -> AnalysisPlan {
        match self {
            PlanOutcome::DeepDive { .. } => AnalysisPlan::DeepDive,
            PlanOutcome::Tiered { .. } => AnalysisPlan::Tiered,
            PlanOutcome::BasicSummary { .. } => AnalysisPlan::BasicSummary,
        }
    }

    /// Deep-dive tables in report order, empty for other plans
    pub fn deep_dive_tables(&self) -> Vec<&SegmentTable> {
        match self {
            PlanOutcome::DeepDive {
                by_age_group,
                by_brand,
                by_region,
                by_province,
            } => vec![by_age_group, by_brand, by_region, by_province],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarrantyAnalysis {
    pub warranty: String,
    pub claim_count: usize,
    pub plan: AnalysisPlan,
    pub reason: String,
    pub outcome: PlanOutcome,
}

/// Everything computed in one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResults {
    pub profile: DatasetProfile,
    pub age_bucket_labels: Vec<String>,
    /// Ordered by claim count descending, then name
    pub warranties: Vec<WarrantyAnalysis>,
    pub overall: Vec<SegmentTable>,
    pub loss_indicators: Vec<LossIndicatorRow>,
}

impl AnalysisResults {
    pub fn warranty(&self, name: &str) -> Option<&WarrantyAnalysis> {
        self.warranties.iter().find(|w| w.warranty == name)
    }

    /// Count of warranties per plan
    pub fn plan_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for w in &self.warranties {
            *counts.entry(w.plan.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// Warranties with their claim counts, most claims first
pub fn warranty_counts(records: &[ClaimRecord]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in records {
        *counts.entry(r.warranty.as_str()).or_insert(0) += 1;
    }
    let mut list: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(w, n)| (w.to_string(), n))
        .collect();
    // Stable: names stay ascending within equal counts
    list.sort_by(|a, b| b.1.cmp(&a.1));
    list
}

fn claim_amounts(members: &[&ClaimRecord]) -> Vec<f64> {
    members
        .iter()
        .filter_map(|r| r.claim_amount_paid.to_f64())
        .collect()
}

fn premium_amounts<'a>(members: &[&'a ClaimRecord]) -> Vec<&'a Decimal> {
    members
        .iter()
        .filter_map(|r| r.premium_amount_paid.as_ref())
        .collect()
}

/// Compute the outputs of `plan` for one warranty.
pub fn run_plan(
    plan: AnalysisPlan,
    warranty: &str,
    records: &[ClaimRecord],
    aggregator: &SegmentAggregator<'_>,
    histogram_bins: usize,
) -> PlanOutcome {
    let members: Vec<&ClaimRecord> = records.iter().filter(|r| r.warranty == warranty).collect();

    match plan {
        AnalysisPlan::DeepDive => {
            let filter = RecordFilter::Warranty(warranty.to_string());
            let table = |d: Dimension| aggregator.aggregate(records, &[d], Some(&filter));
            PlanOutcome::DeepDive {
                by_age_group: table(Dimension::AgeBucket),
                by_brand: table(Dimension::VehicleBrand),
                by_region: table(Dimension::Region),
                by_province: table(Dimension::Province),
            }
        }
        AnalysisPlan::Tiered => {
            let premiums = premium_amounts(&members);
            let distinct = premiums.iter().map(|p| p.normalize()).collect::<HashSet<_>>().len();
            let claims = claim_amounts(&members);
            PlanOutcome::Tiered {
                premiums: NumericSummary::from_decimals(premiums)
                    .map(|summary| PremiumDistribution { summary, distinct }),
                claims: NumericSummary::from_values(&claims),
                histogram: Histogram::from_values(&claims, histogram_bins),
            }
        }
        AnalysisPlan::BasicSummary => PlanOutcome::BasicSummary {
            claims: NumericSummary::from_values(&claim_amounts(&members)),
            premiums: NumericSummary::from_decimals(premium_amounts(&members)),
        },
    }
}

/// Run the full analysis.
///
/// Fails only when the configured age bucket edges are invalid.
pub fn run_analysis(
    records: &[ClaimRecord],
    config: &AnalysisConfig,
) -> Result<AnalysisResults, ConfigError> {
    run_analysis_with_progress(records, config, None)
}

/// [`run_analysis`] that advances `progress` once per analysed warranty.
pub fn run_analysis_with_progress(
    records: &[ClaimRecord],
    config: &AnalysisConfig,
    progress: Option<&ProgressBar>,
) -> Result<AnalysisResults, ConfigError> {
    let buckets = AgeBuckets::new(&config.age_bucket_edges)?;
    let aggregator = SegmentAggregator::new(&buckets);
    let policy = PlanPolicy::from_config(config);

    let counts = warranty_counts(records);
    if let Some(pb) = progress {
        pb.set_length(counts.len() as u64);
    }
    let done = AtomicU64::new(0);

    let warranties: Vec<WarrantyAnalysis> = counts
        .par_iter()
        .map(|(warranty, claim_count)| {
            let plan = policy.select_plan(warranty, *claim_count);
            log::info!("{}: {} claim(s) -> {}", warranty, claim_count, plan);
            let outcome = run_plan(plan, warranty, records, &aggregator, config.histogram_bins);

            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(pb) = progress {
                pb.set_position(n);
            }

            WarrantyAnalysis {
                warranty: warranty.clone(),
                claim_count: *claim_count,
                plan,
                reason: policy.reason(warranty, *claim_count),
                outcome,
            }
        })
        .collect();

    let overall = OVERALL_DIMENSIONS
        .iter()
        .map(|dims| aggregator.aggregate(records, dims, None))
        .collect();

    Ok(AnalysisResults {
        profile: DatasetProfile::from_records(records),
        age_bucket_labels: buckets.labels().into_iter().map(str::to_string).collect(),
        warranties,
        overall,
        loss_indicators: loss_indicator_table(records),
    })
}
