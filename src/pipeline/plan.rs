//! Warranty analysis plan selection

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::config::AnalysisConfig;

/// Depth of analysis applied to a warranty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPlan {
    /// Breakdown by age group, brand, region and province
    DeepDive,
    /// Premium and claim distributions for flat-rate coverages
    Tiered,
    /// Describe-style summary of claim and premium amounts
    BasicSummary,
}

impl fmt::Display for AnalysisPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisPlan::DeepDive => write!(f, "Deep dive"),
            AnalysisPlan::Tiered => write!(f, "Tiered coverage"),
            AnalysisPlan::BasicSummary => write!(f, "Basic summary"),
        }
    }
}

/// The parts of [`AnalysisConfig`] that drive plan selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanPolicy {
    pub deep_dive_threshold: usize,
    pub tiered_warranties: BTreeSet<String>,
    pub deep_dive_fixed_warranties: BTreeSet<String>,
}

impl PlanPolicy {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            deep_dive_threshold: config.deep_dive_threshold,
            tiered_warranties: config.tiered_warranties.clone(),
            deep_dive_fixed_warranties: config.deep_dive_fixed_warranties.clone(),
        }
    }

    /// Choose the plan for a warranty.
    ///
    /// The tiered set wins over everything, then the fixed deep-dive set,
    /// then the claim count threshold (inclusive).
    pub fn select_plan(&self, warranty: &str, claim_count: usize) -> AnalysisPlan {
        if self.tiered_warranties.contains(warranty) {
            AnalysisPlan::Tiered
        } else if self.deep_dive_fixed_warranties.contains(warranty) {
            AnalysisPlan::DeepDive
        } else if claim_count >= self.deep_dive_threshold {
            AnalysisPlan::DeepDive
        } else {
            AnalysisPlan::BasicSummary
        }
    }

    /// Why a plan was chosen, for reports
    pub fn reason(&self, warranty: &str, claim_count: usize) -> String {
        if self.tiered_warranties.contains(warranty) {
            "tiered coverage warranty".to_string()
        } else if self.deep_dive_fixed_warranties.contains(warranty) {
            "always analysed in depth".to_string()
        } else if claim_count >= self.deep_dive_threshold {
            format!("{} claims >= threshold {}", claim_count, self.deep_dive_threshold)
        } else {
            format!("{} claims < threshold {}", claim_count, self.deep_dive_threshold)
        }
    }
}

impl Default for PlanPolicy {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}
