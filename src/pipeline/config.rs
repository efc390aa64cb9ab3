//! Analysis configuration
//!
//! Defaults can be overridden by a JSON config file and then by CLI flags.
//! [`AnalysisConfig::validate`] must pass before any data is loaded.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::record::CategoricalField;

/// Minimum number of claims for a warranty to get a deep-dive breakdown
pub const DEFAULT_DEEP_DIVE_THRESHOLD: usize = 30;

/// Warranties that always receive the tiered coverage analysis
pub const DEFAULT_TIERED_WARRANTIES: [&str; 2] = ["GLASSES", "TRAVEL ASSISTANCE"];

/// Warranties that always receive a deep dive
pub const DEFAULT_DEEP_DIVE_WARRANTIES: [&str; 1] = ["CIVIL LIABILITY INSURANCE"];

/// Lower edges of the age buckets; see [`crate::pipeline::AgeBuckets`]
pub const DEFAULT_AGE_BUCKET_EDGES: [u32; 6] = [18, 26, 36, 46, 56, 66];

/// Number of equal-width bins in claim amount histograms
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Sentinel for categorical values that could not be imputed from data
pub const UNKNOWN: &str = "Unknown";

/// How a blank categorical field is filled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationRule {
    /// Fill with a fixed sentinel value
    Constant(String),
    /// Fill with the most frequent non-missing value of the same field
    Mode,
}

impl fmt::Display for ImputationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImputationRule::Constant(value) => write!(f, "constant(\"{}\")", value),
            ImputationRule::Mode => write!(f, "mode"),
        }
    }
}

/// What to do with rows that fail parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Drop the row and count it by error kind
    #[default]
    Skip,
    /// Stop ingestion at the first bad row
    Abort,
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Skip => write!(f, "skip"),
            ErrorPolicy::Abort => write!(f, "abort"),
        }
    }
}

impl std::str::FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(ErrorPolicy::Skip),
            "abort" => Ok(ErrorPolicy::Abort),
            _ => Err(format!("Unknown error policy: '{}'. Use 'skip' or 'abort'.", s)),
        }
    }
}

/// Complete configuration recognized by the analysis core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub deep_dive_threshold: usize,
    pub tiered_warranties: BTreeSet<String>,
    pub deep_dive_fixed_warranties: BTreeSet<String>,
    pub age_bucket_edges: Vec<u32>,
    pub imputation: BTreeMap<CategoricalField, ImputationRule>,
    pub error_policy: ErrorPolicy,
    pub histogram_bins: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            deep_dive_threshold: DEFAULT_DEEP_DIVE_THRESHOLD,
            tiered_warranties: DEFAULT_TIERED_WARRANTIES.iter().map(|s| s.to_string()).collect(),
            deep_dive_fixed_warranties: DEFAULT_DEEP_DIVE_WARRANTIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            age_bucket_edges: DEFAULT_AGE_BUCKET_EDGES.to_vec(),
            imputation: default_imputation(),
            error_policy: ErrorPolicy::default(),
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

/// Gender is filled with its mode; location and vehicle fields with "Unknown".
pub fn default_imputation() -> BTreeMap<CategoricalField, ImputationRule> {
    CategoricalField::ALL
        .iter()
        .map(|&field| {
            let rule = match field {
                CategoricalField::PolicyholderGender => ImputationRule::Mode,
                _ => ImputationRule::Constant(UNKNOWN.to_string()),
            };
            (field, rule)
        })
        .collect()
}

impl AnalysisConfig {
    /// Load a config file. Fields not present in the file keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: AnalysisConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        // A partial imputation map only overrides the fields it names
        let mut imputation = default_imputation();
        imputation.append(&mut config.imputation);
        config.imputation = imputation;

        Ok(config)
    }

    /// Rule for a field. Fields absent from the map use the default rule.
    pub fn imputation_rule(&self, field: CategoricalField) -> ImputationRule {
        self.imputation
            .get(&field)
            .cloned()
            .or_else(|| default_imputation().remove(&field))
            .unwrap_or(ImputationRule::Constant(UNKNOWN.to_string()))
    }

    /// Check every setting. Fails on the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deep_dive_threshold == 0 {
            return Err(ConfigError::InvalidThreshold(self.deep_dive_threshold));
        }

        if self.age_bucket_edges.is_empty() {
            return Err(ConfigError::EmptyBucketEdges);
        }
        if self.age_bucket_edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::UnorderedBucketEdges(self.age_bucket_edges.clone()));
        }

        if let Some(name) = self
            .tiered_warranties
            .intersection(&self.deep_dive_fixed_warranties)
            .next()
        {
            return Err(ConfigError::ConflictingWarranty(name.clone()));
        }

        for (field, rule) in &self.imputation {
            if let ImputationRule::Constant(value) = rule {
                if value.trim().is_empty() {
                    return Err(ConfigError::BlankSentinel(field.to_string()));
                }
            }
        }

        if self.histogram_bins == 0 {
            return Err(ConfigError::InvalidHistogramBins);
        }

        Ok(())
    }
}
