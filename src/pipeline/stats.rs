//! Distribution statistics and dataset profile

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use super::record::{CategoricalField, ClaimRecord};

/// Describe-style summary of a numeric sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` for fewer than two values
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl NumericSummary {
    /// Summarize `values`. Returns `None` for an empty sample.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            Some((ss / (n - 1) as f64).sqrt())
        } else {
            None
        };

        Some(Self {
            count: n,
            mean,
            std,
            min: sorted[0],
            q25: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q75: quantile_sorted(&sorted, 0.75),
            max: sorted[n - 1],
        })
    }

    pub fn from_decimals<'a, I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Decimal>,
    {
        let values: Vec<f64> = values.into_iter().filter_map(|d| d.to_f64()).collect();
        Self::from_values(&values)
    }
}

/// Quantile of an ascending, non-empty slice using linear interpolation
/// between closest ranks.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// One histogram bin `[lower, upper)`; the last bin also includes `upper`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram over `[min, max]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    /// Build a histogram with `bin_count` equal-width bins.
    ///
    /// Returns `None` for an empty sample or zero bins. A sample with a single
    /// distinct value produces one bin holding every value.
    pub fn from_values(values: &[f64], bin_count: usize) -> Option<Self> {
        if values.is_empty() || bin_count == 0 {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if max <= min {
            return Some(Self {
                bins: vec![HistogramBin {
                    lower: min,
                    upper: max,
                    count: values.len(),
                }],
            });
        }

        let width = (max - min) / bin_count as f64;
        let mut counts = vec![0usize; bin_count];
        for &v in values {
            let idx = (((v - min) / width) as usize).min(bin_count - 1);
            counts[idx] += 1;
        }

        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: min + width * i as f64,
                upper: if i + 1 == bin_count {
                    max
                } else {
                    min + width * (i + 1) as f64
                },
                count,
            })
            .collect();

        Some(Self { bins })
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// Distinct count and most frequent value of a categorical field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalProfile {
    pub field: String,
    pub distinct: usize,
    pub most_frequent: String,
    pub most_frequent_count: usize,
}

impl CategoricalProfile {
    fn from_values<'a>(field: &str, values: impl Iterator<Item = &'a str>) -> Option<Self> {
        let mut frequencies: HashMap<&str, usize> = HashMap::new();
        for v in values {
            *frequencies.entry(v).or_insert(0) += 1;
        }
        let distinct = frequencies.len();
        frequencies
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(value, count)| Self {
                field: field.to_string(),
                distinct,
                most_frequent: value.to_string(),
                most_frequent_count: count,
            })
    }
}

/// Overview of a normalized dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetProfile {
    pub records: usize,
    pub age: Option<NumericSummary>,
    pub claim_amount: Option<NumericSummary>,
    pub premium_amount: Option<NumericSummary>,
    /// Warranty first, then the imputed categorical fields
    pub categoricals: Vec<CategoricalProfile>,
    pub first_claim_date: Option<NaiveDate>,
    pub last_claim_date: Option<NaiveDate>,
    /// Claims per calendar year
    pub claims_per_year: BTreeMap<i32, usize>,
}

impl DatasetProfile {
    pub fn from_records(records: &[ClaimRecord]) -> Self {
        use chrono::Datelike;

        let ages: Vec<f64> = records
            .iter()
            .filter_map(|r| r.policyholder_age.map(f64::from))
            .collect();

        let mut categoricals = Vec::with_capacity(CategoricalField::ALL.len() + 1);
        categoricals.extend(CategoricalProfile::from_values(
            "warranty",
            records.iter().map(|r| r.warranty.as_str()),
        ));
        for field in CategoricalField::ALL {
            categoricals.extend(CategoricalProfile::from_values(
                &field.to_string(),
                records.iter().map(|r| r.categorical(field)),
            ));
        }

        let mut claims_per_year = BTreeMap::new();
        for r in records {
            *claims_per_year.entry(r.claim_date.year()).or_insert(0) += 1;
        }

        Self {
            records: records.len(),
            age: NumericSummary::from_values(&ages),
            claim_amount: NumericSummary::from_decimals(records.iter().map(|r| &r.claim_amount_paid)),
            premium_amount: NumericSummary::from_decimals(
                records.iter().filter_map(|r| r.premium_amount_paid.as_ref()),
            ),
            categoricals,
            first_claim_date: records.iter().map(|r| r.claim_date).min(),
            last_claim_date: records.iter().map(|r| r.claim_date).max(),
            claims_per_year,
        }
    }
}
