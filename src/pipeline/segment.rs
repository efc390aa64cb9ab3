//! Segment aggregation over normalized claim records
//!
//! Records are grouped by an ordered list of [`Dimension`]s. Each distinct
//! tuple of dimension values becomes one [`Segment`] with its metrics. The
//! segments of a table partition the filtered input: every record lands in
//! exactly one segment and no segment is empty.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::binning::AgeBuckets;
use super::record::ClaimRecord;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A field records can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Warranty,
    Gender,
    AgeBucket,
    Region,
    Province,
    VehicleBrand,
    VehicleModel,
    ClaimYear,
    ClaimQuarter,
    ClaimMonth,
}

impl Dimension {
    /// Column header used in rendered tables
    pub fn column_name(&self) -> &'static str {
        match self {
            Dimension::Warranty => "WARRANTY",
            Dimension::Gender => "POLICYHOLDER_GENDER",
            Dimension::AgeBucket => "AGE_GROUP",
            Dimension::Region => "CLAIM_REGION",
            Dimension::Province => "CLAIM_PROVINCE",
            Dimension::VehicleBrand => "VEHICLE_BRAND",
            Dimension::VehicleModel => "VEHICLE_MODEL",
            Dimension::ClaimYear => "CLAIM_YEAR",
            Dimension::ClaimQuarter => "CLAIM_QUARTER",
            Dimension::ClaimMonth => "CLAIM_MONTH",
        }
    }

    /// Short name used in file names
    pub fn slug(&self) -> &'static str {
        match self {
            Dimension::Warranty => "warranty",
            Dimension::Gender => "gender",
            Dimension::AgeBucket => "age_group",
            Dimension::Region => "region",
            Dimension::Province => "province",
            Dimension::VehicleBrand => "brand",
            Dimension::VehicleModel => "model",
            Dimension::ClaimYear => "year",
            Dimension::ClaimQuarter => "quarter",
            Dimension::ClaimMonth => "month",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// The value of one dimension for one record.
///
/// The derived ordering gives bucket order for ages, calendar order for
/// dates and lexical order for text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum SegmentValue {
    Text(String),
    AgeBucket { index: usize, label: String },
    Year(i32),
    /// Quarter 1-4
    Quarter(u32),
    /// Month 1-12
    Month(u32),
}

impl SegmentValue {
    /// Text label as shown in tables and matched by [`RecordFilter::Field`]
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SegmentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentValue::Text(s) => write!(f, "{}", s),
            SegmentValue::AgeBucket { label, .. } => write!(f, "{}", label),
            SegmentValue::Year(y) => write!(f, "{}", y),
            SegmentValue::Quarter(q) => write!(f, "Q{}", q),
            SegmentValue::Month(m) => {
                let name = (*m as usize)
                    .checked_sub(1)
                    .and_then(|i| MONTH_NAMES.get(i))
                    .copied()
                    .unwrap_or("?");
                write!(f, "{}", name)
            }
        }
    }
}

/// Tuple of dimension values identifying a segment
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SegmentKey(pub Vec<SegmentValue>);

impl SegmentKey {
    pub fn labels(&self) -> Vec<String> {
        self.0.iter().map(SegmentValue::label).collect()
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(all)");
        }
        write!(f, "{}", self.labels().join(" / "))
    }
}

/// Per-segment metrics. Amounts are exact; rounding is left to renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentMetrics {
    pub claim_count: usize,
    pub total_claim_amount_paid: Decimal,
    /// Sum of recorded premiums of the claimants in this segment
    pub total_premium_paid_by_claimers: Decimal,
    pub average_claim_amount: Decimal,
    pub median_claim_amount: Decimal,
}

impl SegmentMetrics {
    /// Compute metrics over a non-empty group of records.
    fn from_records(records: &[&ClaimRecord]) -> Self {
        let claim_count = records.len();
        let mut amounts: Vec<Decimal> = records.iter().map(|r| r.claim_amount_paid).collect();
        let total_claim_amount_paid: Decimal = amounts.iter().copied().sum();
        let total_premium_paid_by_claimers: Decimal =
            records.iter().filter_map(|r| r.premium_amount_paid).sum();

        amounts.sort_unstable();
        let median_claim_amount = median_sorted(&amounts).unwrap_or(Decimal::ZERO);
        let average_claim_amount = if claim_count == 0 {
            Decimal::ZERO
        } else {
            total_claim_amount_paid / Decimal::from(claim_count)
        };

        Self {
            claim_count,
            total_claim_amount_paid,
            total_premium_paid_by_claimers,
            average_claim_amount,
            median_claim_amount,
        }
    }
}

/// Median of an ascending slice; the mean of the two middle values for an
/// even length.
pub fn median_sorted(sorted: &[Decimal]) -> Option<Decimal> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / Decimal::TWO)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub key: SegmentKey,
    pub metrics: SegmentMetrics,
}

/// Ordered segments for one grouping.
///
/// Segments are sorted by claim count descending, then by key ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentTable {
    pub dimensions: Vec<Dimension>,
    pub segments: Vec<Segment>,
}

impl SegmentTable {
    /// Look up a segment by key
    pub fn get(&self, key: &SegmentKey) -> Option<&SegmentMetrics> {
        self.segments
            .iter()
            .find(|s| &s.key == key)
            .map(|s| &s.metrics)
    }

    /// Look up a segment by its rendered labels, e.g. `["North", "Alpha"]`
    pub fn get_by_labels(&self, labels: &[&str]) -> Option<&SegmentMetrics> {
        self.segments
            .iter()
            .find(|s| {
                s.key.0.len() == labels.len()
                    && s.key.0.iter().zip(labels).all(|(v, l)| v.label() == *l)
            })
            .map(|s| &s.metrics)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total claims across all segments
    pub fn total_claims(&self) -> usize {
        self.segments.iter().map(|s| s.metrics.claim_count).sum()
    }

    /// File-name friendly title, e.g. `region_by_province`
    pub fn title(&self) -> String {
        if self.dimensions.is_empty() {
            return "all_claims".to_string();
        }
        self.dimensions
            .iter()
            .map(Dimension::slug)
            .collect::<Vec<_>>()
            .join("_by_")
    }
}

/// Predicate applied to records before grouping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    Warranty(String),
    Warranties(BTreeSet<String>),
    /// Records whose value for the dimension renders as the given label
    Field(Dimension, String),
    /// All inner filters must match; an empty list matches everything
    All(Vec<RecordFilter>),
}

/// Groups records by dimensions.
///
/// Holds the age bucket layout so [`Dimension::AgeBucket`] keys are stable
/// across calls.
#[derive(Debug, Clone)]
pub struct SegmentAggregator<'a> {
    buckets: &'a AgeBuckets,
}

impl<'a> SegmentAggregator<'a> {
    pub fn new(buckets: &'a AgeBuckets) -> Self {
        Self { buckets }
    }

    pub fn buckets(&self) -> &AgeBuckets {
        self.buckets
    }

    /// Value of a dimension for a record
    pub fn value_of(&self, record: &ClaimRecord, dimension: Dimension) -> SegmentValue {
        let text = |value: &str| SegmentValue::Text(value.to_string());
        match dimension {
            Dimension::Warranty => text(&record.warranty),
            Dimension::Gender => text(&record.policyholder_gender),
            Dimension::Region => text(&record.claim_region),
            Dimension::Province => text(&record.claim_province),
            Dimension::VehicleBrand => text(&record.vehicle_brand),
            Dimension::VehicleModel => text(&record.vehicle_model),
            Dimension::AgeBucket => {
                let bucket = self.buckets.bucket_for(record.policyholder_age);
                SegmentValue::AgeBucket {
                    index: bucket.index,
                    label: bucket.label.clone(),
                }
            }
            Dimension::ClaimYear => SegmentValue::Year(record.claim_date.year()),
            Dimension::ClaimQuarter => SegmentValue::Quarter((record.claim_date.month() - 1) / 3 + 1),
            Dimension::ClaimMonth => SegmentValue::Month(record.claim_date.month()),
        }
    }

    pub fn matches(&self, record: &ClaimRecord, filter: &RecordFilter) -> bool {
        match filter {
            RecordFilter::Warranty(name) => &record.warranty == name,
            RecordFilter::Warranties(names) => names.contains(&record.warranty),
            RecordFilter::Field(dimension, label) => {
                self.value_of(record, *dimension).label() == *label
            }
            RecordFilter::All(filters) => filters.iter().all(|f| self.matches(record, f)),
        }
    }

    /// Group the records passing `filter` by `dimensions`.
    pub fn aggregate(
        &self,
        records: &[ClaimRecord],
        dimensions: &[Dimension],
        filter: Option<&RecordFilter>,
    ) -> SegmentTable {
        let mut groups: BTreeMap<SegmentKey, Vec<&ClaimRecord>> = BTreeMap::new();
        for record in records {
            if let Some(filter) = filter {
                if !self.matches(record, filter) {
                    continue;
                }
            }
            let key = SegmentKey(
                dimensions
                    .iter()
                    .map(|&d| self.value_of(record, d))
                    .collect(),
            );
            groups.entry(key).or_default().push(record);
        }

        // BTreeMap iteration is key-ascending; the stable sort keeps that for ties
        let mut segments: Vec<Segment> = groups
            .into_iter()
            .map(|(key, members)| Segment {
                key,
                metrics: SegmentMetrics::from_records(&members),
            })
            .collect();
        segments.sort_by(|a, b| b.metrics.claim_count.cmp(&a.metrics.claim_count));

        log::debug!(
            "aggregated {} record(s) by [{}] into {} segment(s)",
            segments.iter().map(|s| s.metrics.claim_count).sum::<usize>(),
            dimensions
                .iter()
                .map(Dimension::slug)
                .collect::<Vec<_>>()
                .join(", "),
            segments.len()
        );

        SegmentTable {
            dimensions: dimensions.to_vec(),
            segments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, warranty: &str, age: Option<u32>, region: &str, amount: i64) -> ClaimRecord {
        ClaimRecord {
            claim_id: id.to_string(),
            policyholder_age: age,
            policyholder_gender: "F".to_string(),
            warranty: warranty.to_string(),
            claim_date: NaiveDate::from_ymd_opt(2023, 5, 10).unwrap(),
            claim_region: region.to_string(),
            claim_province: "P".to_string(),
            vehicle_brand: "SEAT".to_string(),
            vehicle_model: "IBIZA".to_string(),
            claim_amount_paid: Decimal::from(amount),
            premium_amount_paid: Some(Decimal::from(300)),
        }
    }

    #[test]
    fn test_counts_sorted_then_key_ascending() {
        let buckets = AgeBuckets::default();
        let agg = SegmentAggregator::new(&buckets);
        let records = vec![
            record("1", "THEFT", Some(30), "South", 100),
            record("2", "THEFT", Some(30), "North", 100),
            record("3", "THEFT", Some(30), "East", 100),
            record("4", "THEFT", Some(30), "East", 100),
        ];

        let table = agg.aggregate(&records, &[Dimension::Region], None);
        let labels: Vec<String> = table.segments.iter().map(|s| s.key.to_string()).collect();
        assert_eq!(labels, vec!["East", "North", "South"]);
    }

    #[test]
    fn test_empty_dimensions_single_segment() {
        let buckets = AgeBuckets::default();
        let agg = SegmentAggregator::new(&buckets);
        let records = vec![
            record("1", "THEFT", None, "North", 100),
            record("2", "GLASSES", None, "North", 300),
        ];

        let table = agg.aggregate(&records, &[], None);
        assert_eq!(table.len(), 1);
        let metrics = table.get(&SegmentKey(vec![])).unwrap();
        assert_eq!(metrics.claim_count, 2);
        assert_eq!(metrics.average_claim_amount, Decimal::from(200));
        assert_eq!(table.title(), "all_claims");
    }

    #[test]
    fn test_filter_excludes_everything_yields_empty_table() {
        let buckets = AgeBuckets::default();
        let agg = SegmentAggregator::new(&buckets);
        let records = vec![record("1", "THEFT", None, "North", 100)];
        let filter = RecordFilter::Warranty("GLASSES".to_string());

        let table = agg.aggregate(&records, &[Dimension::Region], Some(&filter));
        assert!(table.is_empty());
    }

    #[test]
    fn test_age_buckets_sorted_in_bucket_order_on_ties() {
        let buckets = AgeBuckets::default();
        let agg = SegmentAggregator::new(&buckets);
        let records = vec![
            record("1", "THEFT", None, "N", 1),
            record("2", "THEFT", Some(70), "N", 1),
            record("3", "THEFT", Some(20), "N", 1),
            record("4", "THEFT", Some(10), "N", 1),
        ];

        let table = agg.aggregate(&records, &[Dimension::AgeBucket], None);
        let labels: Vec<String> = table.segments.iter().map(|s| s.key.to_string()).collect();
        assert_eq!(labels, vec!["<18", "18-25", "66+", "Unknown"]);
    }

    #[test]
    fn test_median_even_and_odd() {
        let values = [Decimal::from(1), Decimal::from(3), Decimal::from(10)];
        assert_eq!(median_sorted(&values), Some(Decimal::from(3)));
        assert_eq!(median_sorted(&values[..2]), Some(Decimal::from(2)));
        assert_eq!(median_sorted(&[]), None);
    }

    #[test]
    fn test_field_filter_and_month_label() {
        let buckets = AgeBuckets::default();
        let agg = SegmentAggregator::new(&buckets);
        let records = vec![record("1", "THEFT", Some(40), "North", 50)];

        let by_month = RecordFilter::Field(Dimension::ClaimMonth, "May".to_string());
        assert!(agg.matches(&records[0], &by_month));

        let table = agg.aggregate(&records, &[Dimension::ClaimQuarter, Dimension::ClaimMonth], None);
        assert!(table.get_by_labels(&["Q2", "May"]).is_some());
        assert_eq!(table.title(), "quarter_by_month");
    }
}
