//! Tests for segment aggregation

mod common;

use std::collections::BTreeSet;

use claimlens::pipeline::{
    AgeBuckets, Dimension, RecordFilter, SegmentAggregator, SegmentKey, SegmentValue,
};
use common::{warranty_records, RecordBuilder};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const ALL_DIMENSIONS: [Dimension; 10] = [
    Dimension::Warranty,
    Dimension::Gender,
    Dimension::AgeBucket,
    Dimension::Region,
    Dimension::Province,
    Dimension::VehicleBrand,
    Dimension::VehicleModel,
    Dimension::ClaimYear,
    Dimension::ClaimQuarter,
    Dimension::ClaimMonth,
];

#[test]
fn test_segments_partition_input_for_every_dimension() {
    let mut records = warranty_records("THEFT", 40, 0);
    records.extend(warranty_records("GLASSES", 17, 100));
    records.push(RecordBuilder::new("no-age", "THEFT").age(None).build());

    let buckets = AgeBuckets::default();
    let agg = SegmentAggregator::new(&buckets);

    for dim in ALL_DIMENSIONS {
        let table = agg.aggregate(&records, &[dim], None);
        assert_eq!(table.total_claims(), records.len(), "partition broken for {}", dim);
        assert!(table.segments.iter().all(|s| s.metrics.claim_count > 0));

        let keys: BTreeSet<&SegmentKey> = table.segments.iter().map(|s| &s.key).collect();
        assert_eq!(keys.len(), table.len(), "duplicate key for {}", dim);
    }

    let compound = agg.aggregate(&records, &[Dimension::Region, Dimension::Province], None);
    assert_eq!(compound.total_claims(), records.len());
}

#[test]
fn test_average_times_count_reconstructs_total() {
    let records = warranty_records("THEFT", 37, 0);
    let buckets = AgeBuckets::default();
    let agg = SegmentAggregator::new(&buckets);

    let table = agg.aggregate(&records, &[Dimension::VehicleBrand], None);
    for segment in &table.segments {
        let m = &segment.metrics;
        let rebuilt = m.average_claim_amount * Decimal::from(m.claim_count);
        assert!(
            (rebuilt - m.total_claim_amount_paid).abs() < dec!(0.01),
            "{}: {} vs {}",
            segment.key,
            rebuilt,
            m.total_claim_amount_paid
        );
    }
}

#[test]
fn test_totals_exact_across_segments() {
    let records = vec![
        RecordBuilder::new("1", "THEFT").paid(dec!(0.10)).build(),
        RecordBuilder::new("2", "THEFT").paid(dec!(0.20)).build(),
        RecordBuilder::new("3", "THEFT").paid(dec!(0.30)).gender("F").build(),
    ];
    let buckets = AgeBuckets::default();
    let agg = SegmentAggregator::new(&buckets);

    let table = agg.aggregate(&records, &[Dimension::Gender], None);
    let total: Decimal = table
        .segments
        .iter()
        .map(|s| s.metrics.total_claim_amount_paid)
        .sum();
    assert_eq!(total, dec!(0.60));
}

#[test]
fn test_region_by_province_keys() {
    let records = vec![
        RecordBuilder::new("1", "THEFT").region("North", "Alpha").build(),
        RecordBuilder::new("2", "THEFT").region("North", "Alpha").build(),
        RecordBuilder::new("3", "THEFT").region("North", "Beta").build(),
        RecordBuilder::new("4", "THEFT").region("South", "Alpha").build(),
    ];
    let buckets = AgeBuckets::default();
    let agg = SegmentAggregator::new(&buckets);

    let table = agg.aggregate(&records, &[Dimension::Region, Dimension::Province], None);
    assert_eq!(table.len(), 3);
    assert_eq!(table.segments[0].key.labels(), vec!["North", "Alpha"]);
    assert_eq!(table.get_by_labels(&["North", "Alpha"]).unwrap().claim_count, 2);
    // Same province name in two regions stays separate
    assert_eq!(table.get_by_labels(&["South", "Alpha"]).unwrap().claim_count, 1);
    assert_eq!(table.title(), "region_by_province");
}

#[test]
fn test_month_order_is_calendar_on_ties() {
    let records = vec![
        RecordBuilder::new("1", "THEFT").date(2023, 12, 1).build(),
        RecordBuilder::new("2", "THEFT").date(2023, 2, 1).build(),
        RecordBuilder::new("3", "THEFT").date(2023, 9, 1).build(),
    ];
    let buckets = AgeBuckets::default();
    let agg = SegmentAggregator::new(&buckets);

    let table = agg.aggregate(&records, &[Dimension::ClaimMonth], None);
    let labels: Vec<String> = table.segments.iter().map(|s| s.key.to_string()).collect();
    assert_eq!(labels, vec!["February", "September", "December"]);
    assert!(table
        .get(&SegmentKey(vec![SegmentValue::Month(9)]))
        .is_some());
}

#[test]
fn test_filters_applied_before_grouping() {
    let mut records = warranty_records("THEFT", 10, 0);
    records.extend(warranty_records("GLASSES", 5, 100));
    records.extend(warranty_records("TOWING", 3, 200));

    let buckets = AgeBuckets::default();
    let agg = SegmentAggregator::new(&buckets);

    let one = RecordFilter::Warranty("GLASSES".to_string());
    assert_eq!(agg.aggregate(&records, &[], Some(&one)).total_claims(), 5);

    let set = RecordFilter::Warranties(
        ["GLASSES", "TOWING"].iter().map(|s| s.to_string()).collect(),
    );
    assert_eq!(agg.aggregate(&records, &[], Some(&set)).total_claims(), 8);

    let both = RecordFilter::All(vec![
        RecordFilter::Warranty("THEFT".to_string()),
        RecordFilter::Field(Dimension::Gender, "F".to_string()),
    ]);
    let table = agg.aggregate(&records, &[Dimension::Gender], Some(&both));
    assert_eq!(table.len(), 1);
    assert_eq!(table.total_claims(), 5);

    let everything = RecordFilter::All(vec![]);
    assert_eq!(
        agg.aggregate(&records, &[], Some(&everything)).total_claims(),
        records.len()
    );
}

#[test]
fn test_age_bucket_keys_with_custom_edges() {
    let records = vec![
        RecordBuilder::new("1", "THEFT").age(Some(20)).build(),
        RecordBuilder::new("2", "THEFT").age(Some(45)).build(),
        RecordBuilder::new("3", "THEFT").age(Some(45)).build(),
        RecordBuilder::new("4", "THEFT").age(None).build(),
    ];
    let buckets = AgeBuckets::new(&[25, 40]).unwrap();
    let agg = SegmentAggregator::new(&buckets);

    let table = agg.aggregate(&records, &[Dimension::AgeBucket], None);
    let labels: Vec<String> = table.segments.iter().map(|s| s.key.to_string()).collect();
    assert_eq!(labels, vec!["40+", "<25", "Unknown"]);
}

#[test]
fn test_aggregation_is_repeatable() {
    let records = warranty_records("THEFT", 50, 0);
    let buckets = AgeBuckets::default();
    let agg = SegmentAggregator::new(&buckets);

    let first = agg.aggregate(&records, &[Dimension::AgeBucket, Dimension::Gender], None);
    let second = agg.aggregate(&records, &[Dimension::AgeBucket, Dimension::Gender], None);
    assert_eq!(first, second);
}
