//! Tests for loading claims files and ingesting rows

mod common;

use claimlens::pipeline::{
    get_column_names, ingest, load_claims, ErrorKind, ErrorPolicy, IngestError,
};
use common::{create_temp_claims_csv, create_temp_csv_with_header, csv_row};
use rust_decimal::Decimal;

#[test]
fn test_load_valid_file() {
    let rows = [
        csv_row("C-1", "GLASSES", "01/02/2023", "120.50", "300"),
        csv_row("C-2", "THEFT", "15/03/2023", "1000", "450.75"),
    ];
    let (_dir, path) = create_temp_claims_csv(&rows);

    let raw = load_claims(&path, b',').unwrap();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[0].row, 1);
    assert_eq!(raw[1].claim_id.as_deref(), Some("C-2"));

    let (claims, report) = ingest(raw, ErrorPolicy::Skip).unwrap();
    assert_eq!(report.accepted, 2);
    assert_eq!(claims[0].claim_amount_paid, Decimal::new(12050, 2));
    assert_eq!(claims[1].premium_amount_paid, Some(Decimal::new(45075, 2)));
}

#[test]
fn test_amounts_not_coerced_by_schema_inference() {
    // Leading zeros and trailing decimals must survive as text until parsed
    let rows = [csv_row("007", "THEFT", "01/02/2023", "100.10", "200.00")];
    let (_dir, path) = create_temp_claims_csv(&rows);

    let raw = load_claims(&path, b',').unwrap();
    assert_eq!(raw[0].claim_id.as_deref(), Some("007"));
    assert_eq!(raw[0].claim_amount_paid.as_deref(), Some("100.10"));
}

#[test]
fn test_lowercase_header_and_extra_columns() {
    let header = [
        "claim_id",
        "policyholder_age",
        "policyholder_gender",
        "warranty",
        "claim_date",
        "claim_region",
        "claim_province",
        "vehicle_brand",
        "vehicle_model",
        "claim_amount_paid",
        "premium_amount_paid",
    ];
    let rows = [csv_row("C-1", "THEFT", "01/01/2023", "10", "20")];
    let (_dir, path) = create_temp_csv_with_header(&header, &rows);

    let raw = load_claims(&path, b',').unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].warranty.as_deref(), Some("THEFT"));
}

#[test]
fn test_missing_column_is_fatal() {
    let header = [
        "CLAIM_ID",
        "POLICYHOLDER_AGE",
        "POLICYHOLDER_GENDER",
        "WARRANTY",
        "CLAIM_DATE",
        "CLAIM_REGION",
        "CLAIM_PROVINCE",
        "VEHICLE_BRAND",
        "VEHICLE_MODEL",
        "CLAIM_AMOUNT_PAID",
    ];
    let rows: [common::CsvRow; 0] = [];
    let (_dir, path) = create_temp_csv_with_header(&header, &rows);

    let err = load_claims(&path, b',').unwrap_err();
    match err.downcast_ref::<IngestError>() {
        Some(IngestError::MissingColumns(missing)) => {
            assert_eq!(missing, &vec!["PREMIUM_AMOUNT_PAID".to_string()])
        }
        other => panic!("expected MissingColumns, got {:?}", other),
    }
}

#[test]
fn test_blank_cells_become_missing() {
    let mut row = csv_row("C-1", "THEFT", "01/01/2023", "10", "20");
    row[1] = None; // age
    row[2] = Some("   "); // gender
    row[10] = None; // premium
    let (_dir, path) = create_temp_claims_csv(&[row]);

    let raw = load_claims(&path, b',').unwrap();
    assert_eq!(raw[0].policyholder_age, None);
    assert_eq!(raw[0].policyholder_gender, None);

    let (claims, report) = ingest(raw, ErrorPolicy::Skip).unwrap();
    assert_eq!(claims.len(), 1);
    assert_eq!(report.missing_age, 1);
    assert_eq!(report.missing_premium, 1);
}

#[test]
fn test_skip_policy_counts_bad_rows_by_kind() {
    let mut no_warranty = csv_row("C-3", "X", "03/01/2023", "10", "20");
    no_warranty[3] = None;
    let rows = [
        csv_row("C-1", "THEFT", "01/01/2023", "10", "20"),
        csv_row("C-2", "THEFT", "2023-01-02", "10", "20"),
        no_warranty,
        csv_row("C-4", "THEFT", "04/01/2023", "ten", "20"),
        csv_row("C-1", "THEFT", "05/01/2023", "10", "20"),
    ];
    let (_dir, path) = create_temp_claims_csv(&rows);

    let raw = load_claims(&path, b',').unwrap();
    let (claims, report) = ingest(raw, ErrorPolicy::Skip).unwrap();

    assert_eq!(claims.len(), 1);
    assert_eq!(report.rows_read, 5);
    assert_eq!(report.skipped_of(ErrorKind::DataFormat), 2);
    assert_eq!(report.skipped_of(ErrorKind::Schema), 2);
    assert!(report.sample_errors.iter().any(|e| e.contains("C-2")));
}

#[test]
fn test_abort_policy_fails_on_first_bad_row() {
    let rows = [
        csv_row("C-1", "THEFT", "01/01/2023", "10", "20"),
        csv_row("C-2", "THEFT", "32/01/2023", "10", "20"),
    ];
    let (_dir, path) = create_temp_claims_csv(&rows);

    let raw = load_claims(&path, b',').unwrap();
    let err = ingest(raw, ErrorPolicy::Abort).unwrap_err();
    assert!(matches!(err, IngestError::Aborted(_)));
    assert!(err.to_string().contains("DataFormatError"));
    assert!(err.to_string().contains("C-2"));
}

#[test]
fn test_semicolon_delimiter() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("claims.csv");
    let header = claimlens::pipeline::CLAIM_COLUMNS.join(";");
    std::fs::write(
        &path,
        format!("{}\nC-1;30;M;THEFT;01/01/2023;North;Alpha;SEAT;IBIZA;10,5;20\n", header),
    )
    .unwrap();

    let columns = get_column_names(&path, b';').unwrap();
    assert_eq!(columns.len(), 11);

    let raw = load_claims(&path, b';').unwrap();
    // A decimal comma is not a valid amount
    let (claims, report) = ingest(raw, ErrorPolicy::Skip).unwrap();
    assert!(claims.is_empty());
    assert_eq!(report.skipped_of(ErrorKind::DataFormat), 1);
}

#[test]
fn test_unsupported_extension_rejected() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("claims.xlsx");
    std::fs::write(&path, "not a csv").unwrap();

    assert!(claimlens::pipeline::load_dataset(&path, b',').is_err());
}

#[test]
fn test_oversized_amounts_rejected_and_counted() {
    let huge = "50000000000000000000000000000";
    let rows = [
        csv_row("C-1", "THEFT", "01/01/2023", huge, "20"),
        csv_row("C-2", "THEFT", "02/01/2023", huge, "20"),
        csv_row("C-3", "THEFT", "03/01/2023", "1000000000000000", "20"),
        csv_row("C-4", "THEFT", "04/01/2023", "10", huge),
    ];
    let (_dir, path) = create_temp_claims_csv(&rows);

    let raw = load_claims(&path, b',').unwrap();
    let (claims, report) = ingest(raw, ErrorPolicy::Skip).unwrap();

    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].claim_id, "C-3");
    assert_eq!(report.skipped_of(ErrorKind::DataFormat), 3);
    assert!(report.sample_errors.iter().any(|e| e.contains("maximum amount")));

    // Accepted amounts aggregate without overflow
    let config = claimlens::pipeline::AnalysisConfig::default();
    let (records, _) = claimlens::pipeline::impute_missing(claims, &config);
    assert!(claimlens::pipeline::run_analysis(&records, &config).is_ok());
}
