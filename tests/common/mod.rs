//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDate;
use claimlens::pipeline::{ClaimRecord, CLAIM_COLUMNS};
use rust_decimal::Decimal;
use tempfile::TempDir;

/// Builder for normalized claim records with sensible defaults
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: ClaimRecord,
}

impl RecordBuilder {
    pub fn new(id: impl Into<String>, warranty: &str) -> Self {
        Self {
            record: ClaimRecord {
                claim_id: id.into(),
                policyholder_age: Some(40),
                policyholder_gender: "M".to_string(),
                warranty: warranty.to_string(),
                claim_date: NaiveDate::from_ymd_opt(2023, 6, 15).unwrap(),
                claim_region: "North".to_string(),
                claim_province: "Alpha".to_string(),
                vehicle_brand: "SEAT".to_string(),
                vehicle_model: "IBIZA".to_string(),
                claim_amount_paid: Decimal::from(100),
                premium_amount_paid: Some(Decimal::from(400)),
            },
        }
    }

    pub fn age(mut self, age: Option<u32>) -> Self {
        self.record.policyholder_age = age;
        self
    }

    pub fn gender(mut self, gender: &str) -> Self {
        self.record.policyholder_gender = gender.to_string();
        self
    }

    pub fn region(mut self, region: &str, province: &str) -> Self {
        self.record.claim_region = region.to_string();
        self.record.claim_province = province.to_string();
        self
    }

    pub fn brand(mut self, brand: &str) -> Self {
        self.record.vehicle_brand = brand.to_string();
        self
    }

    pub fn date(mut self, year: i32, month: u32, day: u32) -> Self {
        self.record.claim_date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        self
    }

    pub fn paid(mut self, amount: Decimal) -> Self {
        self.record.claim_amount_paid = amount;
        self
    }

    pub fn premium(mut self, premium: Option<Decimal>) -> Self {
        self.record.premium_amount_paid = premium;
        self
    }

    pub fn build(self) -> ClaimRecord {
        self.record
    }
}

/// `count` claims of one warranty spread over ages, brands and regions
pub fn warranty_records(warranty: &str, count: usize, id_offset: usize) -> Vec<ClaimRecord> {
    let brands = ["SEAT", "FIAT", "OPEL"];
    let regions = [("North", "Alpha"), ("North", "Beta"), ("South", "Gamma")];
    (0..count)
        .map(|i| {
            let (region, province) = regions[i % regions.len()];
            RecordBuilder::new(format!("{}-{}", warranty, id_offset + i), warranty)
                .age(Some(18 + (i as u32 * 7) % 60))
                .gender(if i % 2 == 0 { "M" } else { "F" })
                .brand(brands[i % brands.len()])
                .region(region, province)
                .date(2022 + (i % 2) as i32, 1 + (i % 12) as u32, 1 + (i % 28) as u32)
                .paid(Decimal::from(50 + (i as i64 * 13) % 900))
                .build()
        })
        .collect()
}

/// One CSV data row; `None` cells are written blank
pub type CsvRow<'a> = [Option<&'a str>; 11];

/// A complete, valid CSV row
pub fn csv_row<'a>(
    id: &'a str,
    warranty: &'a str,
    date: &'a str,
    paid: &'a str,
    premium: &'a str,
) -> CsvRow<'a> {
    [
        Some(id),
        Some("45"),
        Some("F"),
        Some(warranty),
        Some(date),
        Some("North"),
        Some("Alpha"),
        Some("SEAT"),
        Some("IBIZA"),
        Some(paid),
        Some(premium),
    ]
}

fn escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Write a claims CSV with the standard header into a temp dir
pub fn create_temp_claims_csv(rows: &[CsvRow]) -> (TempDir, PathBuf) {
    create_temp_csv_with_header(&CLAIM_COLUMNS, rows)
}

/// Write a CSV with an arbitrary header
pub fn create_temp_csv_with_header(header: &[&str], rows: &[CsvRow]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("claims.csv");

    let mut text = header.join(",");
    text.push('\n');
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| c.map(escape).unwrap_or_default()).collect();
        text.push_str(&cells.join(","));
        text.push('\n');
    }
    std::fs::write(&csv_path, text).unwrap();

    (temp_dir, csv_path)
}

/// Write records as a claims CSV (dates in dd/mm/yyyy)
pub fn write_records_csv(records: &[ClaimRecord]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("claims.csv");

    let mut text = CLAIM_COLUMNS.join(",");
    text.push('\n');
    for r in records {
        let fields = [
            r.claim_id.clone(),
            r.policyholder_age.map(|a| a.to_string()).unwrap_or_default(),
            r.policyholder_gender.clone(),
            r.warranty.clone(),
            r.claim_date.format("%d/%m/%Y").to_string(),
            r.claim_region.clone(),
            r.claim_province.clone(),
            r.vehicle_brand.clone(),
            r.vehicle_model.clone(),
            r.claim_amount_paid.to_string(),
            r.premium_amount_paid.map(|p| p.to_string()).unwrap_or_default(),
        ];
        let cells: Vec<String> = fields.iter().map(|f| escape(f)).collect();
        text.push_str(&cells.join(","));
        text.push('\n');
    }
    std::fs::write(&csv_path, text).unwrap();

    (temp_dir, csv_path)
}
