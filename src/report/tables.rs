//! Text and CSV rendering of analysis tables

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, Table};
use polars::prelude::*;
use rust_decimal::Decimal;

use crate::pipeline::{
    LossIndicatorRow, NumericSummary, SegmentTable, WarrantyAnalysis, LOSS_INDICATOR_CAVEAT,
    LOSS_INDICATOR_COLUMN,
};

/// Header and rows of a table, all cells pre-formatted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Render as a text table; amounts are already rounded
    pub fn to_text(&self) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(self.headers.iter().map(Cell::new));

        for row in &self.rows {
            table.add_row(row.iter().enumerate().map(|(i, value)| {
                // Key columns left, metrics right
                let cell = Cell::new(value);
                if i == 0 || value.parse::<f64>().is_err() {
                    cell
                } else {
                    cell.set_alignment(CellAlignment::Right)
                }
            }));
        }

        table.to_string()
    }

    /// Convert to a DataFrame of string columns
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let values: Vec<&str> = self
                    .rows
                    .iter()
                    .map(|row| row.get(i).map(String::as_str).unwrap_or(""))
                    .collect();
                Column::new(header.as_str().into(), values)
            })
            .collect();

        DataFrame::new(columns).context("Failed to build table DataFrame")
    }

    /// Write as CSV with a header row
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut df = self.to_dataframe()?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)
            .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        Ok(())
    }
}

/// Format an amount with two decimals
pub fn fmt_amount(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

pub fn fmt_float(value: f64) -> String {
    format!("{:.2}", value)
}

/// Segment table as rows: key columns then metrics
pub fn segment_table_data(table: &SegmentTable) -> TableData {
    let mut headers: Vec<&str> = table.dimensions.iter().map(|d| d.column_name()).collect();
    if headers.is_empty() {
        headers.push("SEGMENT");
    }
    headers.extend([
        "CLAIM_COUNT",
        "AVERAGE_CLAIM_AMOUNT",
        "TOTAL_CLAIM_AMOUNT_PAID",
        "MEDIAN_CLAIM_AMOUNT",
    ]);

    let mut data = TableData::new(&headers);
    for segment in &table.segments {
        let mut row = if segment.key.0.is_empty() {
            vec!["All claims".to_string()]
        } else {
            segment.key.labels()
        };
        row.extend([
            segment.metrics.claim_count.to_string(),
            fmt_amount(segment.metrics.average_claim_amount),
            fmt_amount(segment.metrics.total_claim_amount_paid),
            fmt_amount(segment.metrics.median_claim_amount),
        ]);
        data.push(row);
    }
    data
}

pub fn loss_table_data(rows: &[LossIndicatorRow]) -> TableData {
    let mut data = TableData::new(&[
        "WARRANTY",
        "NUMBER_OF_CLAIMS",
        "CLAIMS_WITH_PREMIUM",
        "TOTAL_CLAIM_AMOUNT_PAID",
        "TOTAL_PREMIUM_PAID_BY_CLAIMERS",
        LOSS_INDICATOR_COLUMN,
    ]);
    for row in rows {
        data.push(vec![
            row.warranty.clone(),
            row.number_of_claims.to_string(),
            row.claims_with_premium.to_string(),
            fmt_amount(row.total_claim_amount_paid),
            fmt_amount(row.total_premium_paid_by_claimers),
            row.indicator.to_string(),
        ]);
    }
    data
}

/// Loss table as text with the caveat above it
pub fn loss_table_text(rows: &[LossIndicatorRow]) -> String {
    format!(
        "ILLUSTRATIVE LOSS INDICATION BY WARRANTY\n\n{}\n\n{}\n",
        LOSS_INDICATOR_CAVEAT,
        loss_table_data(rows).to_text()
    )
}

pub fn plan_table_data(warranties: &[WarrantyAnalysis]) -> TableData {
    let mut data = TableData::new(&["WARRANTY", "CLAIM_COUNT", "PLAN", "REASON"]);
    for w in warranties {
        data.push(vec![
            w.warranty.clone(),
            w.claim_count.to_string(),
            w.plan.to_string(),
            w.reason.clone(),
        ]);
    }
    data
}

/// Describe-style block for a numeric summary
pub fn summary_text(title: &str, summary: Option<&NumericSummary>) -> String {
    let Some(s) = summary else {
        return format!("{}\n  no values\n", title);
    };

    let std = s.std.map(fmt_float).unwrap_or_else(|| "-".to_string());
    let lines = [
        ("count", s.count.to_string()),
        ("mean", fmt_float(s.mean)),
        ("std", std),
        ("min", fmt_float(s.min)),
        ("25%", fmt_float(s.q25)),
        ("50%", fmt_float(s.median)),
        ("75%", fmt_float(s.q75)),
        ("max", fmt_float(s.max)),
    ];

    let mut out = format!("{}\n", title);
    for (name, value) in lines {
        out.push_str(&format!("  {:<6} {:>14}\n", name, value));
    }
    out
}
