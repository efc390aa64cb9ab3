//! Dataset loader for delimited claim files

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

use super::error::IngestError;
use super::record::*;

/// Load a delimited file with every column read as text.
///
/// Schema inference is disabled so that typed parsing (dates, amounts, ages)
/// happens in [`RawClaimRow::parse`] with explicit per-row errors.
pub fn load_dataset(path: &Path, delimiter: u8) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if !matches!(extension.as_str(), "csv" | "tsv" | "txt") {
        anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, tsv, txt",
            extension
        );
    }

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_separator(delimiter)
        .with_infer_schema_length(Some(0))
        .finish()
        .with_context(|| format!("Failed to load CSV file: {}", path.display()))?
        .collect()
        .with_context(|| format!("Failed to read CSV file: {}", path.display()))?;

    log::info!(
        "loaded {} row(s) x {} column(s) from {}",
        df.height(),
        df.width(),
        path.display()
    );

    Ok(df)
}

/// Load a claims file into raw rows, checking the header first.
pub fn load_claims(path: &Path, delimiter: u8) -> Result<Vec<RawClaimRow>> {
    let columns = get_column_names(path, delimiter)?;
    resolve_claim_columns(&columns)?;
    let df = load_dataset(path, delimiter)?;
    frame_to_rows(&df)
}

/// Read only the header of a delimited file
pub fn get_column_names(path: &Path, delimiter: u8) -> Result<Vec<String>> {
    let schema = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_separator(delimiter)
        .with_infer_schema_length(Some(0))
        .finish()
        .with_context(|| format!("Failed to load CSV file: {}", path.display()))?
        .collect_schema()
        .with_context(|| format!("Failed to read CSV header: {}", path.display()))?;

    Ok(schema.iter_names().map(|name| name.to_string()).collect())
}

/// Map each claim column to the matching header name (case-insensitive).
///
/// Fails with [`IngestError::MissingColumns`] listing every absent column.
pub fn resolve_claim_columns(columns: &[String]) -> Result<HashMap<&'static str, String>, IngestError> {
    let by_upper: HashMap<String, &String> = columns
        .iter()
        .map(|name| (name.trim().to_uppercase(), name))
        .collect();

    let mut resolved = HashMap::new();
    let mut missing = Vec::new();
    for column in CLAIM_COLUMNS {
        match by_upper.get(column) {
            Some(actual) => {
                resolved.insert(column, (*actual).clone());
            }
            None => missing.push(column.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(IngestError::MissingColumns(missing))
    }
}

/// Convert a text-typed DataFrame into raw claim rows.
pub fn frame_to_rows(df: &DataFrame) -> Result<Vec<RawClaimRow>> {
    let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    let resolved = resolve_claim_columns(&names)?;

    let text_column = |column: &str| -> Result<Vec<Option<String>>> {
        let name = &resolved[column];
        let col = df
            .column(name)
            .with_context(|| format!("Column '{}' not found", name))?
            .cast(&DataType::String)?;
        let values = col.str()?.into_iter().map(clean_cell).collect();
        Ok(values)
    };

    let mut cells: HashMap<&'static str, Vec<Option<String>>> = HashMap::new();
    for column in CLAIM_COLUMNS {
        cells.insert(column, text_column(column)?);
    }

    let mut take = |column: &str, idx: usize| -> Option<String> {
        cells.get_mut(column).and_then(|values| values[idx].take())
    };

    let rows = (0..df.height())
        .map(|idx| RawClaimRow {
            row: idx + 1,
            claim_id: take(CLAIM_ID, idx),
            policyholder_age: take(POLICYHOLDER_AGE, idx),
            policyholder_gender: take(POLICYHOLDER_GENDER, idx),
            warranty: take(WARRANTY, idx),
            claim_date: take(CLAIM_DATE, idx),
            claim_region: take(CLAIM_REGION, idx),
            claim_province: take(CLAIM_PROVINCE, idx),
            vehicle_brand: take(VEHICLE_BRAND, idx),
            vehicle_model: take(VEHICLE_MODEL, idx),
            claim_amount_paid: take(CLAIM_AMOUNT_PAID, idx),
            premium_amount_paid: take(PREMIUM_AMOUNT_PAID, idx),
        })
        .collect();

    Ok(rows)
}
