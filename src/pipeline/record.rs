//! Claim record types and typed field parsing
//!
//! A CSV row goes through three shapes: [`RawClaimRow`] (text cells, possibly
//! blank), [`ParsedClaim`] (typed, categoricals still optional) and finally
//! [`ClaimRecord`] (categoricals imputed, read-only for the rest of the run).

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::RowError;

/// Date format used by the claim_date column
pub const CLAIM_DATE_FORMAT: &str = "%d/%m/%Y";

/// Largest accepted monetary amount (10^15).
///
/// With at most [`MAX_AMOUNT_DECIMALS`] decimal places, claim and premium
/// sums and the loss percentage stay inside the `Decimal` range for any
/// dataset that fits in memory.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Most decimal places accepted in a monetary amount
pub const MAX_AMOUNT_DECIMALS: u32 = 4;

/// Header names of the eleven claim columns, in canonical order
pub const CLAIM_ID: &str = "CLAIM_ID";
pub const POLICYHOLDER_AGE: &str = "POLICYHOLDER_AGE";
pub const POLICYHOLDER_GENDER: &str = "POLICYHOLDER_GENDER";
pub const WARRANTY: &str = "WARRANTY";
pub const CLAIM_DATE: &str = "CLAIM_DATE";
pub const CLAIM_REGION: &str = "CLAIM_REGION";
pub const CLAIM_PROVINCE: &str = "CLAIM_PROVINCE";
pub const VEHICLE_BRAND: &str = "VEHICLE_BRAND";
pub const VEHICLE_MODEL: &str = "VEHICLE_MODEL";
pub const CLAIM_AMOUNT_PAID: &str = "CLAIM_AMOUNT_PAID";
pub const PREMIUM_AMOUNT_PAID: &str = "PREMIUM_AMOUNT_PAID";

pub const CLAIM_COLUMNS: [&str; 11] = [
    CLAIM_ID,
    POLICYHOLDER_AGE,
    POLICYHOLDER_GENDER,
    WARRANTY,
    CLAIM_DATE,
    CLAIM_REGION,
    CLAIM_PROVINCE,
    VEHICLE_BRAND,
    VEHICLE_MODEL,
    CLAIM_AMOUNT_PAID,
    PREMIUM_AMOUNT_PAID,
];

/// Categorical fields that may be blank in the input and are imputed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    PolicyholderGender,
    ClaimRegion,
    ClaimProvince,
    VehicleBrand,
    VehicleModel,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 5] = [
        CategoricalField::PolicyholderGender,
        CategoricalField::ClaimRegion,
        CategoricalField::ClaimProvince,
        CategoricalField::VehicleBrand,
        CategoricalField::VehicleModel,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            CategoricalField::PolicyholderGender => POLICYHOLDER_GENDER,
            CategoricalField::ClaimRegion => CLAIM_REGION,
            CategoricalField::ClaimProvince => CLAIM_PROVINCE,
            CategoricalField::VehicleBrand => VEHICLE_BRAND,
            CategoricalField::VehicleModel => VEHICLE_MODEL,
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name().to_lowercase())
    }
}

/// One data row as text cells. Blank cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawClaimRow {
    /// 1-based data row number
    pub row: usize,
    pub claim_id: Option<String>,
    pub policyholder_age: Option<String>,
    pub policyholder_gender: Option<String>,
    pub warranty: Option<String>,
    pub claim_date: Option<String>,
    pub claim_region: Option<String>,
    pub claim_province: Option<String>,
    pub vehicle_brand: Option<String>,
    pub vehicle_model: Option<String>,
    pub claim_amount_paid: Option<String>,
    pub premium_amount_paid: Option<String>,
}

/// Categorical values of a row before imputation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCategoricals {
    pub policyholder_gender: Option<String>,
    pub claim_region: Option<String>,
    pub claim_province: Option<String>,
    pub vehicle_brand: Option<String>,
    pub vehicle_model: Option<String>,
}

impl RawCategoricals {
    pub fn get(&self, field: CategoricalField) -> Option<&str> {
        match field {
            CategoricalField::PolicyholderGender => self.policyholder_gender.as_deref(),
            CategoricalField::ClaimRegion => self.claim_region.as_deref(),
            CategoricalField::ClaimProvince => self.claim_province.as_deref(),
            CategoricalField::VehicleBrand => self.vehicle_brand.as_deref(),
            CategoricalField::VehicleModel => self.vehicle_model.as_deref(),
        }
    }
}

/// A row with every typed field parsed; categoricals not yet imputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedClaim {
    pub claim_id: String,
    pub policyholder_age: Option<u32>,
    pub warranty: String,
    pub claim_date: NaiveDate,
    pub claim_amount_paid: Decimal,
    pub premium_amount_paid: Option<Decimal>,
    pub categoricals: RawCategoricals,
}

/// A normalized claim. Every categorical is filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimRecord {
    pub claim_id: String,
    pub policyholder_age: Option<u32>,
    pub policyholder_gender: String,
    pub warranty: String,
    pub claim_date: NaiveDate,
    pub claim_region: String,
    pub claim_province: String,
    pub vehicle_brand: String,
    pub vehicle_model: String,
    pub claim_amount_paid: Decimal,
    /// Annual premium; `None` when not recorded for this claimant
    pub premium_amount_paid: Option<Decimal>,
}

impl ClaimRecord {
    pub fn categorical(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::PolicyholderGender => &self.policyholder_gender,
            CategoricalField::ClaimRegion => &self.claim_region,
            CategoricalField::ClaimProvince => &self.claim_province,
            CategoricalField::VehicleBrand => &self.vehicle_brand,
            CategoricalField::VehicleModel => &self.vehicle_model,
        }
    }
}

impl RawClaimRow {
    /// Parse the typed fields of this row.
    ///
    /// Blank required fields are schema errors; present but malformed values
    /// are data-format errors carrying the claim id.
    pub fn parse(&self) -> Result<ParsedClaim, RowError> {
        let claim_id = self.required(&self.claim_id, "claim_id")?;
        let warranty = self.required(&self.warranty, "warranty")?;
        let date_text = self.required(&self.claim_date, "claim_date")?;
        let amount_text = self.required(&self.claim_amount_paid, "claim_amount_paid")?;

        let claim_date = parse_claim_date(&date_text).ok_or_else(|| RowError::InvalidDate {
            claim_id: claim_id.clone(),
            value: date_text.clone(),
        })?;

        let claim_amount_paid = parse_amount(&amount_text).map_err(|reason| RowError::InvalidNumber {
            claim_id: claim_id.clone(),
            field: "claim_amount_paid",
            value: amount_text.clone(),
            reason,
        })?;

        let premium_amount_paid = match &self.premium_amount_paid {
            Some(text) => Some(parse_amount(text).map_err(|reason| RowError::InvalidNumber {
                claim_id: claim_id.clone(),
                field: "premium_amount_paid",
                value: text.clone(),
                reason,
            })?),
            None => None,
        };

        let policyholder_age = match &self.policyholder_age {
            Some(text) => Some(parse_age(text).map_err(|reason| RowError::InvalidNumber {
                claim_id: claim_id.clone(),
                field: "policyholder_age",
                value: text.clone(),
                reason,
            })?),
            None => None,
        };

        Ok(ParsedClaim {
            claim_id,
            policyholder_age,
            warranty,
            claim_date,
            claim_amount_paid,
            premium_amount_paid,
            categoricals: RawCategoricals {
                policyholder_gender: self.policyholder_gender.clone(),
                claim_region: self.claim_region.clone(),
                claim_province: self.claim_province.clone(),
                vehicle_brand: self.vehicle_brand.clone(),
                vehicle_model: self.vehicle_model.clone(),
            },
        })
    }

    fn required(&self, value: &Option<String>, field: &'static str) -> Result<String, RowError> {
        value
            .clone()
            .ok_or(RowError::MissingField { row: self.row, field })
    }
}

/// Normalize a text cell: trim whitespace, treat blank as missing.
pub fn clean_cell(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse a `dd/mm/yyyy` claim date. Returns `None` for anything that is not a
/// valid calendar date in that format.
pub fn parse_claim_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), CLAIM_DATE_FORMAT).ok()
}

/// Parse a non-negative monetary amount as an exact decimal.
pub fn parse_amount(text: &str) -> Result<Decimal, &'static str> {
    let text = text.trim();
    let value = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| "not a number")?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err("must be non-negative");
    }
    if value > MAX_AMOUNT {
        return Err("exceeds the maximum amount of 1000000000000000");
    }
    if value.normalize().scale() > MAX_AMOUNT_DECIMALS {
        return Err("more than 4 decimal places");
    }
    Ok(value)
}

/// Parse a policyholder age. Integral floats such as `"45.0"` are accepted
/// because spreadsheet exports often write ages that way.
pub fn parse_age(text: &str) -> Result<u32, &'static str> {
    let text = text.trim();
    if let Ok(age) = text.parse::<i64>() {
        return u32::try_from(age).map_err(|_| "must be a non-negative integer");
    }

    let value: f64 = text.parse().map_err(|_| "not a number")?;
    if !value.is_finite() || value.fract() != 0.0 {
        return Err("must be a whole number");
    }
    if value < 0.0 || value > u32::MAX as f64 {
        return Err("must be a non-negative integer");
    }
    Ok(value as u32)
}
