//! Missing value analysis and categorical imputation

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::config::{AnalysisConfig, ImputationRule, UNKNOWN};
use super::record::{CategoricalField, ClaimRecord, ParsedClaim};

/// How one categorical field was filled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldImputation {
    pub field: CategoricalField,
    pub rule: ImputationRule,
    /// Value written into blank cells
    pub fill_value: String,
    /// Number of records that received the fill value
    pub imputed: usize,
}

/// Per-field imputation results, in [`CategoricalField::ALL`] order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImputationReport {
    pub fields: Vec<FieldImputation>,
}

impl ImputationReport {
    pub fn total_imputed(&self) -> usize {
        self.fields.iter().map(|f| f.imputed).sum()
    }

    pub fn get(&self, field: CategoricalField) -> Option<&FieldImputation> {
        self.fields.iter().find(|f| f.field == field)
    }
}

/// Count missing values per categorical field.
///
/// Returns `(field, missing_count)` pairs sorted by count descending.
pub fn analyze_missing_values(claims: &[ParsedClaim]) -> Vec<(CategoricalField, usize)> {
    let mut counts: Vec<(CategoricalField, usize)> = CategoricalField::ALL
        .iter()
        .map(|&field| {
            let missing = claims
                .iter()
                .filter(|c| c.categoricals.get(field).is_none())
                .count();
            (field, missing)
        })
        .collect();

    // Stable sort keeps field order for equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Most frequent non-missing value of a field.
///
/// Ties resolve to the lexicographically smallest value. `None` when the
/// field is blank in every record.
pub fn field_mode(claims: &[ParsedClaim], field: CategoricalField) -> Option<String> {
    let mut frequencies: HashMap<&str, usize> = HashMap::new();
    for claim in claims {
        if let Some(value) = claim.categoricals.get(field) {
            *frequencies.entry(value).or_insert(0) += 1;
        }
    }

    frequencies
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(value, _)| value.to_string())
}

/// Resolve the fill value for every categorical field.
///
/// Each field's value depends only on that field's own distribution.
pub fn resolve_fill_values(
    claims: &[ParsedClaim],
    config: &AnalysisConfig,
) -> BTreeMap<CategoricalField, (ImputationRule, String)> {
    CategoricalField::ALL
        .iter()
        .map(|&field| {
            let rule = config.imputation_rule(field);
            let fill = match &rule {
                ImputationRule::Constant(value) => value.clone(),
                ImputationRule::Mode => {
                    field_mode(claims, field).unwrap_or_else(|| UNKNOWN.to_string())
                }
            };
            (field, (rule, fill))
        })
        .collect()
}

/// Fill blank categoricals and produce normalized claim records.
pub fn impute_missing(
    claims: Vec<ParsedClaim>,
    config: &AnalysisConfig,
) -> (Vec<ClaimRecord>, ImputationReport) {
    let fills = resolve_fill_values(&claims, config);
    let mut imputed: BTreeMap<CategoricalField, usize> = BTreeMap::new();

    let fill = |claim: &ParsedClaim, field: CategoricalField, counter: &mut BTreeMap<CategoricalField, usize>| {
        match claim.categoricals.get(field) {
            Some(value) => value.to_string(),
            None => {
                *counter.entry(field).or_insert(0) += 1;
                fills[&field].1.clone()
            }
        }
    };

    let records: Vec<ClaimRecord> = claims
        .iter()
        .map(|claim| ClaimRecord {
            claim_id: claim.claim_id.clone(),
            policyholder_age: claim.policyholder_age,
            policyholder_gender: fill(claim, CategoricalField::PolicyholderGender, &mut imputed),
            warranty: claim.warranty.clone(),
            claim_date: claim.claim_date,
            claim_region: fill(claim, CategoricalField::ClaimRegion, &mut imputed),
            claim_province: fill(claim, CategoricalField::ClaimProvince, &mut imputed),
            vehicle_brand: fill(claim, CategoricalField::VehicleBrand, &mut imputed),
            vehicle_model: fill(claim, CategoricalField::VehicleModel, &mut imputed),
            claim_amount_paid: claim.claim_amount_paid,
            premium_amount_paid: claim.premium_amount_paid,
        })
        .collect();

    let report = ImputationReport {
        fields: fills
            .into_iter()
            .map(|(field, (rule, fill_value))| {
                let count = imputed.get(&field).copied().unwrap_or(0);
                if count > 0 {
                    log::info!("imputed {} missing {} value(s) with '{}' ({})", count, field, fill_value, rule);
                }
                FieldImputation {
                    field,
                    rule,
                    fill_value,
                    imputed: count,
                }
            })
            .collect(),
    };

    (records, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::record::RawCategoricals;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn claim(id: &str, gender: Option<&str>, brand: Option<&str>) -> ParsedClaim {
        ParsedClaim {
            claim_id: id.to_string(),
            policyholder_age: Some(40),
            warranty: "THEFT".to_string(),
            claim_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            claim_amount_paid: Decimal::from(100),
            premium_amount_paid: Some(Decimal::from(400)),
            categoricals: RawCategoricals {
                policyholder_gender: gender.map(str::to_string),
                claim_region: Some("North".to_string()),
                claim_province: Some("Alpha".to_string()),
                vehicle_brand: brand.map(str::to_string),
                vehicle_model: Some("M1".to_string()),
            },
        }
    }

    #[test]
    fn test_mode_tie_breaks_to_smallest_value() {
        let claims = vec![
            claim("1", Some("M"), None),
            claim("2", Some("F"), None),
            claim("3", None, None),
        ];
        assert_eq!(field_mode(&claims, CategoricalField::PolicyholderGender), Some("F".to_string()));
    }

    #[test]
    fn test_mode_of_all_missing_field_is_none() {
        let claims = vec![claim("1", Some("M"), None), claim("2", Some("M"), None)];
        assert_eq!(field_mode(&claims, CategoricalField::VehicleBrand), None);
    }

    #[test]
    fn test_impute_uses_default_rules() {
        let claims = vec![
            claim("1", Some("M"), Some("SEAT")),
            claim("2", Some("M"), None),
            claim("3", Some("F"), Some("SEAT")),
            claim("4", None, Some("FIAT")),
        ];

        let (records, report) = impute_missing(claims, &AnalysisConfig::default());

        // Gender uses mode ("M"), brand uses the "Unknown" sentinel
        assert_eq!(records[3].policyholder_gender, "M");
        assert_eq!(records[1].vehicle_brand, "Unknown");
        assert_eq!(report.get(CategoricalField::PolicyholderGender).unwrap().imputed, 1);
        assert_eq!(report.get(CategoricalField::VehicleBrand).unwrap().imputed, 1);
        assert_eq!(report.get(CategoricalField::ClaimRegion).unwrap().imputed, 0);
        assert_eq!(report.total_imputed(), 2);
    }

    #[test]
    fn test_missing_counts_sorted_descending() {
        let claims = vec![
            claim("1", None, None),
            claim("2", Some("F"), None),
        ];
        let counts = analyze_missing_values(&claims);
        assert_eq!(counts[0], (CategoricalField::VehicleBrand, 2));
        assert_eq!(counts[1], (CategoricalField::PolicyholderGender, 1));
        assert!(counts[2..].iter().all(|(_, n)| *n == 0));
    }
}
