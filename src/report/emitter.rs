//! Report files written under the output directory
//!
//! Layout:
//! - `main_reports/` dataset profile, ingest report, plans, loss indication
//! - `warranty_analysis/<warranty>/` deep-dive tables or basic summary
//! - `tiered_coverage_analysis/` premium and claim distributions
//! - `overall_analysis/` one table per overall grouping

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::tables::{
    fmt_float, loss_table_data, loss_table_text, plan_table_data, segment_table_data,
    summary_text, TableData,
};
use crate::pipeline::{
    AnalysisResults, DatasetProfile, ImputationReport, IngestReport, PlanOutcome, SegmentTable,
    WarrantyAnalysis,
};

pub const MAIN_REPORTS_DIR: &str = "main_reports";
pub const WARRANTY_ANALYSIS_DIR: &str = "warranty_analysis";
pub const TIERED_ANALYSIS_DIR: &str = "tiered_coverage_analysis";
pub const OVERALL_ANALYSIS_DIR: &str = "overall_analysis";

/// Make a warranty name safe for use as a file or directory name.
///
/// Spaces and slashes become underscores and any other character outside
/// `[A-Za-z0-9_-]` is dropped.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .filter_map(|c| match c {
            ' ' | '/' => Some('_'),
            c if c.is_ascii_alphanumeric() || c == '_' || c == '-' => Some(c),
            _ => None,
        })
        .collect();
    if replaced.is_empty() {
        "unnamed".to_string()
    } else {
        replaced
    }
}

/// Writes report files and remembers every path written
#[derive(Debug)]
pub struct ReportEmitter {
    root: PathBuf,
    written: Vec<PathBuf>,
    /// Warranty name -> file name used for its reports
    file_names: HashMap<String, String>,
    used_names: HashSet<String>,
}

impl ReportEmitter {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            written: Vec::new(),
            file_names: HashMap::new(),
            used_names: HashSet::new(),
        }
    }

    /// File-safe name for a warranty, unique within this emitter.
    ///
    /// Warranties that sanitize to the same name get `_2`, `_3`, ... in the
    /// order they are first seen.
    pub fn warranty_file_name(&mut self, warranty: &str) -> String {
        if let Some(name) = self.file_names.get(warranty) {
            return name.clone();
        }
        let base = sanitize_filename(warranty);
        let mut name = base.clone();
        let mut n = 2;
        while self.used_names.contains(&name) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        if name != base {
            log::warn!("warranty '{}' reported as '{}' to avoid a name clash", warranty, name);
        }
        self.used_names.insert(name.clone());
        self.file_names.insert(warranty.to_string(), name.clone());
        name
    }

    /// Remove report directories left by an earlier run into the same root
    pub fn clear_previous_reports(&self) -> Result<()> {
        for dir in [
            MAIN_REPORTS_DIR,
            WARRANTY_ANALYSIS_DIR,
            TIERED_ANALYSIS_DIR,
            OVERALL_ANALYSIS_DIR,
        ] {
            let path = self.root.join(dir);
            if path.is_dir() {
                std::fs::remove_dir_all(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
                log::info!("removed previous reports in {}", path.display());
            }
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files written so far, in write order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }

    fn dir(&self, parts: &[&str]) -> Result<PathBuf> {
        let mut dir = self.root.clone();
        for part in parts {
            dir.push(part);
        }
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        Ok(dir)
    }

    fn write_text(&mut self, dir: &Path, name: &str, content: &str) -> Result<()> {
        let path = dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::debug!("wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }

    /// Write `<stem>.txt` and `<stem>.csv` for a table
    fn write_table(&mut self, dir: &Path, stem: &str, title: &str, data: &TableData) -> Result<()> {
        let text = format!("{}\n\n{}\n", title, data.to_text());
        self.write_text(dir, &format!("{}.txt", stem), &text)?;

        let csv_path = dir.join(format!("{}.csv", stem));
        data.write_csv(&csv_path)?;
        self.written.push(csv_path);
        Ok(())
    }

    fn write_segment_table(&mut self, dir: &Path, title: &str, table: &SegmentTable) -> Result<()> {
        let stem = format!("claims_by_{}", table.title());
        self.write_table(dir, &stem, title, &segment_table_data(table))
    }

    /// Write every report for a run
    pub fn emit_all(
        &mut self,
        results: &AnalysisResults,
        ingest: &IngestReport,
        imputation: &ImputationReport,
    ) -> Result<()> {
        self.emit_main_reports(results, ingest, imputation)?;
        self.emit_warranty_reports(&results.warranties)?;
        self.emit_tiered_reports(&results.warranties)?;
        self.emit_overall_reports(&results.overall)?;
        Ok(())
    }

    pub fn emit_main_reports(
        &mut self,
        results: &AnalysisResults,
        ingest: &IngestReport,
        imputation: &ImputationReport,
    ) -> Result<()> {
        let dir = self.dir(&[MAIN_REPORTS_DIR])?;

        let profile = profile_text(&results.profile, &results.age_bucket_labels);
        self.write_text(&dir, "dataset_profile.txt", &profile)?;
        self.write_text(&dir, "ingest_report.txt", &ingest_text(ingest, imputation))?;
        self.write_table(
            &dir,
            "warranty_plans",
            "ANALYSIS PLAN BY WARRANTY",
            &plan_table_data(&results.warranties),
        )?;

        let loss_stem = "illustrative_loss_indication_by_warranty";
        self.write_text(
            &dir,
            &format!("{}.txt", loss_stem),
            &loss_table_text(&results.loss_indicators),
        )?;
        let csv_path = dir.join(format!("{}.csv", loss_stem));
        loss_table_data(&results.loss_indicators).write_csv(&csv_path)?;
        self.written.push(csv_path);

        Ok(())
    }

    /// Deep-dive tables or a basic summary per warranty
    pub fn emit_warranty_reports(&mut self, warranties: &[WarrantyAnalysis]) -> Result<()> {
        for w in warranties {
            let name = self.warranty_file_name(&w.warranty);
            match &w.outcome {
                PlanOutcome::DeepDive { .. } => {
                    let dir = self.dir(&[WARRANTY_ANALYSIS_DIR, &name])?;
                    for table in w.outcome.deep_dive_tables() {
                        let title = format!(
                            "{} - CLAIMS BY {} ({} claims)",
                            w.warranty,
                            table
                                .dimensions
                                .first()
                                .map(|d| d.column_name())
                                .unwrap_or("SEGMENT"),
                            w.claim_count
                        );
                        self.write_segment_table(&dir, &title, table)?;
                    }
                }
                PlanOutcome::BasicSummary { claims, premiums } => {
                    let dir = self.dir(&[WARRANTY_ANALYSIS_DIR, &name])?;
                    let text = format!(
                        "BASIC STATISTICS - {} ({} claims)\n\n{}\n{}",
                        w.warranty,
                        w.claim_count,
                        summary_text("CLAIM_AMOUNT_PAID", claims.as_ref()),
                        summary_text("PREMIUM_AMOUNT_PAID", premiums.as_ref()),
                    );
                    self.write_text(&dir, "basic_stats_summary.txt", &text)?;
                }
                PlanOutcome::Tiered { .. } => {}
            }
        }
        Ok(())
    }

    /// Combined premium and claim distributions for tiered warranties
    pub fn emit_tiered_reports(&mut self, warranties: &[WarrantyAnalysis]) -> Result<()> {
        let tiered: Vec<&WarrantyAnalysis> = warranties
            .iter()
            .filter(|w| matches!(w.outcome, PlanOutcome::Tiered { .. }))
            .collect();
        if tiered.is_empty() {
            return Ok(());
        }
        let dir = self.dir(&[TIERED_ANALYSIS_DIR])?;

        let mut premium_text = String::from("PREMIUM DISTRIBUTION (TIERED COVERAGES)\n\n");
        let mut claim_text = String::from("CLAIM DISTRIBUTION (TIERED COVERAGES)\n\n");

        for w in &tiered {
            let PlanOutcome::Tiered {
                premiums,
                claims,
                histogram,
            } = &w.outcome
            else {
                continue;
            };

            match premiums {
                Some(p) => premium_text.push_str(&format!(
                    "{}\n  count    {:>14}\n  distinct {:>14}\n  mean     {:>14}\n  min      {:>14}\n  max      {:>14}\n\n",
                    w.warranty,
                    p.summary.count,
                    p.distinct,
                    fmt_float(p.summary.mean),
                    fmt_float(p.summary.min),
                    fmt_float(p.summary.max),
                )),
                None => premium_text.push_str(&format!("{}\n  no recorded premiums\n\n", w.warranty)),
            }

            match claims {
                Some(c) => claim_text.push_str(&format!(
                    "{}\n  count    {:>14}\n  mean     {:>14}\n  median   {:>14}\n  min      {:>14}\n  max      {:>14}\n  std      {:>14}\n\n",
                    w.warranty,
                    c.count,
                    fmt_float(c.mean),
                    fmt_float(c.median),
                    fmt_float(c.min),
                    fmt_float(c.max),
                    c.std.map(fmt_float).unwrap_or_else(|| "-".to_string()),
                )),
                None => claim_text.push_str(&format!("{}\n  no claims\n\n", w.warranty)),
            }

            if let Some(hist) = histogram {
                let mut data = TableData::new(&["BIN_START", "BIN_END", "CLAIM_COUNT"]);
                for bin in &hist.bins {
                    data.push(vec![
                        fmt_float(bin.lower),
                        fmt_float(bin.upper),
                        bin.count.to_string(),
                    ]);
                }
                let name = self.warranty_file_name(&w.warranty);
                let path = dir.join(format!("{}_claim_histogram.csv", name));
                data.write_csv(&path)?;
                self.written.push(path);
            }
        }

        self.write_text(&dir, "premium_distribution.txt", &premium_text)?;
        self.write_text(&dir, "claim_distribution.txt", &claim_text)?;
        Ok(())
    }

    pub fn emit_overall_reports(&mut self, tables: &[SegmentTable]) -> Result<()> {
        let dir = self.dir(&[OVERALL_ANALYSIS_DIR])?;
        for table in tables {
            let title = format!("ALL CLAIMS BY {}", table.title().replace("_by_", " x ").to_uppercase());
            self.write_segment_table(&dir, &title, table)?;
        }
        Ok(())
    }
}

/// Dataset overview written to `dataset_profile.txt`
pub fn profile_text(profile: &DatasetProfile, age_labels: &[String]) -> String {
    let mut out = String::from("DATASET PROFILE\n\n");
    out.push_str(&format!("Records: {}\n", profile.records));
    if let (Some(first), Some(last)) = (profile.first_claim_date, profile.last_claim_date) {
        out.push_str(&format!(
            "Claim dates: {} to {}\n",
            first.format("%d/%m/%Y"),
            last.format("%d/%m/%Y")
        ));
    }
    for (year, count) in &profile.claims_per_year {
        out.push_str(&format!("  {}: {} claims\n", year, count));
    }
    out.push_str(&format!("Age groups: {}\n\n", age_labels.join(", ")));

    out.push_str(&summary_text("POLICYHOLDER_AGE", profile.age.as_ref()));
    out.push('\n');
    out.push_str(&summary_text("CLAIM_AMOUNT_PAID", profile.claim_amount.as_ref()));
    out.push('\n');
    out.push_str(&summary_text("PREMIUM_AMOUNT_PAID", profile.premium_amount.as_ref()));
    out.push('\n');

    let mut data = TableData::new(&["FIELD", "DISTINCT", "MOST_FREQUENT", "COUNT"]);
    for c in &profile.categoricals {
        data.push(vec![
            c.field.clone(),
            c.distinct.to_string(),
            c.most_frequent.clone(),
            c.most_frequent_count.to_string(),
        ]);
    }
    out.push_str(&data.to_text());
    out.push('\n');
    out
}

/// Ingestion counts and imputation results written to `ingest_report.txt`
pub fn ingest_text(ingest: &IngestReport, imputation: &ImputationReport) -> String {
    let mut out = String::from("INGEST REPORT\n\n");
    out.push_str(&format!("Rows read:        {}\n", ingest.rows_read));
    out.push_str(&format!("Rows accepted:    {}\n", ingest.accepted));
    out.push_str(&format!("Rows skipped:     {}\n", ingest.total_skipped()));
    for (kind, count) in &ingest.skipped {
        out.push_str(&format!("  {}: {}\n", kind, count));
    }
    out.push_str(&format!("Missing age:      {}\n", ingest.missing_age));
    out.push_str(&format!("Missing premium:  {}\n", ingest.missing_premium));

    if !ingest.sample_errors.is_empty() {
        out.push_str("\nFirst errors:\n");
        for err in &ingest.sample_errors {
            out.push_str(&format!("  - {}\n", err));
        }
    }

    out.push_str("\nIMPUTATION\n\n");
    let mut data = TableData::new(&["FIELD", "RULE", "FILL_VALUE", "IMPUTED"]);
    for f in &imputation.fields {
        data.push(vec![
            f.field.to_string(),
            f.rule.to_string(),
            f.fill_value.clone(),
            f.imputed.to_string(),
        ]);
    }
    out.push_str(&data.to_text());
    out.push('\n');
    out
}
