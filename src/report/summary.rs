//! Run summary shown at the end of an analysis

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{AnalysisPlan, AnalysisResults, ImputationReport, IngestReport, LossIndicator};

/// Counts collected over a run for the closing summary
#[derive(Debug, Default)]
pub struct RunSummary {
    pub rows_read: usize,
    pub records: usize,
    pub skipped: usize,
    pub imputed: usize,
    pub warranties: usize,
    pub deep_dive: usize,
    pub tiered: usize,
    pub basic: usize,
    pub overall_tables: usize,
    pub files_written: usize,
    /// Warranty with the highest loss indicator, if any is applicable
    pub top_loss: Option<(String, String)>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn new(ingest: &IngestReport, imputation: &ImputationReport, results: &AnalysisResults) -> Self {
        let plan_count = |plan: AnalysisPlan| results.warranties.iter().filter(|w| w.plan == plan).count();
        let top_loss = results
            .loss_indicators
            .first()
            .filter(|row| row.indicator != LossIndicator::NotApplicable)
            .map(|row| (row.warranty.clone(), format!("{}%", row.indicator)));

        Self {
            rows_read: ingest.rows_read,
            records: ingest.accepted,
            skipped: ingest.total_skipped(),
            imputed: imputation.total_imputed(),
            warranties: results.warranties.len(),
            deep_dive: plan_count(AnalysisPlan::DeepDive),
            tiered: plan_count(AnalysisPlan::Tiered),
            basic: plan_count(AnalysisPlan::BasicSummary),
            overall_tables: results.overall.len(),
            ..Default::default()
        }
        .with_top_loss(top_loss)
    }

    fn with_top_loss(mut self, top_loss: Option<(String, String)>) -> Self {
        self.top_loss = top_loss;
        self
    }

    pub fn set_files_written(&mut self, files: usize) {
        self.files_written = files;
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("📁 Rows Read"), Cell::new(self.rows_read)]);
        table.add_row(vec![
            Cell::new("🗑️  Rows Skipped"),
            Cell::new(self.skipped).fg(if self.skipped == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);
        table.add_row(vec![
            Cell::new("✅ Records Analyzed"),
            Cell::new(self.records)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("🩹 Values Imputed"),
            Cell::new(self.imputed).fg(if self.imputed == 0 {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);
        table.add_row(vec![Cell::new("🛡️  Warranties"), Cell::new(self.warranties)]);
        table.add_row(vec![
            Cell::new("   Deep dive / Tiered / Basic"),
            Cell::new(format!("{} / {} / {}", self.deep_dive, self.tiered, self.basic)),
        ]);
        table.add_row(vec![Cell::new("📊 Overall Tables"), Cell::new(self.overall_tables)]);

        if let Some((warranty, pct)) = &self.top_loss {
            table.add_row(vec![
                Cell::new("📈 Highest Claimant Payout/Premium"),
                Cell::new(format!("{} ({})", warranty, pct)).fg(Color::Cyan),
            ]);
        }

        table.add_row(vec![Cell::new("📝 Files Written"), Cell::new(self.files_written)]);
        table.add_row(vec![
            Cell::new("⏱️  Elapsed"),
            Cell::new(format!("{:.2}s", self.elapsed.as_secs_f64())),
        ]);

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("ANALYSIS SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        // Indent the table
        for line in self.to_table().to_string().lines() {
            println!("    {}", line);
        }
    }
}
