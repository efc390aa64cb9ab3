//! `validate` subcommand: ingest a claims file and report problems

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use crate::pipeline::{analyze_missing_values, ingest, load_claims, ErrorPolicy, IngestReport};
use crate::utils::{create_spinner, finish_with_success, finish_with_warning};

/// Run ingestion only and print the ingest report.
///
/// Returns the report so callers can inspect the counts. Under
/// [`ErrorPolicy::Abort`] the first bad row is returned as an error.
pub fn run_validate(input: &Path, delimiter: u8, policy: ErrorPolicy) -> Result<IngestReport> {
    println!(
        "\n {} Validating claims file",
        style("◆").cyan().bold()
    );
    println!("   Input:  {}", style(input.display()).dim());
    println!("   Policy: {}", style(policy).dim());
    println!();

    let spinner = create_spinner("Reading file...");
    let rows = load_claims(input, delimiter)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let (claims, report) = ingest(rows, policy)?;

    if report.total_skipped() == 0 {
        finish_with_success(&spinner, &format!("{} row(s), all valid", report.rows_read));
    } else {
        finish_with_warning(
            &spinner,
            &format!(
                "{} of {} row(s) rejected",
                report.total_skipped(),
                report.rows_read
            ),
        );
    }

    println!();
    println!("   Accepted:        {}", style(report.accepted).green().bold());
    for (kind, count) in &report.skipped {
        println!("   {:<16} {}", format!("{}:", kind), style(count).red());
    }
    println!("   Missing age:     {}", report.missing_age);
    println!("   Missing premium: {}", report.missing_premium);

    if !report.sample_errors.is_empty() {
        println!("\n   {}", style("First errors:").yellow());
        for err in &report.sample_errors {
            println!("     {} {}", style("•").dim(), err);
        }
    }

    let missing: Vec<_> = analyze_missing_values(&claims)
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .collect();
    if !missing.is_empty() {
        println!("\n   {}", style("Blank categorical values (will be imputed):").yellow());
        for (field, n) in missing {
            println!("     {} {}: {}", style("•").dim(), field, n);
        }
    }
    println!();

    Ok(report)
}
