//! claimlens: Claims Segment Analysis CLI Tool
//!
//! Loads a vehicle insurance claims file, normalizes it, and writes
//! segment breakdowns, per-warranty analyses and an illustrative loss
//! indication to an output directory.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use claimlens::cli::{confirm_overwrite, validate::run_validate, Cli, Commands};
use claimlens::pipeline::{
    impute_missing, ingest, load_claims, run_analysis_with_progress, LOSS_INDICATOR_CAVEAT,
};
use claimlens::report::{
    export_analysis, package_reports, ExportParams, ReportEmitter, RunSummary, EXPORT_FILE_NAME,
};
use claimlens::utils::{
    create_spinner, create_warranty_bar, finish_with_success, finish_with_warning, print_banner,
    print_completion, print_config, print_count, print_info, print_step_header, print_success,
    print_warning,
};

/// File name of the optional report bundle
const BUNDLE_FILE_NAME: &str = "analysis_reports.zip";

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();

    // Handle subcommands
    if let Some(command) = &cli.command {
        return match command {
            Commands::Validate {
                input,
                delimiter,
                error_policy,
            } => run_validate(input, *delimiter, *error_policy).map(|_| ()),
        };
    }

    let input = cli.input().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Use -i/--input to specify a file.")
    })?;
    let output_dir = cli
        .output_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not derive an output directory"))?;

    // Configuration is validated before any data is read
    let config = cli.analysis_config().context("Invalid configuration")?;

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(input, &output_dir, &config);

    if output_dir.exists() && !cli.no_confirm && !confirm_overwrite(&output_dir)? {
        println!("Cancelled by user.");
        return Ok(());
    }

    let run_start = Instant::now();

    // Step 1: Load dataset
    print_step_header(1, "Load Claims");
    let spinner = create_spinner("Reading claims file...");
    let rows = load_claims(input, cli.delimiter)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    finish_with_success(&spinner, &format!("Read {} row(s)", rows.len()));

    // Step 2: Parse and normalize
    print_step_header(2, "Parse & Normalize");
    let (claims, ingest_report) = ingest(rows, config.error_policy)?;
    if ingest_report.total_skipped() == 0 {
        print_success("All rows parsed");
    } else {
        print_count(
            "row(s) skipped",
            ingest_report.total_skipped(),
            Some(&format!("of {}", ingest_report.rows_read)),
        );
        for (kind, count) in &ingest_report.skipped {
            println!("        {} {}: {}", style("•").dim(), kind, count);
        }
    }
    if ingest_report.missing_premium > 0 {
        print_info(&format!(
            "{} claim(s) without a recorded premium",
            ingest_report.missing_premium
        ));
    }
    if claims.is_empty() {
        anyhow::bail!("No valid claim rows in {}", input.display());
    }

    let (records, imputation) = impute_missing(claims, &config);
    for field in imputation.fields.iter().filter(|f| f.imputed > 0) {
        print_count(
            &format!("missing {} value(s) filled", field.field),
            field.imputed,
            Some(&format!("with '{}' ({})", field.fill_value, field.rule)),
        );
    }
    print_success(&format!("{} record(s) ready", records.len()));

    // Step 3: Analysis
    print_step_header(3, "Segment Analysis");
    let bar = create_warranty_bar("Analyzing");
    let results = run_analysis_with_progress(&records, &config, Some(&bar))?;
    finish_with_success(
        &bar,
        &format!("Analyzed {} warranties", results.warranties.len()),
    );

    for (plan, count) in results.plan_counts() {
        print_count(&format!("warranty(ies): {}", plan), count, None);
    }

    println!();
    println!("    {}", style("Illustrative loss indication (top 5)").white().bold());
    for row in results.loss_indicators.iter().take(5) {
        println!(
            "      {:<32} {:>10}",
            row.warranty,
            match row.indicator.percent() {
                Some(_) => format!("{}%", row.indicator),
                None => row.indicator.to_string(),
            }
        );
    }
    println!("    {}", style(LOSS_INDICATOR_CAVEAT).dim());

    // Step 4: Reports
    print_step_header(4, "Write Reports");
    let spinner = create_spinner("Writing reports...");
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut emitter = ReportEmitter::new(&output_dir);
    emitter.clear_previous_reports()?;
    let stale_bundle = output_dir.join(BUNDLE_FILE_NAME);
    if !cli.bundle && stale_bundle.is_file() {
        std::fs::remove_file(&stale_bundle)
            .with_context(|| format!("Failed to remove {}", stale_bundle.display()))?;
    }
    emitter.emit_all(&results, &ingest_report, &imputation)?;
    let mut written = emitter.into_written();

    let export_path = output_dir.join(EXPORT_FILE_NAME);
    let input_name = input.display().to_string();
    export_analysis(
        &results,
        &ingest_report,
        &imputation,
        &export_path,
        &ExportParams {
            input_file: &input_name,
            config: &config,
        },
    )?;
    written.push(export_path);

    if cli.bundle {
        let zip_path = output_dir.join(BUNDLE_FILE_NAME);
        match package_reports(&output_dir, &written, &zip_path) {
            Ok(()) => written.push(zip_path),
            Err(e) => {
                finish_with_warning(&spinner, "Reports written, bundle failed");
                print_warning(&format!("Could not create {}: {:#}", BUNDLE_FILE_NAME, e));
            }
        }
    }
    if !spinner.is_finished() {
        finish_with_success(
            &spinner,
            &format!("Wrote {} file(s) to {}", written.len(), output_dir.display()),
        );
    }

    let mut summary = RunSummary::new(&ingest_report, &imputation, &results);
    summary.set_files_written(written.len());
    summary.set_elapsed(run_start.elapsed());
    summary.display();

    print_completion(&output_dir);

    Ok(())
}
