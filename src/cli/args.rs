//! Command-line argument definitions using clap

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::pipeline::{AnalysisConfig, ConfigError, ErrorPolicy};

/// claimlens - Segment analysis of vehicle insurance claims
#[derive(Parser, Debug)]
#[command(name = "claimlens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input claims file (delimited text with a header row)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory for reports.
    /// Defaults to the input directory with an '_analysis' suffix (e.g., claims.csv → claims_analysis/).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON config file. Flags given on the command line override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum claim count for a warranty to get a deep-dive breakdown
    #[arg(long, value_parser = validate_threshold)]
    pub deep_dive_threshold: Option<usize>,

    /// Warranty that always gets the tiered coverage analysis (repeatable).
    /// Replaces the default set when given.
    #[arg(long = "tiered-warranty")]
    pub tiered_warranties: Vec<String>,

    /// Warranty that always gets a deep dive regardless of claim count (repeatable).
    /// Replaces the default set when given.
    #[arg(long = "deep-dive-warranty")]
    pub deep_dive_warranties: Vec<String>,

    /// Lower edges of the age buckets (comma-separated, strictly increasing)
    #[arg(long, value_delimiter = ',')]
    pub age_edges: Vec<u32>,

    /// What to do with rows that fail parsing: "skip" (count and continue) or "abort"
    #[arg(long)]
    pub error_policy: Option<ErrorPolicy>,

    /// Field delimiter of the input file
    #[arg(long, default_value = ",", value_parser = validate_delimiter)]
    pub delimiter: u8,

    /// Number of bins in claim amount histograms
    #[arg(long, value_parser = validate_histogram_bins)]
    pub histogram_bins: Option<usize>,

    /// Also bundle every report into analysis_reports.zip
    #[arg(long, default_value = "false")]
    pub bundle: bool,

    /// Skip interactive confirmation prompts
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a claims file and print the ingest report without running the analysis
    Validate {
        /// Input claims file
        input: PathBuf,

        /// Field delimiter of the input file
        #[arg(long, default_value = ",", value_parser = validate_delimiter)]
        delimiter: u8,

        /// What to do with rows that fail parsing: "skip" or "abort"
        #[arg(long, default_value = "skip")]
        error_policy: ErrorPolicy,
    },
}

impl Cli {
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }

    /// Get the output directory, deriving from input if not explicitly provided.
    pub fn output_dir(&self) -> Option<PathBuf> {
        let input = self.input.as_ref()?;
        Some(self.output.clone().unwrap_or_else(|| default_output_dir(input)))
    }

    /// Build the effective configuration: defaults, then the config file,
    /// then command-line flags. The result is validated.
    pub fn analysis_config(&self) -> Result<AnalysisConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(threshold) = self.deep_dive_threshold {
            config.deep_dive_threshold = threshold;
        }
        if !self.tiered_warranties.is_empty() {
            config.tiered_warranties = self.tiered_warranties.iter().cloned().collect();
        }
        if !self.deep_dive_warranties.is_empty() {
            config.deep_dive_fixed_warranties = self.deep_dive_warranties.iter().cloned().collect();
        }
        if !self.age_edges.is_empty() {
            config.age_bucket_edges = self.age_edges.clone();
        }
        if let Some(policy) = self.error_policy {
            config.error_policy = policy;
        }
        if let Some(bins) = self.histogram_bins {
            config.histogram_bins = bins;
        }

        config.validate()?;
        Ok(config)
    }

    /// Log filter implied by `-v` flags
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

/// `<input dir>/<stem>_analysis`
pub fn default_output_dir(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("claims");
    parent.join(format!("{}_analysis", stem))
}

/// Validator for deep_dive_threshold
fn validate_threshold(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid non-negative integer", s))?;

    if value == 0 {
        Err("deep_dive_threshold must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

/// Validator for histogram_bins
fn validate_histogram_bins(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid non-negative integer", s))?;

    if value == 0 {
        Err("histogram_bins must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

/// Validator for the delimiter: a single ASCII character, or `\t` / `tab`
fn validate_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" => return Ok(b'\t'),
        _ => {}
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(format!(
            "delimiter must be a single ASCII character, got '{}'",
            s
        )),
    }
}
