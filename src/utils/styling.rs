//! Terminal styling utilities for the claimlens console output

use console::{style, Emoji};
use std::path::Path;

use crate::pipeline::AnalysisConfig;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SHIELD: Emoji<'_, '_> = Emoji("🛡️  ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
     ██████╗██╗      █████╗ ██╗███╗   ███╗██╗     ███████╗███╗   ██╗███████╗
    ██╔════╝██║     ██╔══██╗██║████╗ ████║██║     ██╔════╝████╗  ██║██╔════╝
    ██║     ██║     ███████║██║██╔████╔██║██║     █████╗  ██╔██╗ ██║███████╗
    ██║     ██║     ██╔══██║██║██║╚██╔╝██║██║     ██╔══╝  ██║╚██╗██║╚════██║
    ╚██████╗███████╗██║  ██║██║██║ ╚═╝ ██║███████╗███████╗██║ ╚████║███████║
     ╚═════╝╚══════╝╚═╝  ╚═╝╚═╝╚═╝     ╚═╝╚══════╝╚══════╝╚═╝  ╚═══╝╚══════╝
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {}",
        style("Segment analysis for vehicle insurance claims").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Width of the configuration card including its borders
const CARD_WIDTH: usize = 60;
const CARD_LABEL_WIDTH: usize = 22;
const CARD_VALUE_WIDTH: usize = CARD_WIDTH - CARD_LABEL_WIDTH - 7;

/// One padded row of the configuration card, closed by the right border
fn card_row_text(icon: &Emoji<'_, '_>, label: &str, value: &str, highlight: bool) -> String {
    let value = format!(
        "{:<width$}",
        truncate_string(value, CARD_VALUE_WIDTH),
        width = CARD_VALUE_WIDTH
    );
    let value = if highlight {
        style(value).yellow()
    } else {
        style(value)
    };
    format!(
        "    │  {}{:<label_width$}{}│",
        icon,
        label,
        value,
        label_width = CARD_LABEL_WIDTH
    )
}

fn card_row(icon: &Emoji<'_, '_>, label: &str, value: &str, highlight: bool) {
    println!("{}", card_row_text(icon, label, value, highlight));
}

/// Print configuration card
pub fn print_config(input: &Path, output: &Path, config: &AnalysisConfig) {
    let line = "─".repeat(CARD_WIDTH - 2);
    let join = |set: &std::collections::BTreeSet<String>| {
        if set.is_empty() {
            "(none)".to_string()
        } else {
            set.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    };

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(CARD_WIDTH - 20)
    );
    println!("    ├{}┤", line);
    card_row(&FOLDER, "Input:", &truncate_path(input, CARD_VALUE_WIDTH), false);
    card_row(&SAVE, "Output:", &truncate_path(output, CARD_VALUE_WIDTH), false);
    println!("    ├{}┤", line);
    card_row(
        &CHART,
        "Deep-dive threshold:",
        &format!("{} claims", config.deep_dive_threshold),
        true,
    );
    card_row(&SHIELD, "Tiered:", &join(&config.tiered_warranties), true);
    card_row(
        &SHIELD,
        "Always deep dive:",
        &join(&config.deep_dive_fixed_warranties),
        true,
    );
    card_row(
        &CHART,
        "Age edges:",
        &format!("{:?}", config.age_bucket_edges),
        true,
    );
    card_row(&WARN, "Bad rows:", &config.error_policy.to_string(), true);
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

pub fn print_warning(message: &str) {
    println!("    {} {}", WARN, style(message).yellow());
}

/// Print the final completion message
pub fn print_completion(output: &Path) {
    println!();
    println!(
        "    {} {} {}",
        ROCKET,
        style("Analysis complete! Reports in").green().bold(),
        style(output.display()).cyan()
    );
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        println!(
            "      {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      {} {}", style(count).yellow().bold(), description);
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

/// Keep the tail of a long string, prefixed with `...`
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(count + 3 - max_len).collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("/very/long/path/to/file.csv", 12), ".../file.csv");
    }

    #[test]
    fn test_card_rows_closed_and_aligned() {
        console::set_colors_enabled(false);
        let short = card_row_text(&CHART, "Age edges:", "[18, 26]", true);
        let long = card_row_text(&CHART, "Deep-dive threshold:", &"x".repeat(80), true);
        let plain = card_row_text(&CHART, "Input:", "claims.csv", false);

        assert!(short.ends_with('│'));
        assert!(long.ends_with('│'));
        assert_eq!(short.chars().count(), long.chars().count());
        assert_eq!(short.chars().count(), plain.chars().count());
    }
}
