//! Interactive prompts using dialoguer

use std::path::Path;

use anyhow::Result;
use dialoguer::Confirm;

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Ask before writing reports into a directory that already exists
pub fn confirm_overwrite(output: &Path) -> Result<bool> {
    let message = format!(
        "Output directory {} already exists. Replace the reports from the previous run?",
        output.display()
    );
    confirm_step(&message)
}
