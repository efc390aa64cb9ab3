//! CLI module - argument parsing, prompts and the validate subcommand

pub mod args;
mod prompts;
pub mod validate;

pub use args::{default_output_dir, Cli, Commands};
pub use prompts::*;
