//! Agenda command-line entry point.
//!
//! # Responsibility
//! - Provide a health probe for `agenda_core` linkage.
//! - Run the per-person activity merge against a database file.

use clap::Parser;

mod cli;
mod commands;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    commands::run_command(cli)
}
