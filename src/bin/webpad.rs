//! webpad CLI Binary
//!
//! Command-line interface for projects stored by the webpad editor.

use anyhow::Context;
use clap::Parser;
use std::process;
use webpad::logging::init_logging;
use webpad::tooling::cli::{load_config, Cli, CliContext};

fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = load_config(cli).context("Failed to load configuration")?;
    init_logging(Some(&cli.logging_config(&config.logging)))
        .context("Failed to initialize logging")?;

    let context = CliContext::new(config).context("Error opening project store")?;
    Ok(context.execute(&cli.command)?)
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
