//! Kessan CLI - Business-plan Q&A generator
//!
//! Usage:
//!   kessan generate --context model.json     Generate anticipated Q&A
//!   kessan classify -i saas -d growth_rate --value 0.3
//!   kessan benchmarks show saas              Inspect an industry benchmark

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let catalog = commands::load_benchmarks(cli.benchmarks.as_deref())?;

    match cli.command {
        Commands::Generate {
            context,
            target,
            detail,
            length,
            count,
            format,
            output,
        } => {
            let settings = commands::parse_settings(&target, &detail, &length, count)?;
            commands::cmd_generate(catalog, &context, settings, &format, output.as_deref())
        }
        Commands::Classify {
            industry,
            driver,
            value,
        } => commands::cmd_classify(&catalog, &industry, &driver, value),
        Commands::Benchmarks { action } => match action {
            None | Some(BenchmarksAction::List) => commands::cmd_benchmarks_list(&catalog),
            Some(BenchmarksAction::Show { industry }) => {
                commands::cmd_benchmarks_show(&catalog, &industry)
            }
            Some(BenchmarksAction::Path) => commands::cmd_benchmarks_path(&catalog),
        },
    }
}
