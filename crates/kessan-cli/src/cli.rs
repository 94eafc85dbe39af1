//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Kessan - Anticipate the questions your business plan will get
#[derive(Parser)]
#[command(name = "kessan")]
#[command(about = "Business-plan Q&A generator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Benchmark dataset (TOML).
    ///
    /// Defaults to the override file in the data directory when present,
    /// otherwise the embedded dataset.
    #[arg(long, global = true)]
    pub benchmarks: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate anticipated questions and answers for a model
    Generate {
        /// Context JSON file ({ parameters, kpis?, plSummary?, industry? })
        #[arg(short, long)]
        context: PathBuf,

        /// Audience: investor, banker, board, team, partner
        #[arg(short, long, default_value = "investor")]
        target: String,

        /// Detail level: executive, standard, detailed
        #[arg(short, long, default_value = "standard")]
        detail: String,

        /// Answer length: short, medium, long
        #[arg(short, long, default_value = "long")]
        length: String,

        /// Maximum number of questions
        #[arg(short = 'n', long, default_value = "10", allow_hyphen_values = true)]
        count: i64,

        /// Output format: text, json, markdown, csv
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Classify a driver value against an industry benchmark
    Classify {
        /// Industry key or name (e.g. saas)
        #[arg(short, long)]
        industry: String,

        /// Driver: revenue_fy1, growth_rate, cogs_rate, opex_base, opex_growth
        #[arg(short, long)]
        driver: String,

        /// Value to classify (ratios as decimals, e.g. 0.3)
        #[arg(long, allow_hyphen_values = true)]
        value: f64,
    },

    /// Inspect the benchmark dataset
    Benchmarks {
        #[command(subcommand)]
        action: Option<BenchmarksAction>,
    },
}

#[derive(Subcommand)]
pub enum BenchmarksAction {
    /// List industries (default)
    List,

    /// Show the full benchmark for one industry
    Show {
        /// Industry key or name
        industry: String,
    },

    /// Show where the dataset is loaded from and the override location
    Path,
}
