//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `benchmarks` - Benchmark dataset inspection (list, show, path)
//! - `classify` - Single driver classification
//! - `generate` - Q&A generation and export

pub mod benchmarks;
pub mod classify;
pub mod generate;

use std::path::Path;

use anyhow::{Context, Result};
use kessan_core::BenchmarkCatalog;

// Re-export command functions for main.rs
pub use benchmarks::*;
pub use classify::*;
pub use generate::*;

/// Load the benchmark dataset from an explicit path, or the default location
pub fn load_benchmarks(path: Option<&Path>) -> Result<BenchmarkCatalog> {
    match path {
        Some(path) => BenchmarkCatalog::from_path(path)
            .with_context(|| format!("Failed to load benchmarks: {}", path.display())),
        None => BenchmarkCatalog::load().context("Failed to load benchmark dataset"),
    }
}

/// Truncate a string to a maximum number of characters, adding "…" if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
