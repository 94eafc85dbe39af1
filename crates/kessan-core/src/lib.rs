//! Kessan Core Library
//!
//! Anticipated-question generation for business-plan financial models:
//! - Q&A engine with a rule catalog covering eight question categories
//! - Industry benchmark dataset and deviation classifier
//! - Derived metrics over 5-year P&L series (crossover, margins, CAGR)
//! - Yen/percent formatting for Japanese answer text
//! - Deck export to JSON, Markdown and CSV

pub mod benchmark;
pub mod derived;
pub mod error;
pub mod export;
pub mod format;
pub mod model;
pub mod qa;

/// Shared fixtures for unit and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use benchmark::{
    BenchmarkCatalog, BenchmarkRange, Deviation, Driver, IndustryBenchmark,
};
pub use error::{Error, Result};
pub use export::{export_deck, ExportFormat, QaDeck};
pub use model::{KpiSet, ModelParameters, PlSeries, QaContext};
pub use qa::{
    generate_qa, AnswerLength, Audience, DetailLevel, QaCategory, QaEngine, QaItem, QaSettings,
};
