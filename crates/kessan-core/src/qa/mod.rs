//! Q&A generation
//!
//! Turns a financial model into a ranked list of anticipated questions with
//! drafted answers. The pipeline is:
//!
//! 1. **Catalog** - every rule inspects the model and builds one draft or declines
//! 2. **Ranking** - audience-specific categories are boosted, then stable-sorted
//! 3. **Compression** - answers are cut to the requested length
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kessan_core::qa::{QaEngine, QaSettings};
//!
//! let engine = QaEngine::new()?;
//! let items = engine.generate(&context, &QaSettings::default());
//! ```

pub mod catalog;
pub mod compress;
pub mod engine;
pub mod ranking;
pub mod rules;
pub mod types;

pub use catalog::{default_rules, Rule, RuleContext};
pub use compress::compress;
pub use engine::{generate_qa, QaEngine};
pub use ranking::{boosted_categories, rank, AUDIENCE_BOOST};
pub use types::{AnswerLength, Audience, DetailLevel, QaCategory, QaDraft, QaItem, QaSettings};
