//! Q&A engine - runs the rule catalog and shapes the result

use crate::benchmark::BenchmarkCatalog;
use crate::model::QaContext;
use crate::Result;

use super::catalog::{default_rules, Rule, RuleContext};
use super::compress::compress;
use super::ranking::rank;
use super::types::{QaCategory, QaDraft, QaItem, QaSettings};

/// The Q&A generator: a benchmark catalog plus an ordered set of rules
#[derive(Debug, Clone)]
pub struct QaEngine {
    benchmarks: BenchmarkCatalog,
    rules: Vec<Rule>,
}

impl QaEngine {
    /// Create an engine with the embedded benchmarks and built-in rules
    pub fn new() -> Result<Self> {
        Ok(Self::with_benchmarks(BenchmarkCatalog::builtin()?))
    }

    /// Create an engine over a specific benchmark catalog
    pub fn with_benchmarks(benchmarks: BenchmarkCatalog) -> Self {
        Self {
            benchmarks,
            rules: default_rules(),
        }
    }

    /// Register an additional rule.
    ///
    /// Rules are generated in category order, so a registered rule lands
    /// after the built-in rules of its own category.
    pub fn register(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn benchmarks(&self) -> &BenchmarkCatalog {
        &self.benchmarks
    }

    /// Generate, rank and compress Q&A items for one model.
    ///
    /// Never fails: a rule that errors is logged and treated as having
    /// produced nothing. Returns at most `settings.count` items.
    pub fn generate(&self, context: &QaContext, settings: &QaSettings) -> Vec<QaItem> {
        if settings.count <= 0 {
            return Vec::new();
        }

        let benchmark = self.benchmarks.resolve(context.industry.as_deref());
        let ctx = RuleContext::new(context, benchmark, settings);

        let mut drafts: Vec<(QaCategory, i32, QaDraft)> = Vec::new();
        for rule in &self.rules {
            match rule.evaluate(&ctx) {
                Ok(Some(draft)) => drafts.push((rule.category, rule.priority, draft)),
                Ok(None) => {
                    tracing::debug!(rule = rule.name, "Rule preconditions not met");
                }
                Err(e) => {
                    tracing::warn!(rule = rule.name, error = %e, "Rule failed, skipping");
                }
            }
        }

        // Stable: rule order is kept within a category
        drafts.sort_by_key(|(category, _, _)| *category);

        let mut items: Vec<QaItem> = drafts
            .into_iter()
            .enumerate()
            .map(|(i, (category, priority, draft))| QaItem {
                id: format!("qa_{}", i + 1),
                category,
                question: draft.question,
                answer: draft.answer,
                priority,
                tags: draft.tags,
            })
            .collect();

        rank(&mut items, settings.target);

        // Compression is per item, so truncating first gives the same result
        let limit = usize::try_from(settings.count).unwrap_or(usize::MAX);
        items.truncate(limit);
        for item in &mut items {
            item.answer = compress(&item.answer, settings.answer_length);
        }

        tracing::debug!(
            industry = %benchmark.name,
            target = settings.target.as_str(),
            count = items.len(),
            "Generated Q&A"
        );

        items
    }
}

/// Generate Q&A with the built-in benchmarks and rules
pub fn generate_qa(context: &QaContext, settings: &QaSettings) -> Result<Vec<QaItem>> {
    Ok(QaEngine::new()?.generate(context, settings))
}
