//! Q&A rule catalog
//!
//! A rule inspects the [`RuleContext`] and either builds one draft or
//! declines. Rules are independent of one another; the catalog order
//! (category first, then declaration order within the category) is the
//! generation order used to break priority ties.

use std::fmt;

use crate::benchmark::{Deviation, Driver, IndustryBenchmark};
use crate::derived;
use crate::error::{Error, Result};
use crate::model::{KpiSet, ModelParameters, PlSeries, QaContext, Series};

use super::rules;
use super::types::{Audience, DetailLevel, QaCategory, QaDraft, QaSettings};

/// Signature of a rule's builder
pub type BuildFn = fn(&RuleContext<'_>) -> Result<Option<QaDraft>>;

/// A single answer-builder rule
#[derive(Clone, Copy)]
pub struct Rule {
    /// Stable identifier (e.g. "revenue.initial")
    pub name: &'static str,
    pub category: QaCategory,
    /// Base priority before audience boosting
    pub priority: i32,
    build: BuildFn,
}

impl Rule {
    pub const fn new(
        name: &'static str,
        category: QaCategory,
        priority: i32,
        build: BuildFn,
    ) -> Self {
        Self {
            name,
            category,
            priority,
            build,
        }
    }

    /// Run the rule against a context
    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
        (self.build)(ctx)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Everything a rule can look at
pub struct RuleContext<'a> {
    pub params: &'a ModelParameters,
    pub kpis: Option<&'a KpiSet>,
    pub pl: Option<&'a PlSeries>,
    pub benchmark: &'a IndustryBenchmark,
    pub target: Audience,
    pub detail: DetailLevel,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        ctx: &'a QaContext,
        benchmark: &'a IndustryBenchmark,
        settings: &QaSettings,
    ) -> Self {
        Self {
            params: &ctx.parameters,
            kpis: ctx.kpis.as_ref(),
            pl: ctx.pl_summary.as_ref(),
            benchmark,
            target: settings.target,
            detail: settings.detail_level,
        }
    }

    /// Growth rate and its classification against the industry range
    pub fn growth(&self) -> Result<(f64, Deviation)> {
        self.driver(Driver::GrowthRate, self.params.growth_rate())
    }

    /// COGS rate and its classification against the industry range
    pub fn cogs(&self) -> Result<(f64, Deviation)> {
        self.driver(Driver::CogsRate, self.params.cogs_rate())
    }

    fn driver(&self, driver: Driver, value: f64) -> Result<(f64, Deviation)> {
        let value = finite(driver.as_str(), value)?;
        Ok((value, self.benchmark.classify(driver, value)))
    }

    /// FY1..FY5 revenue: the P&L series when present, else projected from parameters
    pub fn revenue_series(&self) -> Result<Series> {
        match self.pl {
            Some(pl) => checked("revenue", &pl.revenue).copied(),
            None => {
                let r1 = finite("revenue_fy1", self.params.revenue_fy1())?;
                let g = finite("growth_rate", self.params.growth_rate())?;
                Ok(derived::project_revenue(r1, g))
            }
        }
    }

    pub fn is_detailed(&self) -> bool {
        self.detail == DetailLevel::Detailed
    }

    pub fn is_executive(&self) -> bool {
        self.detail == DetailLevel::Executive
    }
}

/// Reject NaN/infinite values
pub fn finite(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidData(format!("{} is not a finite number", name)))
    }
}

/// Reject series containing NaN/infinite values
pub fn checked<'s>(name: &str, series: &'s Series) -> Result<&'s Series> {
    if series.iter().all(|v| v.is_finite()) {
        Ok(series)
    } else {
        Err(Error::InvalidData(format!(
            "{} series contains a non-finite value",
            name
        )))
    }
}

/// The built-in catalog, in generation order
pub fn default_rules() -> Vec<Rule> {
    let mut catalog = Vec::new();
    catalog.extend(rules::revenue::rules());
    catalog.extend(rules::cost::rules());
    catalog.extend(rules::profitability::rules());
    catalog.extend(rules::growth::rules());
    catalog.extend(rules::risk::rules());
    catalog.extend(rules::market::rules());
    catalog.extend(rules::operations::rules());
    catalog.extend(rules::funding::rules());
    catalog
}
