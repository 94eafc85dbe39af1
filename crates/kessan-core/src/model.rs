//! Input model consumed by the Q&A engine
//!
//! These types mirror the output of the external P&L recalculation:
//! named parameters, an optional KPI summary and an optional 5-year P&L
//! series. Every series is typed `[f64; 5]` (FY1..FY5), so a series of any
//! other length is rejected at deserialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of fiscal years in a projection
pub const YEARS: usize = 5;

/// A FY1..FY5 series
pub type Series = [f64; YEARS];

/// Label for a series index, e.g. `2 -> "FY3"`
pub fn fy_label(index: usize) -> String {
    format!("FY{}", index + 1)
}

/// Parameter keys with fixed fallbacks
pub mod keys {
    pub const REVENUE_FY1: &str = "revenue_fy1";
    pub const GROWTH_RATE: &str = "growth_rate";
    pub const COGS_RATE: &str = "cogs_rate";
    pub const OPEX_BASE: &str = "opex_base";
    pub const OPEX_GROWTH: &str = "opex_growth";

    /// Prefix for per-role annual salary overrides (`salary_engineer`)
    pub const SALARY_PREFIX: &str = "salary_";
    /// Prefix for per-role headcount overrides (`headcount_engineer`)
    pub const HEADCOUNT_PREFIX: &str = "headcount_";
}

/// Named numeric drivers of the model
///
/// Stored in a `BTreeMap` so dynamic keys (role overrides) iterate in a
/// stable order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelParameters(pub BTreeMap<String, f64>);

/// A per-role payroll override taken from the parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RoleOverride {
    pub role: String,
    pub salary: Option<f64>,
    pub headcount: Option<f64>,
}

impl ModelParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Value for `key`, falling back to `default` when absent
    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    /// First-year revenue (default 1億円)
    pub fn revenue_fy1(&self) -> f64 {
        self.get_or(keys::REVENUE_FY1, 100_000_000.0)
    }

    /// Annual revenue growth rate (default 30%)
    pub fn growth_rate(&self) -> f64 {
        self.get_or(keys::GROWTH_RATE, 0.3)
    }

    /// Cost of goods as a share of revenue (default 30%)
    pub fn cogs_rate(&self) -> f64 {
        self.get_or(keys::COGS_RATE, 0.3)
    }

    /// FY1 operating expense (default 8000万円)
    pub fn opex_base(&self) -> f64 {
        self.get_or(keys::OPEX_BASE, 80_000_000.0)
    }

    /// Annual operating expense growth (default 10%)
    pub fn opex_growth(&self) -> f64 {
        self.get_or(keys::OPEX_GROWTH, 0.1)
    }

    /// Per-role salary/headcount overrides, ordered by role name
    pub fn role_overrides(&self) -> Vec<RoleOverride> {
        let mut roles: BTreeMap<&str, RoleOverride> = BTreeMap::new();

        for (key, value) in &self.0 {
            let (role, is_salary) = if let Some(role) = key.strip_prefix(keys::SALARY_PREFIX) {
                (role, true)
            } else if let Some(role) = key.strip_prefix(keys::HEADCOUNT_PREFIX) {
                (role, false)
            } else {
                continue;
            };
            if role.is_empty() {
                continue;
            }

            let entry = roles.entry(role).or_insert_with(|| RoleOverride {
                role: role.to_string(),
                salary: None,
                headcount: None,
            });
            if is_salary {
                entry.salary = Some(*value);
            } else {
                entry.headcount = Some(*value);
            }
        }

        roles.into_values().collect()
    }
}

/// Break-even gap reported by the KPI summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakevenGap {
    /// Additional annual revenue needed to break even in FY1
    pub amount: f64,
    /// The same gap relative to FY1 revenue
    pub rate: f64,
}

/// KPI summary produced by the P&L recalculation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    #[serde(default)]
    pub break_even_year: Option<String>,
    #[serde(default)]
    pub cumulative_break_even_year: Option<String>,
    #[serde(default)]
    pub revenue_cagr: Option<f64>,
    #[serde(default)]
    pub fy5_op_margin: Option<f64>,
    #[serde(default)]
    pub gp_margin: Option<f64>,
    #[serde(default)]
    pub breakeven_gap: Option<BreakevenGap>,
}

/// Revenue segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub revenue: Series,
}

/// SGA expense split by subcategory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SgaBreakdown {
    pub payroll: Series,
    pub marketing: Series,
    pub office: Series,
    pub system: Series,
    pub other: Series,
}

impl SgaBreakdown {
    /// Subcategories with their display labels, in a fixed order
    pub fn categories(&self) -> [(&'static str, &Series); 5] {
        [
            ("人件費", &self.payroll),
            ("マーケティング費", &self.marketing),
            ("オフィス費", &self.office),
            ("システム費", &self.system),
            ("その他", &self.other),
        ]
    }

    /// Sum of all subcategories for one year
    pub fn total(&self, year: usize) -> f64 {
        self.categories().iter().map(|(_, s)| s[year]).sum()
    }
}

/// Payroll line for a role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleDetail {
    pub role: String,
    pub headcount: Series,
    /// Annual salary per head
    pub salary: f64,
}

/// Named expense line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub amounts: Series,
}

/// Role-level and line-level SGA detail
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SgaDetail {
    #[serde(default)]
    pub payroll: Vec<RoleDetail>,
    #[serde(default)]
    pub marketing: Vec<LineItem>,
}

/// 5-year P&L series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlSeries {
    pub revenue: Series,
    pub cogs: Series,
    pub gross_profit: Series,
    pub opex: Series,
    pub operating_profit: Series,
    pub fcf: Series,
    pub cumulative_fcf: Series,
    #[serde(default)]
    pub depreciation: Option<Series>,
    #[serde(default)]
    pub capex: Option<Series>,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub sga_breakdown: Option<SgaBreakdown>,
    #[serde(default)]
    pub sga_detail: Option<SgaDetail>,
}

/// Everything the engine needs to know about one model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaContext {
    #[serde(default)]
    pub parameters: ModelParameters,
    #[serde(default)]
    pub kpis: Option<KpiSet>,
    #[serde(default)]
    pub pl_summary: Option<PlSeries>,
    #[serde(default)]
    pub industry: Option<String>,
}

impl QaContext {
    pub fn new(parameters: ModelParameters) -> Self {
        Self {
            parameters,
            ..Default::default()
        }
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn with_kpis(mut self, kpis: KpiSet) -> Self {
        self.kpis = Some(kpis);
        self
    }

    pub fn with_pl_summary(mut self, pl: PlSeries) -> Self {
        self.pl_summary = Some(pl);
        self
    }

    /// Parse a context leniently.
    ///
    /// `parameters` must be a map of numbers. A malformed `kpis` or
    /// `plSummary` section is dropped with a warning so only the rules
    /// that depend on it are disabled.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(mut map) = value else {
            return Err(Error::InvalidData(
                "Context must be a JSON object".to_string(),
            ));
        };

        let parameters = match map.remove("parameters") {
            Some(serde_json::Value::Null) | None => ModelParameters::default(),
            Some(v) => serde_json::from_value(v)?,
        };

        let kpis = optional_section::<KpiSet>(map.remove("kpis"), "kpis");
        let pl_summary = optional_section::<PlSeries>(map.remove("plSummary"), "plSummary");

        let industry = match map.remove("industry") {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => {
                tracing::warn!(value = %other, "Ignoring non-string industry");
                None
            }
        };

        Ok(Self {
            parameters,
            kpis,
            pl_summary,
            industry,
        })
    }

    /// Parse a context from JSON text (see [`QaContext::from_json_value`])
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        Self::from_json_value(value)
    }
}

fn optional_section<T: serde::de::DeserializeOwned>(
    value: Option<serde_json::Value>,
    name: &str,
) -> Option<T> {
    match value {
        None | Some(serde_json::Value::Null) => None,
        Some(v) => match serde_json::from_value(v) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(section = name, error = %e, "Dropping malformed context section");
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parameter_defaults() {
        let params = ModelParameters::new();
        assert_eq!(params.revenue_fy1(), 100_000_000.0);
        assert_eq!(params.growth_rate(), 0.3);
        assert_eq!(params.cogs_rate(), 0.3);
        assert_eq!(params.opex_base(), 80_000_000.0);
        assert_eq!(params.opex_growth(), 0.1);

        let params = params.with(keys::GROWTH_RATE, 0.5);
        assert_eq!(params.growth_rate(), 0.5);
    }

    #[test]
    fn test_role_overrides_are_grouped_and_sorted() {
        let params = ModelParameters::new()
            .with("salary_sales", 5_000_000.0)
            .with("headcount_engineer", 4.0)
            .with("salary_engineer", 7_000_000.0)
            .with("salary_", 1.0)
            .with("growth_rate", 0.2);

        let roles = params.role_overrides();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].role, "engineer");
        assert_eq!(roles[0].salary, Some(7_000_000.0));
        assert_eq!(roles[0].headcount, Some(4.0));
        assert_eq!(roles[1].role, "sales");
        assert_eq!(roles[1].headcount, None);
    }

    #[test]
    fn test_context_rejects_wrong_series_length() {
        let value = json!({
            "parameters": {"revenue_fy1": 1.0},
            "plSummary": {
                "revenue": [1, 2, 3],
                "cogs": [0, 0, 0, 0, 0],
                "gross_profit": [0, 0, 0, 0, 0],
                "opex": [0, 0, 0, 0, 0],
                "operating_profit": [0, 0, 0, 0, 0],
                "fcf": [0, 0, 0, 0, 0],
                "cumulative_fcf": [0, 0, 0, 0, 0]
            },
            "kpis": {"break_even_year": "FY3"},
            "industry": "SaaS"
        });

        let ctx = QaContext::from_json_value(value).unwrap();
        assert!(ctx.pl_summary.is_none());
        assert_eq!(
            ctx.kpis.unwrap().break_even_year.as_deref(),
            Some("FY3")
        );
        assert_eq!(ctx.industry.as_deref(), Some("SaaS"));
        assert_eq!(ctx.parameters.revenue_fy1(), 1.0);
    }

    #[test]
    fn test_context_requires_object() {
        assert!(QaContext::from_json_value(json!([1, 2])).is_err());
        assert!(QaContext::from_json_str("{\"parameters\": {\"a\": \"x\"}}").is_err());
    }

    #[test]
    fn test_context_minimal() {
        let ctx = QaContext::from_json_str("{}").unwrap();
        assert_eq!(ctx, QaContext::default());
    }

    #[test]
    fn test_sga_total() {
        let sga = SgaBreakdown {
            payroll: [10.0; 5],
            marketing: [5.0; 5],
            office: [2.0; 5],
            system: [2.0; 5],
            other: [1.0; 5],
        };
        assert_eq!(sga.total(0), 20.0);
        assert_eq!(fy_label(4), "FY5");
    }
}
