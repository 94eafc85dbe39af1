//! Test fixtures for the Q&A engine
//!
//! Sample models shared by unit tests across the rule modules.

use crate::benchmark::BenchmarkCatalog;
use crate::error::Result;
use crate::model::{
    keys, KpiSet, LineItem, ModelParameters, PlSeries, QaContext, RoleDetail, Segment,
    SgaBreakdown, SgaDetail,
};
use crate::qa::catalog::{default_rules, RuleContext};
use crate::qa::types::{QaDraft, QaSettings};

/// Parameters inside the SaaS benchmark bands
pub fn saas_parameters() -> ModelParameters {
    ModelParameters::new()
        .with(keys::REVENUE_FY1, 100_000_000.0)
        .with(keys::GROWTH_RATE, 0.3)
        .with(keys::COGS_RATE, 0.3)
        .with(keys::OPEX_BASE, 80_000_000.0)
        .with(keys::OPEX_GROWTH, 0.1)
}

/// A P&L that turns profitable in FY2 with cumulative FCF positive from FY3
pub fn sample_pl() -> PlSeries {
    PlSeries {
        revenue: [
            100_000_000.0,
            130_000_000.0,
            169_000_000.0,
            219_700_000.0,
            285_610_000.0,
        ],
        cogs: [
            30_000_000.0,
            39_000_000.0,
            50_700_000.0,
            65_910_000.0,
            85_683_000.0,
        ],
        gross_profit: [
            70_000_000.0,
            91_000_000.0,
            118_300_000.0,
            153_790_000.0,
            199_927_000.0,
        ],
        opex: [
            80_000_000.0,
            88_000_000.0,
            96_800_000.0,
            106_480_000.0,
            117_128_000.0,
        ],
        operating_profit: [
            -10_000_000.0,
            3_000_000.0,
            21_500_000.0,
            47_310_000.0,
            82_799_000.0,
        ],
        fcf: [
            -15_000_000.0,
            0.0,
            15_000_000.0,
            35_000_000.0,
            60_000_000.0,
        ],
        cumulative_fcf: [
            -15_000_000.0,
            -15_000_000.0,
            0.0,
            35_000_000.0,
            95_000_000.0,
        ],
        depreciation: None,
        capex: None,
        segments: Vec::new(),
        sga_breakdown: None,
        sga_detail: None,
    }
}

/// `sample_pl` with every optional section filled in
pub fn detailed_pl() -> PlSeries {
    PlSeries {
        depreciation: Some([
            2_000_000.0,
            4_000_000.0,
            4_000_000.0,
            4_000_000.0,
            4_000_000.0,
        ]),
        capex: Some([10_000_000.0, 5_000_000.0, 0.0, 0.0, 5_000_000.0]),
        segments: vec![
            Segment {
                name: "サブスクリプション".to_string(),
                revenue: [
                    80_000_000.0,
                    110_000_000.0,
                    145_000_000.0,
                    190_000_000.0,
                    250_000_000.0,
                ],
            },
            Segment {
                name: "導入支援".to_string(),
                revenue: [
                    20_000_000.0,
                    20_000_000.0,
                    24_000_000.0,
                    29_700_000.0,
                    35_610_000.0,
                ],
            },
        ],
        sga_breakdown: Some(SgaBreakdown {
            payroll: [
                48_000_000.0,
                52_000_000.0,
                56_000_000.0,
                60_000_000.0,
                64_000_000.0,
            ],
            marketing: [
                16_000_000.0,
                18_000_000.0,
                21_000_000.0,
                25_000_000.0,
                29_000_000.0,
            ],
            office: [8_000_000.0; 5],
            system: [
                6_000_000.0,
                7_000_000.0,
                8_800_000.0,
                10_480_000.0,
                12_128_000.0,
            ],
            other: [
                2_000_000.0,
                3_000_000.0,
                3_000_000.0,
                3_000_000.0,
                4_000_000.0,
            ],
        }),
        sga_detail: Some(SgaDetail {
            payroll: vec![
                RoleDetail {
                    role: "エンジニア".to_string(),
                    headcount: [4.0, 4.0, 5.0, 5.0, 6.0],
                    salary: 8_000_000.0,
                },
                RoleDetail {
                    role: "営業".to_string(),
                    headcount: [2.0, 3.0, 3.0, 4.0, 4.0],
                    salary: 6_000_000.0,
                },
            ],
            marketing: vec![
                LineItem {
                    name: "Web広告".to_string(),
                    amounts: [
                        10_000_000.0,
                        11_000_000.0,
                        13_000_000.0,
                        15_000_000.0,
                        17_000_000.0,
                    ],
                },
                LineItem {
                    name: "展示会".to_string(),
                    amounts: [
                        6_000_000.0,
                        7_000_000.0,
                        8_000_000.0,
                        10_000_000.0,
                        12_000_000.0,
                    ],
                },
            ],
        }),
        ..sample_pl()
    }
}

pub fn sample_kpis() -> KpiSet {
    KpiSet {
        break_even_year: Some("FY2".to_string()),
        cumulative_break_even_year: Some("FY3".to_string()),
        revenue_cagr: Some(0.3),
        fy5_op_margin: Some(0.29),
        gp_margin: Some(0.7),
        breakeven_gap: None,
    }
}

/// Parameters only, SaaS industry
pub fn saas_context() -> QaContext {
    QaContext::new(saas_parameters()).with_industry("SaaS")
}

/// Parameters, KPIs and the detailed P&L, SaaS industry
pub fn full_saas_context() -> QaContext {
    saas_context()
        .with_kpis(sample_kpis())
        .with_pl_summary(detailed_pl())
}

pub fn builtin_catalog() -> BenchmarkCatalog {
    BenchmarkCatalog::builtin().unwrap()
}

/// Evaluate a single built-in rule by name, keeping its error
pub fn try_rule(name: &str, ctx: &QaContext, settings: &QaSettings) -> Result<Option<QaDraft>> {
    let catalog = builtin_catalog();
    let benchmark = catalog.resolve(ctx.industry.as_deref());
    let rule_ctx = RuleContext::new(ctx, benchmark, settings);
    let rule = default_rules()
        .into_iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("unknown rule {}", name));
    rule.evaluate(&rule_ctx)
}

/// Evaluate a single built-in rule by name
pub fn run_rule(name: &str, ctx: &QaContext, settings: &QaSettings) -> Option<QaDraft> {
    try_rule(name, ctx, settings).unwrap()
}
