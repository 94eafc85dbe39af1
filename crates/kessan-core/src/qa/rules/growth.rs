//! Growth questions: industry trends, scalability, aggressive-growth check

use crate::benchmark::{Deviation, Driver, AGGRESSIVE_FACTOR};
use crate::derived;
use crate::error::Result;
use crate::format::{format_currency, format_percent, ratio};
use crate::qa::catalog::{checked, finite, Rule, RuleContext};
use crate::qa::types::{QaCategory, QaDraft};

use super::{bullets, join_paragraphs, trend_about};

const TREND_LIMIT: usize = 3;

pub fn rules() -> Vec<Rule> {
    vec![
        Rule::new("growth.trends", QaCategory::Growth, 7, trends),
        Rule::new("growth.scalability", QaCategory::Growth, 7, scalability),
        Rule::new("growth.aggressive", QaCategory::Growth, 9, aggressive),
    ]
}

fn trends(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    if ctx.benchmark.trends.is_empty() {
        return Ok(None);
    }
    let (growth, _) = ctx.growth()?;
    let top = ctx.benchmark.trends.iter().take(TREND_LIMIT);

    let summary = format!(
        "{}業界では以下の動向が成長の追い風となっており、計画の成長率{}はこれらを前提としています。",
        ctx.benchmark.label,
        format_percent(growth)
    );

    let lines = top.map(|t| {
        if ctx.is_executive() {
            format!("**{}**", t.title)
        } else {
            format!("**{}**: {}", t.title, t.description)
        }
    });

    let mut blocks = vec![summary, bullets(lines)];
    if ctx.is_detailed() {
        let impacts = ctx
            .benchmark
            .trends
            .iter()
            .take(TREND_LIMIT)
            .map(|t| format!("{}: {}", t.title, t.impact));
        blocks.push(format!("P&Lへの影響は以下の通りです。\n{}", bullets(impacts)));
    }

    Ok(Some(
        QaDraft::new("今後の成長を支える業界動向は？", join_paragraphs(blocks))
            .with_tags(&["成長", "業界動向"]),
    ))
}

/// Revenue growth against cost growth
fn scalability(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let (growth, _) = ctx.growth()?;
    let opex_growth = finite("opex_growth", ctx.params.opex_growth())?;
    let periods = (crate::model::YEARS - 1) as i32;
    let revenue_multiple = (1.0 + growth).powi(periods);
    let opex_multiple = (1.0 + opex_growth).powi(periods);

    let summary = format!(
        "売上成長率{}に対し販管費の増加率は{}で、5年間で売上は{:.1}倍、販管費は{:.1}倍となる計画です。",
        format_percent(growth),
        format_percent(opex_growth),
        revenue_multiple,
        opex_multiple
    );

    let mut blocks = vec![summary];

    // With a P&L the quoted SGA ratios decide the verdict
    let mut leverage = growth > opex_growth;
    if let Some(pl) = ctx.pl {
        let revenue = checked("revenue", &pl.revenue)?;
        let opex = checked("opex", &pl.opex)?;
        let (first, last) = (ratio(opex[0], revenue[0]), ratio(opex[4], revenue[4]));
        let (first_text, last_text) = (format_percent(first), format_percent(last));
        blocks.push(if first_text == last_text {
            format!("売上高販管費率はFY1、FY5ともに{}で横ばいです。", first_text)
        } else {
            format!(
                "売上高販管費率はFY1の{}からFY5には{}へ{}します。",
                first_text,
                last_text,
                if last < first { "低下" } else { "上昇" }
            )
        });
        leverage = first_text != last_text && last < first;
    }

    blocks.push(
        if leverage {
            "売上の伸びが費用の伸びを上回るため、規模の経済が働くスケーラブルな事業構造です。"
        } else {
            "費用の伸びが売上の伸びと同等以上のため、規模拡大による利益率改善は限定的です。"
        }
        .to_string(),
    );

    Ok(Some(
        QaDraft::new("事業のスケーラビリティをどう考えていますか？", join_paragraphs(blocks))
            .with_tags(&["成長", "スケーラビリティ", "販管費"]),
    ))
}

/// Supplementary item when the growth rate exceeds the industry band by more than 20%
fn aggressive(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let (growth, deviation) = ctx.growth()?;
    if deviation != Deviation::Aggressive {
        return Ok(None);
    }
    let range = ctx.benchmark.range(Driver::GrowthRate);
    let revenue = finite("revenue_fy1", ctx.params.revenue_fy1())?;

    let summary = format!(
        "成長率{}は{}業界の上限{}の1.2倍（{}）を超えており、**ベンチマーク比でアグレッシブ**な計画です。",
        format_percent(growth),
        ctx.benchmark.label,
        format_percent(range.high),
        format_percent(range.high * AGGRESSIVE_FACTOR)
    );

    let justification = match trend_about(ctx.benchmark, "成長") {
        Some(trend) => format!(
            "業界動向「{}」（{}）を上回る成長を実現する独自の要因を説明する必要があります。",
            trend.title, trend.description
        ),
        None => "業界平均を大きく上回る成長を実現する独自の要因を説明する必要があります。".to_string(),
    };

    let planned = derived::project_revenue(revenue, growth);
    let at_high = derived::project_revenue(revenue, range.high);
    let comparison = format!(
        "業界上限の成長率で試算するとFY5売上は{}となり、計画の{}との差は{}です。",
        format_currency(at_high[4]),
        format_currency(planned[4]),
        format_currency(planned[4] - at_high[4])
    );

    Ok(Some(
        QaDraft::new(
            "業界水準を大きく上回る成長率の根拠は？",
            join_paragraphs(vec![summary, justification, comparison]),
        )
        .with_tags(&["成長", "成長率", "ベンチマーク乖離"]),
    ))
}
