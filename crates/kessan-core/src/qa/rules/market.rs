//! Market questions: market structure, KPI reference, trend impact

use crate::error::Result;
use crate::qa::catalog::{Rule, RuleContext};
use crate::qa::types::{QaCategory, QaDraft};

use super::{bullets, join_paragraphs};

/// P&L line a trend's impact text points at, by keyword
const IMPACT_LINES: &[(&str, &str)] = &[
    ("原価", "売上原価"),
    ("人件費", "人件費"),
    ("投資", "設備投資"),
    ("システム", "システム費"),
    ("マーケティング", "マーケティング費"),
    ("売上", "売上高"),
    ("単価", "売上高"),
    ("利益率", "営業利益"),
];

pub fn rules() -> Vec<Rule> {
    vec![
        Rule::new("market.structure", QaCategory::Market, 7, structure),
        Rule::new("market.kpi_reference", QaCategory::Market, 5, kpi_reference),
        Rule::new("market.trend_impact", QaCategory::Market, 6, trend_impact),
    ]
}

fn structure(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let env = &ctx.benchmark.competitive_environment;
    if env.market_structure.trim().is_empty() {
        return Ok(None);
    }

    let mut blocks = vec![format!(
        "{}業界は{}です。",
        ctx.benchmark.label,
        env.market_structure.trim_end_matches('。')
    )];

    if !env.key_success_factors.is_empty() {
        blocks.push(format!(
            "成功要因として以下が重視されます。\n{}",
            bullets(&env.key_success_factors)
        ));
    }
    if !ctx.is_executive() && !env.entry_barriers.is_empty() {
        blocks.push(format!(
            "参入障壁については、{}。",
            env.entry_barriers.trim_end_matches('。')
        ));
    }

    Ok(Some(
        QaDraft::new("市場構造と事業のポジショニングは？", join_paragraphs(blocks))
            .with_tags(&["市場", "市場構造", "成功要因"]),
    ))
}

/// The industry's own KPI definitions as a reference table
fn kpi_reference(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let kpis = &ctx.benchmark.kpis;
    if kpis.is_empty() {
        return Ok(None);
    }

    let summary = format!(
        "{}業界で重視される主要KPIは{}つです。",
        ctx.benchmark.label,
        kpis.len()
    );

    let mut table = vec![
        "| KPI | 定義 | 目安 |".to_string(),
        "| --- | --- | --- |".to_string(),
    ];
    table.extend(
        kpis.iter()
            .map(|k| format!("| {} | {} | {} |", k.name, k.description, k.benchmark)),
    );

    Ok(Some(
        QaDraft::new(
            "業界で重視されるKPIとその目安は？",
            join_paragraphs(vec![summary, table.join("\n")]),
        )
        .with_tags(&["市場", "KPI", "ベンチマーク"]),
    ))
}

/// Which P&L line a trend affects
fn impact_line(impact: &str) -> Option<&'static str> {
    IMPACT_LINES
        .iter()
        .find(|(keyword, _)| impact.contains(*keyword))
        .map(|(_, line)| *line)
}

fn trend_impact(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let trends = &ctx.benchmark.trends;
    if trends.is_empty() {
        return Ok(None);
    }

    let summary = format!(
        "{}業界の主な動向と、計画への影響は以下の通りです。",
        ctx.benchmark.label
    );

    let lines = trends.iter().map(|t| match impact_line(&t.impact) {
        Some(line) if ctx.is_detailed() => {
            format!("**{}**（{}）: {} 【影響: {}】", t.title, t.description, t.impact, line)
        }
        Some(line) => format!("**{}**: {} 【影響: {}】", t.title, t.impact, line),
        None => format!("**{}**: {}", t.title, t.impact),
    });

    Ok(Some(
        QaDraft::new(
            "業界動向は事業計画にどのような影響を与えますか？",
            join_paragraphs(vec![
                summary,
                bullets(lines),
                "これらの動向は計画の前提に織り込み済みであり、変化があれば速やかに計画を見直します。"
                    .to_string(),
            ]),
        )
        .with_tags(&["市場", "業界動向", "P&L影響"]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qa::types::{DetailLevel, QaSettings};
    use crate::test_utils::*;

    #[test]
    fn test_structure() {
        let settings = QaSettings::default();
        let draft = run_rule("market.structure", &saas_context(), &settings).unwrap();
        assert!(draft.answer.starts_with("SaaS・クラウドサービス業界は少数のグローバル大手"));
        assert!(draft.answer.contains("- 他システムとの連携性"));
        assert!(draft.answer.contains("参入障壁"));

        let executive = QaSettings {
            detail_level: DetailLevel::Executive,
            ..Default::default()
        };
        let draft = run_rule("market.structure", &saas_context(), &executive).unwrap();
        assert!(!draft.answer.contains("参入障壁"));
    }

    #[test]
    fn test_kpi_reference_table() {
        let settings = QaSettings::default();
        let draft = run_rule("market.kpi_reference", &saas_context(), &settings).unwrap();
        assert!(draft.answer.contains("主要KPIは4つ"));
        assert!(draft.answer.contains("| KPI | 定義 | 目安 |"));
        assert!(draft.answer.contains("| チャーンレート | 月次の解約率 | 月次2%以下 |"));
    }

    #[test]
    fn test_impact_line_keywords() {
        assert_eq!(impact_line("原価率の上昇要因となる"), Some("売上原価"));
        assert_eq!(impact_line("顧客数の拡大により売上成長率の押し上げ要因となる"), Some("売上高"));
        assert_eq!(impact_line("対応が受注条件になりつつある"), None);
    }

    #[test]
    fn test_trend_impact() {
        let settings = QaSettings::default();
        let draft = run_rule("market.trend_impact", &saas_context(), &settings).unwrap();
        assert!(draft.answer.contains("**中小企業のDX需要拡大**"));
        assert!(draft.answer.contains("【影響: 人件費】"));
    }
}
